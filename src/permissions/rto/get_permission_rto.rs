use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::role::Role;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPermissionRto {
  pub uuid: String,
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RolePermissionsRto {
  pub role: Role,
  pub permissions: Vec<String>,
}
