use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::role::Role;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUserRto {
  pub uuid: String,
  pub user_name: String,
  pub email: String,
  pub full_name: String,
  pub role: Role,
  pub department_uuid: Option<String>,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
