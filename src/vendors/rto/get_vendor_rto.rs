use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVendorRto {
  pub uuid: String,
  pub name: String,
  pub contact_name: Option<String>,
  pub phone: Option<String>,
  pub email: Option<String>,
  pub address: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
