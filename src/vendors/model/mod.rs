use chrono::{DateTime, Utc};

/// A supplier or lessor of vehicles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vendor {
  pub uuid: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub name: String,
  pub contact_name: Option<String>,
  pub phone: Option<String>,
  pub email: Option<String>,
  pub address: Option<String>,
}
