use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
  pub uuid: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub name: String,
  pub origin: String,
  pub destination: String,
  pub distance_km: f64,
  pub estimated_minutes: i32,
}
