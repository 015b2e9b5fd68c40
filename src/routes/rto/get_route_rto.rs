use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRouteRto {
  pub uuid: String,
  pub name: String,
  pub origin: String,
  pub destination: String,
  pub distance_km: f64,
  pub estimated_minutes: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
