use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::trips::model::TripStatus;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTripRto {
  pub uuid: String,
  pub route_uuid: String,
  pub vehicle_uuid: Option<String>,
  pub requester_uuid: String,
  pub purpose: String,
  pub passengers: i32,
  pub departure_at: DateTime<Utc>,
  pub return_at: Option<DateTime<Utc>>,
  pub status: TripStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
