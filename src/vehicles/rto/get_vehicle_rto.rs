use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::vehicles::model::VehicleStatus;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVehicleRto {
  pub uuid: String,
  pub plate_number: String,
  pub make: String,
  pub model: String,
  pub year: i32,
  pub capacity: i32,
  pub status: VehicleStatus,
  pub department_uuid: Option<String>,
  pub vendor_uuid: Option<String>,
  pub driver_uuid: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
