use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
  pub uuid: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub plate_number: String,
  pub make: String,
  pub model: String,
  pub year: i32,
  pub capacity: i32,
  pub status: VehicleStatus,
  pub department_uuid: Option<String>,
  pub vendor_uuid: Option<String>,
  pub driver_uuid: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
  Available,
  InService,
  Maintenance,
  Retired,
}

impl VehicleStatus {
  pub const ALL: [VehicleStatus; 4] = [
    VehicleStatus::Available,
    VehicleStatus::InService,
    VehicleStatus::Maintenance,
    VehicleStatus::Retired,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      VehicleStatus::Available => "available",
      VehicleStatus::InService => "in_service",
      VehicleStatus::Maintenance => "maintenance",
      VehicleStatus::Retired => "retired",
    }
  }

  /// Whether trips may be scheduled on a vehicle in this state.
  pub fn is_dispatchable(&self) -> bool {
    matches!(self, VehicleStatus::Available | VehicleStatus::InService)
  }
}

impl fmt::Display for VehicleStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for VehicleStatus {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    VehicleStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == value)
      .ok_or_else(|| format!("unknown vehicle status `{value}`"))
  }
}
