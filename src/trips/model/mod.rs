use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
  pub uuid: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub route_uuid: String,
  pub vehicle_uuid: Option<String>,
  pub requester_uuid: String,
  pub purpose: String,
  pub passengers: i32,
  pub departure_at: DateTime<Utc>,
  pub return_at: Option<DateTime<Utc>>,
  pub status: TripStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
  Scheduled,
  InProgress,
  Completed,
  Cancelled,
}

impl TripStatus {
  pub const ALL: [TripStatus; 4] = [
    TripStatus::Scheduled,
    TripStatus::InProgress,
    TripStatus::Completed,
    TripStatus::Cancelled,
  ];

  pub const ACTIVE: [TripStatus; 2] =
    [TripStatus::Scheduled, TripStatus::InProgress];

  pub fn as_str(&self) -> &'static str {
    match self {
      TripStatus::Scheduled => "scheduled",
      TripStatus::InProgress => "in_progress",
      TripStatus::Completed => "completed",
      TripStatus::Cancelled => "cancelled",
    }
  }

  /// Terminal trips are read-only.
  pub fn is_terminal(&self) -> bool {
    matches!(self, TripStatus::Completed | TripStatus::Cancelled)
  }
}

impl fmt::Display for TripStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for TripStatus {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    TripStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == value)
      .ok_or_else(|| format!("unknown trip status `{value}`"))
  }
}

#[cfg(test)]
pub mod tests {
  use chrono::{Duration, Utc};

  use super::*;
  use crate::custom_nanoid;

  pub fn fake_trip(route_uuid: &str, requester_uuid: &str) -> Trip {
    let departure_at = Utc::now() + Duration::days(1);
    Trip {
      uuid: custom_nanoid(),
      created_at: Utc::now(),
      updated_at: Utc::now(),
      route_uuid: route_uuid.to_string(),
      vehicle_uuid: None,
      requester_uuid: requester_uuid.to_string(),
      purpose: "Site visit".to_string(),
      passengers: 3,
      departure_at,
      return_at: Some(departure_at + Duration::hours(6)),
      status: TripStatus::Scheduled,
    }
  }

  #[test]
  fn test_status_text() {
    for status in TripStatus::ALL {
      assert_eq!(status.as_str().parse::<TripStatus>().unwrap(), status);
    }
    assert!("done".parse::<TripStatus>().is_err());
  }

  #[test]
  fn test_terminal_states() {
    assert!(TripStatus::ACTIVE.iter().all(|s| !s.is_terminal()));
    assert!(TripStatus::Completed.is_terminal());
    assert!(TripStatus::Cancelled.is_terminal());
  }
}
