use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which link a record tracks. The subject holds the assignee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
  /// Subject is a vehicle, assignee its driver.
  VehicleDriver,
  /// Subject is a trip, assignee its vehicle.
  TripVehicle,
}

impl AssignmentKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      AssignmentKind::VehicleDriver => "vehicle_driver",
      AssignmentKind::TripVehicle => "trip_vehicle",
    }
  }
}

impl fmt::Display for AssignmentKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for AssignmentKind {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value {
      "vehicle_driver" => Ok(AssignmentKind::VehicleDriver),
      "trip_vehicle" => Ok(AssignmentKind::TripVehicle),
      other => Err(format!("unknown assignment kind `{other}`")),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRecord {
  pub uuid: String,
  pub kind: AssignmentKind,
  pub subject_uuid: String,
  pub assignee_uuid: String,
  pub assigned_at: DateTime<Utc>,
  pub released_at: Option<DateTime<Utc>>,
  pub is_current: bool,
}

/// What an entity update means for its assignment history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentChange {
  Unchanged,
  Assigned { to: String },
  Released { from: String },
  Reassigned { from: String, to: String },
}

impl AssignmentChange {
  pub fn between(previous: Option<&str>, next: Option<&str>) -> Self {
    match (previous, next) {
      (previous, next) if previous == next => AssignmentChange::Unchanged,
      (None, Some(to)) => AssignmentChange::Assigned { to: to.to_string() },
      (Some(from), None) => AssignmentChange::Released {
        from: from.to_string(),
      },
      (Some(from), Some(to)) => AssignmentChange::Reassigned {
        from: from.to_string(),
        to: to.to_string(),
      },
      (None, None) => AssignmentChange::Unchanged,
    }
  }

  /// The assignee that should be current afterwards, if the history must move.
  pub fn next_assignee(&self) -> Option<&str> {
    match self {
      AssignmentChange::Assigned { to }
      | AssignmentChange::Reassigned { to, .. } => Some(to.as_str()),
      AssignmentChange::Unchanged | AssignmentChange::Released { .. } => None,
    }
  }

  pub fn is_unchanged(&self) -> bool {
    matches!(self, AssignmentChange::Unchanged)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_change_between() {
    assert_eq!(
      AssignmentChange::between(None, None),
      AssignmentChange::Unchanged
    );
    assert_eq!(
      AssignmentChange::between(Some("a"), Some("a")),
      AssignmentChange::Unchanged
    );
    assert_eq!(
      AssignmentChange::between(None, Some("b")),
      AssignmentChange::Assigned { to: "b".into() }
    );
    assert_eq!(
      AssignmentChange::between(Some("a"), None),
      AssignmentChange::Released { from: "a".into() }
    );
    assert_eq!(
      AssignmentChange::between(Some("a"), Some("b")),
      AssignmentChange::Reassigned {
        from: "a".into(),
        to: "b".into()
      }
    );
  }

  #[test]
  fn test_next_assignee() {
    assert_eq!(
      AssignmentChange::between(Some("a"), Some("b")).next_assignee(),
      Some("b")
    );
    assert_eq!(
      AssignmentChange::between(Some("a"), None).next_assignee(),
      None
    );
  }

  #[test]
  fn test_kind_text() {
    for kind in [AssignmentKind::VehicleDriver, AssignmentKind::TripVehicle] {
      assert_eq!(kind.as_str().parse::<AssignmentKind>().unwrap(), kind);
      assert_eq!(
        serde_json::to_string(&kind).unwrap(),
        format!("\"{}\"", kind.as_str())
      );
    }
  }
}
