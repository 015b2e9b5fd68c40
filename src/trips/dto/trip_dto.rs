use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::ValidationError;
use validator_derive::Validate;

use crate::trips::model::TripStatus;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_return_after_departure"))]
pub struct TripDto {
  #[validate(length(min = 1, max = 64))]
  pub route_uuid: String,
  #[validate(length(min = 1, max = 64))]
  pub vehicle_uuid: Option<String>,
  #[validate(length(min = 1, max = 255))]
  pub purpose: String,
  #[validate(range(min = 1, max = 100))]
  pub passengers: i32,
  pub departure_at: DateTime<Utc>,
  pub return_at: Option<DateTime<Utc>>,
  #[serde(default = "scheduled")]
  pub status: TripStatus,
}

fn scheduled() -> TripStatus {
  TripStatus::Scheduled
}

fn validate_return_after_departure(
  dto: &TripDto,
) -> Result<(), ValidationError> {
  match dto.return_at {
    Some(return_at) if return_at < dto.departure_at => {
      let mut error = ValidationError::new("return_before_departure");
      error.message = Some("returnAt must not precede departureAt".into());
      Err(error)
    }
    _ => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;
  use validator::Validate;

  use super::*;

  fn dto(return_in_hours: Option<i64>) -> TripDto {
    let departure_at = Utc::now();
    TripDto {
      route_uuid: "route".to_string(),
      vehicle_uuid: None,
      purpose: "Client meeting".to_string(),
      passengers: 2,
      departure_at,
      return_at: return_in_hours.map(|h| departure_at + Duration::hours(h)),
      status: TripStatus::Scheduled,
    }
  }

  #[test]
  fn test_return_must_not_precede_departure() {
    assert!(dto(None).validate().is_ok());
    assert!(dto(Some(0)).validate().is_ok());
    assert!(dto(Some(4)).validate().is_ok());
    assert!(dto(Some(-1)).validate().is_err());
  }

  #[test]
  fn test_status_defaults_to_scheduled() {
    let json = r#"{
      "routeUuid": "r1",
      "purpose": "Airport pickup",
      "passengers": 1,
      "departureAt": "2030-01-01T08:00:00Z"
    }"#;
    let dto: TripDto = serde_json::from_str(json).unwrap();
    assert_eq!(dto.status, TripStatus::Scheduled);
    assert!(dto.vehicle_uuid.is_none());
  }
}
