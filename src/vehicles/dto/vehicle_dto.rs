use serde::Deserialize;
use validator_derive::Validate;

use crate::vehicles::model::VehicleStatus;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDto {
  #[validate(length(min = 1, max = 20))]
  pub plate_number: String,
  #[validate(length(min = 1, max = 50))]
  pub make: String,
  #[validate(length(min = 1, max = 50))]
  pub model: String,
  #[validate(range(min = 1950, max = 2100))]
  pub year: i32,
  #[validate(range(min = 1, max = 100))]
  pub capacity: i32,
  pub status: VehicleStatus,
  #[validate(length(min = 1, max = 64))]
  pub department_uuid: Option<String>,
  #[validate(length(min = 1, max = 64))]
  pub vendor_uuid: Option<String>,
  #[validate(length(min = 1, max = 64))]
  pub driver_uuid: Option<String>,
}
