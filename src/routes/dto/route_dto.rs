use serde::Deserialize;
use validator_derive::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RouteDto {
  #[validate(length(min = 1, max = 100))]
  pub name: String,
  #[validate(length(min = 1, max = 255))]
  pub origin: String,
  #[validate(length(min = 1, max = 255))]
  pub destination: String,
  #[validate(range(exclusive_min = 0.0, max = 100000.0))]
  pub distance_km: f64,
  #[validate(range(min = 1, max = 100000))]
  pub estimated_minutes: i32,
}
