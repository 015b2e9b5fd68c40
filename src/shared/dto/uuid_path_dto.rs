use serde::Deserialize;
use validator_derive::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UuidPathDto {
  #[validate(length(min = 1, max = 64))]
  pub uuid: String,
}
