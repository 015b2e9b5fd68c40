use serde::Deserialize;
use validator_derive::Validate;

/// Body of both create and update.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VendorDto {
  #[validate(length(min = 1, max = 100))]
  pub name: String,
  #[validate(length(min = 1, max = 100))]
  pub contact_name: Option<String>,
  #[validate(length(max = 30))]
  pub phone: Option<String>,
  #[validate(email)]
  pub email: Option<String>,
  #[validate(length(max = 255))]
  pub address: Option<String>,
}
