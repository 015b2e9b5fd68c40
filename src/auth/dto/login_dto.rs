use serde::Deserialize;
use validator_derive::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginDto {
  #[validate(length(min = 1, max = 50))]
  pub user_name: String,
  #[validate(length(min = 1, max = 128))]
  pub password: String,
}
