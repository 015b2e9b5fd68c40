use serde::Deserialize;
use validator_derive::Validate;

use crate::shared::role::Role;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
  #[validate(length(min = 3, max = 50))]
  pub user_name: String,
  #[validate(email)]
  pub email: String,
  #[validate(length(min = 1, max = 100))]
  pub full_name: String,
  pub role: Role,
  #[validate(length(min = 1, max = 64))]
  pub department_uuid: Option<String>,
  #[validate(length(min = 8, max = 128))]
  pub password: String,
  #[serde(default = "active")]
  pub is_active: bool,
}

fn active() -> bool {
  true
}
