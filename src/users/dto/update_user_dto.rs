use serde::Deserialize;
use validator_derive::Validate;

use crate::shared::role::Role;

/// Full replacement of the editable fields. The user name is fixed and a
/// missing password keeps the current one.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
  #[validate(email)]
  pub email: String,
  #[validate(length(min = 1, max = 100))]
  pub full_name: String,
  pub role: Role,
  #[validate(length(min = 1, max = 64))]
  pub department_uuid: Option<String>,
  #[validate(length(min = 8, max = 128))]
  pub password: Option<String>,
  pub is_active: bool,
}
