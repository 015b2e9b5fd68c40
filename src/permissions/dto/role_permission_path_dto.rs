use serde::Deserialize;
use validator_derive::Validate;

use crate::shared::role::Role;

#[derive(Debug, Clone, Deserialize)]
pub struct RolePathDto {
  pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RolePermissionPathDto {
  pub role: Role,
  #[validate(length(min = 3, max = 100))]
  pub name: String,
}
