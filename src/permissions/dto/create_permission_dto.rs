use serde::Deserialize;
use validator::ValidationError;
use validator_derive::Validate;

use crate::permissions::model::is_valid_permission_name;

/// Used for both create and update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePermissionDto {
  #[validate(
    length(min = 3, max = 100),
    custom(function = "validate_permission_name")
  )]
  pub name: String,
  #[validate(length(max = 255))]
  pub description: Option<String>,
}

fn validate_permission_name(name: &str) -> Result<(), ValidationError> {
  if is_valid_permission_name(name) {
    Ok(())
  } else {
    Err(ValidationError::new("permission_name"))
  }
}
