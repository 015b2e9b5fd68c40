use serde::Deserialize;
use validator_derive::Validate;

/// Body of both create and update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DepartmentDto {
  #[validate(length(min = 1, max = 100))]
  pub name: String,
  #[validate(length(min = 1, max = 20))]
  pub code: String,
  #[validate(length(max = 500))]
  pub description: Option<String>,
}
