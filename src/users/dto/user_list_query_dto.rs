use serde::Deserialize;
use validator_derive::Validate;

use crate::shared::dto::pagination_dto::Pagination;
use crate::shared::role::Role;
use crate::users::repository::user_repository::UserFilter;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserListQueryDto {
  #[validate(range(min = 1))]
  pub page: Option<u32>,
  #[validate(range(min = 1, max = 100))]
  pub per_page: Option<u32>,
  pub role: Option<Role>,
  pub department_uuid: Option<String>,
}

impl UserListQueryDto {
  pub fn pagination(&self) -> Pagination {
    Pagination::new(self.page, self.per_page)
  }

  pub fn filter(&self) -> UserFilter {
    UserFilter {
      role: self.role,
      department_uuid: self.department_uuid.clone(),
    }
  }
}
