use serde::{Deserialize, Serialize};

use crate::shared::dto::pagination_dto::Pagination;

#[derive(Debug, Serialize, Deserialize)]
pub struct ListRto<T> {
  pub items: Vec<T>,
  pub page: u32,
  #[serde(rename = "perPage")]
  pub per_page: u32,
}

impl<T> ListRto<T> {
  pub fn new<S: Into<T>>(items: Vec<S>, pagination: Pagination) -> Self {
    Self {
      items: items.into_iter().map(Into::into).collect(),
      page: pagination.page,
      per_page: pagination.per_page,
    }
  }
}
