use serde::Deserialize;
use validator_derive::Validate;

pub const DEFAULT_PER_PAGE: u32 = 25;
pub const MAX_PER_PAGE: u32 = 100;

/// Page window handed to repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
  pub page: u32,
  pub per_page: u32,
}

impl Pagination {
  pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
    Self {
      page: page.unwrap_or(1).max(1),
      per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
    }
  }

  pub fn limit(&self) -> i64 {
    i64::from(self.per_page)
  }

  pub fn offset(&self) -> i64 {
    i64::from(self.page - 1) * i64::from(self.per_page)
  }

  /// Applies the window to an already filtered, ordered sequence.
  pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
    items
      .iter()
      .skip(self.offset() as usize)
      .take(self.per_page as usize)
      .cloned()
      .collect()
  }
}

impl Default for Pagination {
  fn default() -> Self {
    Self::new(None, None)
  }
}

/// Query string for collections without filters.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
  #[validate(range(min = 1))]
  pub page: Option<u32>,
  #[validate(range(min = 1, max = 100))]
  pub per_page: Option<u32>,
}

impl From<&PaginationDto> for Pagination {
  fn from(dto: &PaginationDto) -> Self {
    Pagination::new(dto.page, dto.per_page)
  }
}
