use serde::Deserialize;
use validator_derive::Validate;

use crate::shared::dto::pagination_dto::Pagination;
use crate::trips::model::TripStatus;
use crate::trips::repository::trip_repository::TripFilter;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TripListQueryDto {
  #[validate(range(min = 1))]
  pub page: Option<u32>,
  #[validate(range(min = 1, max = 100))]
  pub per_page: Option<u32>,
  pub status: Option<TripStatus>,
  pub vehicle_uuid: Option<String>,
  pub requester_uuid: Option<String>,
  pub route_uuid: Option<String>,
}

impl TripListQueryDto {
  pub fn pagination(&self) -> Pagination {
    Pagination::new(self.page, self.per_page)
  }

  pub fn filter(&self) -> TripFilter {
    TripFilter {
      statuses: self.status.into_iter().collect(),
      vehicle_uuid: self.vehicle_uuid.clone(),
      requester_uuid: self.requester_uuid.clone(),
      route_uuid: self.route_uuid.clone(),
    }
  }
}
