use serde::Deserialize;
use validator_derive::Validate;

use crate::shared::dto::pagination_dto::Pagination;
use crate::vehicles::model::VehicleStatus;
use crate::vehicles::repository::vehicle_repository::VehicleFilter;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListQueryDto {
  #[validate(range(min = 1))]
  pub page: Option<u32>,
  #[validate(range(min = 1, max = 100))]
  pub per_page: Option<u32>,
  pub status: Option<VehicleStatus>,
  pub department_uuid: Option<String>,
  pub vendor_uuid: Option<String>,
  pub driver_uuid: Option<String>,
}

impl VehicleListQueryDto {
  pub fn pagination(&self) -> Pagination {
    Pagination::new(self.page, self.per_page)
  }

  pub fn filter(&self) -> VehicleFilter {
    VehicleFilter {
      status: self.status,
      department_uuid: self.department_uuid.clone(),
      vendor_uuid: self.vendor_uuid.clone(),
      driver_uuid: self.driver_uuid.clone(),
    }
  }
}
