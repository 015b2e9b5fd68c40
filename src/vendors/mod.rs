pub mod dto;
pub mod model;
pub mod repository;
pub mod rto;

use actix_web::{web, Responder};
use dto::vendor_dto::VendorDto;
use model::Vendor;
use repository::vendor_repository::{
  CreateVendor, UpdateVendor, VendorRepository,
};
use rto::get_vendor_rto::GetVendorRto;
use validator::Validate;

use crate::auth::model::access_token_claims::AccessTokenClaims;
use crate::custom_nanoid;
use crate::permissions::model::Action;
use crate::permissions::repository::permission_repository::PermissionRepository;
use crate::shared::authorization::authorize;
use crate::shared::dto::pagination_dto::{Pagination, PaginationDto};
use crate::shared::dto::uuid_path_dto::UuidPathDto;
use crate::shared::responses::{
  created, no_content, not_found, ok, repository_error, validation_failed,
};
use crate::shared::rto::list_rto::ListRto;

const RESOURCE: &str = "vendors";

pub async fn list_vendors<
  VR: VendorRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  vendor_repository: web::Data<VR>,
  permission_repository: web::Data<PR>,
  query: web::Query<PaginationDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(validation_errors) = query.validate() {
    return validation_failed(validation_errors);
  }
  if let Err(response) =
    authorize(&**permission_repository, &auth, RESOURCE, Action::View).await
  {
    return response;
  }
  let pagination = Pagination::from(&*query);
  vendor_repository
    .find_all(pagination)
    .await
    .map(|vendors| ok(ListRto::<GetVendorRto>::new(vendors, pagination)))
    .unwrap_or_else(repository_error)
}

pub async fn get_vendor<
  VR: VendorRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  vendor_repository: web::Data<VR>,
  permission_repository: web::Data<PR>,
  path: web::Path<UuidPathDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(validation_errors) = path.validate() {
    return validation_failed(validation_errors);
  }
  if let Err(response) =
    authorize(&**permission_repository, &auth, RESOURCE, Action::View).await
  {
    return response;
  }
  vendor_repository
    .find_one(&path.uuid)
    .await
    .map(|vendor| {
      vendor
        .map(|vendor| ok(GetVendorRto::from(vendor)))
        .unwrap_or_else(|| not_found("Vendor"))
    })
    .unwrap_or_else(repository_error)
}

pub async fn create_vendor<
  VR: VendorRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  vendor_repository: web::Data<VR>,
  permission_repository: web::Data<PR>,
  dto: web::Json<VendorDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(validation_errors) = dto.validate() {
    return validation_failed(validation_errors);
  }
  if let Err(response) =
    authorize(&**permission_repository, &auth, RESOURCE, Action::Create).await
  {
    return response;
  }
  let create = CreateVendor {
    uuid: custom_nanoid(),
    fields: UpdateVendor::from(dto.into_inner()),
  };
  vendor_repository
    .create(create)
    .await
    .map(|vendor| {
      created(format!("/v1/vendors/{}", vendor.uuid), vendor.uuid)
    })
    .unwrap_or_else(repository_error)
}

pub async fn update_vendor<
  VR: VendorRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  vendor_repository: web::Data<VR>,
  permission_repository: web::Data<PR>,
  path: web::Path<UuidPathDto>,
  dto: web::Json<VendorDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(validation_errors) = path.validate() {
    return validation_failed(validation_errors);
  }
  if let Err(validation_errors) = dto.validate() {
    return validation_failed(validation_errors);
  }
  if let Err(response) =
    authorize(&**permission_repository, &auth, RESOURCE, Action::Update).await
  {
    return response;
  }
  match vendor_repository
    .update(&path.uuid, UpdateVendor::from(dto.into_inner()))
    .await
  {
    Ok(Some(vendor)) => ok(GetVendorRto::from(vendor)),
    Ok(None) => not_found("Vendor"),
    Err(error) => repository_error(error),
  }
}

pub async fn delete_vendor<
  VR: VendorRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  vendor_repository: web::Data<VR>,
  permission_repository: web::Data<PR>,
  path: web::Path<UuidPathDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(validation_errors) = path.validate() {
    return validation_failed(validation_errors);
  }
  if let Err(response) =
    authorize(&**permission_repository, &auth, RESOURCE, Action::Delete).await
  {
    return response;
  }
  match vendor_repository.delete(&path.uuid).await {
    Ok(true) => no_content(),
    Ok(false) => not_found("Vendor"),
    Err(error) => repository_error(error),
  }
}

impl From<VendorDto> for UpdateVendor {
  fn from(dto: VendorDto) -> Self {
    Self {
      name: dto.name,
      contact_name: dto.contact_name,
      phone: dto.phone,
      email: dto.email.map(|email| email.to_lowercase()),
      address: dto.address,
    }
  }
}

impl From<Vendor> for GetVendorRto {
  fn from(vendor: Vendor) -> Self {
    Self {
      uuid: vendor.uuid,
      name: vendor.name,
      contact_name: vendor.contact_name,
      phone: vendor.phone,
      email: vendor.email,
      address: vendor.address,
      created_at: vendor.created_at,
      updated_at: vendor.updated_at,
    }
  }
}
