pub mod dto;
pub mod model;
pub mod repository;
pub mod rto;

use actix_web::{web, Responder};
use dto::department_dto::DepartmentDto;
use model::Department;
use repository::department_repository::{
  CreateDepartment, DepartmentRepository, UpdateDepartment,
};
use rto::get_department_rto::GetDepartmentRto;
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

const RESOURCE: &str = "departments";

pub async fn list_departments<
  DR: DepartmentRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  department_repository: web::Data<DR>,
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
  department_repository
    .find_all(pagination)
    .await
    .map(|departments| {
      ok(ListRto::<GetDepartmentRto>::new(departments, pagination))
    })
    .unwrap_or_else(repository_error)
}

pub async fn get_department<
  DR: DepartmentRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  department_repository: web::Data<DR>,
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
  match department_repository.find_one(&path.uuid).await {
    Ok(Some(department)) => ok(GetDepartmentRto::from(department)),
    Ok(None) => not_found("Department"),
    Err(error) => repository_error(error),
  }
}

pub async fn create_department<
  DR: DepartmentRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  department_repository: web::Data<DR>,
  permission_repository: web::Data<PR>,
  dto: web::Json<DepartmentDto>,
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
  let create = CreateDepartment {
    uuid: custom_nanoid(),
    fields: UpdateDepartment::from(dto.into_inner()),
  };
  department_repository
    .create(create)
    .await
    .map(|department| {
      created(
        format!("/v1/departments/{}", department.uuid),
        department.uuid,
      )
    })
    .unwrap_or_else(repository_error)
}

pub async fn update_department<
  DR: DepartmentRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  department_repository: web::Data<DR>,
  permission_repository: web::Data<PR>,
  path: web::Path<UuidPathDto>,
  dto: web::Json<DepartmentDto>,
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
  match department_repository
    .update(&path.uuid, UpdateDepartment::from(dto.into_inner()))
    .await
  {
    Ok(Some(department)) => ok(GetDepartmentRto::from(department)),
    Ok(None) => not_found("Department"),
    Err(error) => repository_error(error),
  }
}

pub async fn delete_department<
  DR: DepartmentRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  department_repository: web::Data<DR>,
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
  match department_repository.delete(&path.uuid).await {
    Ok(true) => no_content(),
    Ok(false) => not_found("Department"),
    Err(error) => repository_error(error),
  }
}

impl From<DepartmentDto> for UpdateDepartment {
  fn from(dto: DepartmentDto) -> Self {
    Self {
      name: dto.name,
      code: dto.code.to_uppercase(),
      description: dto.description,
    }
  }
}

impl From<Department> for GetDepartmentRto {
  fn from(department: Department) -> Self {
    Self {
      uuid: department.uuid,
      name: department.name,
      code: department.code,
      description: department.description,
      created_at: department.created_at,
      updated_at: department.updated_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use actix_web::http::StatusCode;
  use actix_web::HttpRequest;

  use super::*;
  use crate::departments::repository::department_repository::tests::InMemoryDepartmentRepository;
  use crate::helpers::tests::{
    assert_status, create_fake_access_token_claims, http_request,
    parse_http_response,
  };
  use crate::permissions::repository::permission_repository::tests::InMemoryPermissionRepository;
  use crate::permissions::seed_default_permissions;
  use crate::shared::http_error::HttpError;
  use crate::shared::role::Role;
  use crate::shared::rto::created_rto::CreatedRto;

  async fn permissions() -> web::Data<InMemoryPermissionRepository> {
    let repository = InMemoryPermissionRepository::new();
    seed_default_permissions(&repository).await.unwrap();
    web::Data::new(repository)
  }

  fn dto(name: &str, code: &str) -> DepartmentDto {
    DepartmentDto {
      name: name.to_string(),
      code: code.to_string(),
      description: None,
    }
  }

  #[actix_web::test]
  async fn test_create_then_get_department() {
    let departments = web::Data::new(InMemoryDepartmentRepository::new());
    let permissions = permissions().await;
    let manager = create_fake_access_token_claims("m", Role::Manager);
    let request: HttpRequest = http_request();

    let responder = create_department(
      departments.clone(),
      permissions.clone(),
      web::Json(dto("Logistics", "log")),
      manager.clone(),
    )
    .await;
    let created: CreatedRto =
      parse_http_response(responder, &request, StatusCode::CREATED).await;

    let responder = get_department(
      departments,
      permissions,
      web::Path::from(UuidPathDto {
        uuid: created.uuid.clone(),
      }),
      manager,
    )
    .await;
    let rto: GetDepartmentRto =
      parse_http_response(responder, &request, StatusCode::OK).await;
    assert_eq!(rto.uuid, created.uuid);
    assert_eq!(rto.name, "Logistics");
    assert_eq!(rto.code, "LOG");
  }

  #[actix_web::test]
  async fn test_duplicate_code_conflicts() {
    let departments = web::Data::new(InMemoryDepartmentRepository::new());
    let permissions = permissions().await;
    let admin = create_fake_access_token_claims("a", Role::Admin);
    let request: HttpRequest = http_request();

    let responder = create_department(
      departments.clone(),
      permissions.clone(),
      web::Json(dto("Logistics", "LOG")),
      admin.clone(),
    )
    .await;
    assert_status(responder, &request, StatusCode::CREATED);

    let responder = create_department(
      departments,
      permissions,
      web::Json(dto("Logistics West", "log")),
      admin,
    )
    .await;
    assert_status(responder, &request, StatusCode::CONFLICT);
  }

  #[actix_web::test]
  async fn test_employee_cannot_create_department() {
    let departments = web::Data::new(InMemoryDepartmentRepository::new());
    let employee = create_fake_access_token_claims("e", Role::Employee);
    let request: HttpRequest = http_request();

    let responder = create_department(
      departments,
      permissions().await,
      web::Json(dto("Finance", "FIN")),
      employee,
    )
    .await;
    let error: HttpError =
      parse_http_response(responder, &request, StatusCode::FORBIDDEN).await;
    assert_eq!(error.message, "Forbidden");
  }

  #[actix_web::test]
  async fn test_empty_name_is_rejected() {
    let departments = web::Data::new(InMemoryDepartmentRepository::new());
    let admin = create_fake_access_token_claims("a", Role::Admin);
    let request: HttpRequest = http_request();

    let responder = create_department(
      departments,
      permissions().await,
      web::Json(dto("", "FIN")),
      admin,
    )
    .await;
    assert_status(responder, &request, StatusCode::BAD_REQUEST);
  }

  #[actix_web::test]
  async fn test_update_and_delete_missing_department() {
    let departments = web::Data::new(InMemoryDepartmentRepository::new());
    let permissions = permissions().await;
    let admin = create_fake_access_token_claims("a", Role::Admin);
    let request: HttpRequest = http_request();

    let responder = update_department(
      departments.clone(),
      permissions.clone(),
      web::Path::from(UuidPathDto {
        uuid: custom_nanoid(),
      }),
      web::Json(dto("Finance", "FIN")),
      admin.clone(),
    )
    .await;
    assert_status(responder, &request, StatusCode::NOT_FOUND);

    let responder = delete_department(
      departments,
      permissions,
      web::Path::from(UuidPathDto {
        uuid: custom_nanoid(),
      }),
      admin,
    )
    .await;
    assert_status(responder, &request, StatusCode::NOT_FOUND);
  }
}
