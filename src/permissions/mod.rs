pub mod dto;
pub mod model;
pub mod repository;
pub mod rto;

use actix_web::{web, Responder};
use dto::create_permission_dto::CreatePermissionDto;
use dto::role_permission_path_dto::{RolePathDto, RolePermissionPathDto};
use model::{catalogue, default_grants, Action, Permission};
use repository::permission_repository::{
  CreatePermission, PermissionRepository, UpdatePermission,
};
use rto::get_permission_rto::{GetPermissionRto, RolePermissionsRto};
use validator::Validate;

use crate::auth::model::access_token_claims::AccessTokenClaims;
use crate::custom_nanoid;
use crate::shared::authorization::authorize;
use crate::shared::dto::pagination_dto::{Pagination, PaginationDto};
use crate::shared::dto::uuid_path_dto::UuidPathDto;
use crate::shared::repository::RepositoryError;
use crate::shared::responses::{
  created, no_content, not_found, ok, repository_error, validation_failed,
};
use crate::shared::role::Role;
use crate::shared::rto::list_rto::ListRto;

const RESOURCE: &str = "permissions";

pub async fn list_permissions<PR: PermissionRepository + 'static>(
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
  permission_repository
    .find_all(pagination)
    .await
    .map(|permissions| {
      ok(ListRto::<GetPermissionRto>::new(permissions, pagination))
    })
    .unwrap_or_else(repository_error)
}

pub async fn get_permission<PR: PermissionRepository + 'static>(
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
  match permission_repository.find_one(&path.uuid).await {
    Ok(Some(permission)) => ok(GetPermissionRto::from(permission)),
    Ok(None) => not_found("Permission"),
    Err(error) => repository_error(error),
  }
}

pub async fn create_permission<PR: PermissionRepository + 'static>(
  permission_repository: web::Data<PR>,
  dto: web::Json<CreatePermissionDto>,
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
  permission_repository
    .create(CreatePermission::from(dto.into_inner()))
    .await
    .map(|permission| {
      log::info!("{} created permission {}", auth.uuid, permission.name);
      created(
        format!("/v1/permissions/{}", permission.uuid),
        permission.uuid,
      )
    })
    .unwrap_or_else(repository_error)
}

pub async fn update_permission<PR: PermissionRepository + 'static>(
  permission_repository: web::Data<PR>,
  path: web::Path<UuidPathDto>,
  dto: web::Json<CreatePermissionDto>,
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
  let dto = dto.into_inner();
  let update = UpdatePermission {
    name: dto.name,
    description: dto.description,
  };
  match permission_repository.update(&path.uuid, update).await {
    Ok(Some(permission)) => ok(GetPermissionRto::from(permission)),
    Ok(None) => not_found("Permission"),
    Err(error) => repository_error(error),
  }
}

pub async fn delete_permission<PR: PermissionRepository + 'static>(
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
  match permission_repository.delete(&path.uuid).await {
    Ok(true) => no_content(),
    Ok(false) => not_found("Permission"),
    Err(error) => repository_error(error),
  }
}

pub async fn get_role_permissions<PR: PermissionRepository + 'static>(
  permission_repository: web::Data<PR>,
  path: web::Path<RolePathDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(response) =
    authorize(&**permission_repository, &auth, RESOURCE, Action::View).await
  {
    return response;
  }
  let role = path.role;
  let permissions = if role == Role::Admin {
    Ok(catalogue())
  } else {
    permission_repository.find_for_role(role).await
  };
  permissions
    .map(|permissions| ok(RolePermissionsRto { role, permissions }))
    .unwrap_or_else(repository_error)
}

pub async fn grant_role_permission<PR: PermissionRepository + 'static>(
  permission_repository: web::Data<PR>,
  path: web::Path<RolePermissionPathDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(validation_errors) = path.validate() {
    return validation_failed(validation_errors);
  }
  if let Err(response) =
    authorize(&**permission_repository, &auth, RESOURCE, Action::Update).await
  {
    return response;
  }
  match permission_repository.grant(path.role, &path.name).await {
    Ok(()) => {
      log::info!("{} granted {} to {}", auth.uuid, path.name, path.role);
      no_content()
    }
    Err(RepositoryError::InvalidReference(_)) => not_found("Permission"),
    Err(error) => repository_error(error),
  }
}

pub async fn revoke_role_permission<PR: PermissionRepository + 'static>(
  permission_repository: web::Data<PR>,
  path: web::Path<RolePermissionPathDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(validation_errors) = path.validate() {
    return validation_failed(validation_errors);
  }
  if let Err(response) =
    authorize(&**permission_repository, &auth, RESOURCE, Action::Update).await
  {
    return response;
  }
  match permission_repository.revoke(path.role, &path.name).await {
    Ok(true) => {
      log::info!("{} revoked {} from {}", auth.uuid, path.name, path.role);
      no_content()
    }
    Ok(false) => not_found("Grant"),
    Err(error) => repository_error(error),
  }
}

/// Fills an empty permission table with the catalogue and default grants.
///
/// Safe to run on every boot: once any permission exists the table belongs
/// to the operators, so revoked grants and renamed or deleted entries stay
/// that way.
pub async fn seed_default_permissions<PR: PermissionRepository>(
  permission_repository: &PR,
) -> Result<(), RepositoryError> {
  let existing = permission_repository
    .find_all(Pagination::new(Some(1), Some(1)))
    .await?;
  if !existing.is_empty() {
    log::debug!("permissions already seeded");
    return Ok(());
  }

  for name in catalogue() {
    let create = CreatePermission {
      uuid: custom_nanoid(),
      description: None,
      name,
    };
    match permission_repository.create(create).await {
      Ok(_) | Err(RepositoryError::Conflict(_)) => {}
      Err(error) => return Err(error),
    }
  }
  for role in Role::ALL {
    for name in default_grants(role) {
      permission_repository.grant(role, &name).await?;
    }
  }
  log::info!("seeded {} permissions", catalogue().len());
  Ok(())
}

impl From<CreatePermissionDto> for CreatePermission {
  fn from(dto: CreatePermissionDto) -> Self {
    Self {
      uuid: custom_nanoid(),
      name: dto.name,
      description: dto.description,
    }
  }
}

impl From<Permission> for GetPermissionRto {
  fn from(permission: Permission) -> Self {
    Self {
      uuid: permission.uuid,
      name: permission.name,
      description: permission.description,
      created_at: permission.created_at,
      updated_at: permission.updated_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use actix_web::http::StatusCode;
  use actix_web::HttpRequest;

  use super::*;
  use crate::helpers::tests::{
    assert_status, create_fake_access_token_claims, http_request,
    parse_http_response,
  };
  use crate::permissions::repository::permission_repository::tests::InMemoryPermissionRepository;
  use crate::shared::http_error::HttpError;
  use crate::shared::rto::created_rto::CreatedRto;

  async fn seeded_repository() -> web::Data<InMemoryPermissionRepository> {
    let repository = InMemoryPermissionRepository::new();
    seed_default_permissions(&repository).await.unwrap();
    web::Data::new(repository)
  }

  #[actix_web::test]
  async fn test_seeding_twice_is_harmless() {
    let repository = InMemoryPermissionRepository::new();
    seed_default_permissions(&repository).await.unwrap();
    seed_default_permissions(&repository).await.unwrap();

    assert_eq!(repository.permissions.read().unwrap().len(), catalogue().len());
    let driver = repository.find_for_role(Role::Driver).await.unwrap();
    assert_eq!(driver.len(), default_grants(Role::Driver).len());
  }

  #[actix_web::test]
  async fn test_reseeding_keeps_operator_changes() {
    let repository = seeded_repository().await;
    let admin = create_fake_access_token_claims("admin", Role::Admin);
    let request: HttpRequest = http_request();

    let responder = revoke_role_permission(
      repository.clone(),
      web::Path::from(RolePermissionPathDto {
        role: Role::Manager,
        name: "trips.delete".to_string(),
      }),
      admin,
    )
    .await;
    assert_status(responder, &request, StatusCode::NO_CONTENT);
    let uuid = repository
      .permissions
      .read()
      .unwrap()
      .iter()
      .find(|p| p.name == "vendors.delete")
      .map(|p| p.uuid.clone())
      .unwrap();
    assert!(repository.delete(&uuid).await.unwrap());

    // Next boot.
    seed_default_permissions(&**repository).await.unwrap();

    assert!(!repository
      .role_has(Role::Manager, "trips.delete")
      .await
      .unwrap());
    assert!(!repository
      .permissions
      .read()
      .unwrap()
      .iter()
      .any(|p| p.name == "vendors.delete"));
  }

  #[actix_web::test]
  async fn test_create_and_grant_permission() {
    let repository = seeded_repository().await;
    let admin = create_fake_access_token_claims("admin", Role::Admin);
    let request: HttpRequest = http_request();

    let responder = create_permission(
      repository.clone(),
      web::Json(CreatePermissionDto {
        name: "fuel_logs.view".to_string(),
        description: Some("Read fuel logs".to_string()),
      }),
      admin.clone(),
    )
    .await;
    let rto: CreatedRto =
      parse_http_response(responder, &request, StatusCode::CREATED).await;
    assert!(!rto.uuid.is_empty());

    let responder = grant_role_permission(
      repository.clone(),
      web::Path::from(RolePermissionPathDto {
        role: Role::Driver,
        name: "fuel_logs.view".to_string(),
      }),
      admin.clone(),
    )
    .await;
    assert_status(responder, &request, StatusCode::NO_CONTENT);

    assert!(repository
      .role_has(Role::Driver, "fuel_logs.view")
      .await
      .unwrap());
  }

  #[actix_web::test]
  async fn test_invalid_permission_name_is_rejected() {
    let repository = seeded_repository().await;
    let admin = create_fake_access_token_claims("admin", Role::Admin);
    let request: HttpRequest = http_request();

    let responder = create_permission(
      repository,
      web::Json(CreatePermissionDto {
        name: "Fuel Logs".to_string(),
        description: None,
      }),
      admin,
    )
    .await;
    assert_status(responder, &request, StatusCode::BAD_REQUEST);
  }

  #[actix_web::test]
  async fn test_duplicate_permission_conflicts() {
    let repository = seeded_repository().await;
    let admin = create_fake_access_token_claims("admin", Role::Admin);
    let request: HttpRequest = http_request();

    let responder = create_permission(
      repository,
      web::Json(CreatePermissionDto {
        name: "vehicles.view".to_string(),
        description: None,
      }),
      admin,
    )
    .await;
    assert_status(responder, &request, StatusCode::CONFLICT);
  }

  #[actix_web::test]
  async fn test_grant_unknown_permission() {
    let repository = seeded_repository().await;
    let admin = create_fake_access_token_claims("admin", Role::Admin);
    let request: HttpRequest = http_request();

    let responder = grant_role_permission(
      repository,
      web::Path::from(RolePermissionPathDto {
        role: Role::Manager,
        name: "nothing.here".to_string(),
      }),
      admin,
    )
    .await;
    let error: HttpError =
      parse_http_response(responder, &request, StatusCode::NOT_FOUND).await;
    assert_eq!(error.message, "Permission not found");
  }

  #[actix_web::test]
  async fn test_manager_cannot_revoke() {
    let repository = seeded_repository().await;
    let manager = create_fake_access_token_claims("m", Role::Manager);
    let request: HttpRequest = http_request();

    let responder = revoke_role_permission(
      repository,
      web::Path::from(RolePermissionPathDto {
        role: Role::Driver,
        name: "trips.view".to_string(),
      }),
      manager,
    )
    .await;
    assert_status(responder, &request, StatusCode::FORBIDDEN);
  }

  #[actix_web::test]
  async fn test_rename_keeps_grants() {
    let repository = seeded_repository().await;
    let admin = create_fake_access_token_claims("admin", Role::Admin);
    let request: HttpRequest = http_request();
    let uuid = repository
      .permissions
      .read()
      .unwrap()
      .iter()
      .find(|p| p.name == "trips.view")
      .map(|p| p.uuid.clone())
      .unwrap();

    let responder = update_permission(
      repository.clone(),
      web::Path::from(UuidPathDto { uuid }),
      web::Json(CreatePermissionDto {
        name: "trips.read".to_string(),
        description: None,
      }),
      admin.clone(),
    )
    .await;
    let rto: GetPermissionRto =
      parse_http_response(responder, &request, StatusCode::OK).await;
    assert_eq!(rto.name, "trips.read");

    let responder = get_role_permissions(
      repository,
      web::Path::from(RolePathDto { role: Role::Driver }),
      admin,
    )
    .await;
    let rto: RolePermissionsRto =
      parse_http_response(responder, &request, StatusCode::OK).await;
    assert!(rto.permissions.contains(&"trips.read".to_string()));
    assert!(!rto.permissions.contains(&"trips.view".to_string()));
  }
}
