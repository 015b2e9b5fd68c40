pub mod dto;
pub mod model;
pub mod repository;
pub mod rto;

use actix_web::{web, HttpResponse, Responder};
use dto::create_user_dto::CreateUserDto;
use dto::update_user_dto::UpdateUserDto;
use dto::user_list_query_dto::UserListQueryDto;
use model::User;
use repository::user_repository::{CreateUser, UpdateUser, UserRepository};
use rto::get_user_rto::GetUserRto;
use validator::Validate;

use crate::assignments::model::AssignmentKind;
use crate::assignments::repository::assignment_repository::AssignmentHistoryRepository;
use crate::assignments::{history_response, HistorySide};
use crate::auth::model::access_token_claims::AccessTokenClaims;
use crate::auth::password::hash_password;
use crate::custom_nanoid;
use crate::permissions::model::Action;
use crate::permissions::repository::permission_repository::PermissionRepository;
use crate::shared::authorization::{authorize, authorize_self_or};
use crate::shared::config::Config;
use crate::shared::dto::uuid_path_dto::UuidPathDto;
use crate::shared::responses::{
  conflict, created, forbidden, internal_error, no_content, not_found, ok,
  repository_error, validation_failed,
};
use crate::shared::role::Role;
use crate::shared::rto::list_rto::ListRto;
use crate::vehicles::repository::vehicle_repository::VehicleRepository;

const RESOURCE: &str = "users";

/// Hashes the password and stores the user. Shared with the master key
/// bootstrap endpoint.
pub async fn insert_user<UR: UserRepository>(
  user_repository: &UR,
  bcrypt_cost: u32,
  dto: CreateUserDto,
) -> HttpResponse {
  let password_hash = match hash_password(dto.password, bcrypt_cost).await {
    Ok(hash) => hash,
    Err(error) => {
      log::error!("{error}");
      return internal_error();
    }
  };
  let create = CreateUser {
    uuid: custom_nanoid(),
    user_name: dto.user_name,
    email: dto.email.to_lowercase(),
    full_name: dto.full_name,
    role: dto.role,
    department_uuid: dto.department_uuid,
    password_hash,
    is_active: dto.is_active,
  };
  match user_repository.create(create).await {
    Ok(user) => {
      log::info!("created {} user {}", user.role, user.uuid);
      created(format!("/v1/users/{}", user.uuid), user.uuid)
    }
    Err(error) => repository_error(error),
  }
}

async fn is_current_driver<VR: VehicleRepository>(
  vehicle_repository: &VR,
  user_uuid: &str,
) -> Result<bool, HttpResponse> {
  vehicle_repository
    .find_by_driver(user_uuid)
    .await
    .map(|vehicle| vehicle.is_some())
    .map_err(repository_error)
}

pub async fn list_users<
  UR: UserRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  user_repository: web::Data<UR>,
  permission_repository: web::Data<PR>,
  query: web::Query<UserListQueryDto>,
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
  let pagination = query.pagination();
  user_repository
    .find_all(&query.filter(), pagination)
    .await
    .map(|users| ok(ListRto::<GetUserRto>::new(users, pagination)))
    .unwrap_or_else(repository_error)
}

pub async fn get_user<
  UR: UserRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  user_repository: web::Data<UR>,
  permission_repository: web::Data<PR>,
  path: web::Path<UuidPathDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(validation_errors) = path.validate() {
    return validation_failed(validation_errors);
  }
  if let Err(response) = authorize_self_or(
    &**permission_repository,
    &auth,
    &path.uuid,
    RESOURCE,
    Action::View,
  )
  .await
  {
    return response;
  }
  match user_repository.find_one(&path.uuid).await {
    Ok(Some(user)) => ok(GetUserRto::from(user)),
    Ok(None) => not_found("User"),
    Err(error) => repository_error(error),
  }
}

pub async fn create_user<
  UR: UserRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  user_repository: web::Data<UR>,
  permission_repository: web::Data<PR>,
  config: web::Data<Config>,
  dto: web::Json<CreateUserDto>,
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
  // Only admins hand out admin accounts.
  if dto.role == Role::Admin && !auth.is_admin() {
    return forbidden();
  }
  insert_user(&**user_repository, config.bcrypt_cost, dto.into_inner()).await
}

/// Users may edit their own contact details and password. Role, department
/// and activation changes need `users.update`, and admin accounts are only
/// touched by admins.
pub async fn update_user<
  UR: UserRepository + 'static,
  PR: PermissionRepository + 'static,
  VR: VehicleRepository + 'static,
>(
  user_repository: web::Data<UR>,
  permission_repository: web::Data<PR>,
  vehicle_repository: web::Data<VR>,
  config: web::Data<Config>,
  path: web::Path<UuidPathDto>,
  dto: web::Json<UpdateUserDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(validation_errors) = path.validate() {
    return validation_failed(validation_errors);
  }
  if let Err(validation_errors) = dto.validate() {
    return validation_failed(validation_errors);
  }
  let existing = match user_repository.find_one(&path.uuid).await {
    Ok(Some(user)) => user,
    Ok(None) => return not_found("User"),
    Err(error) => return repository_error(error),
  };

  let privileged = dto.role != existing.role
    || dto.department_uuid != existing.department_uuid
    || dto.is_active != existing.is_active;
  if privileged || !auth.is_self(&existing.uuid) {
    if let Err(response) =
      authorize(&**permission_repository, &auth, RESOURCE, Action::Update)
        .await
    {
      return response;
    }
  }
  if (existing.role == Role::Admin || dto.role == Role::Admin)
    && !auth.is_admin()
  {
    return forbidden();
  }

  let keeps_driving = dto.is_active && dto.role == Role::Driver;
  if existing.can_drive() && !keeps_driving {
    match is_current_driver(&**vehicle_repository, &existing.uuid).await {
      Ok(false) => {}
      Ok(true) => {
        return conflict("User is the current driver of a vehicle")
      }
      Err(response) => return response,
    }
  }

  let dto = dto.into_inner();
  let password_hash = match dto.password {
    Some(password) => match hash_password(password, config.bcrypt_cost).await
    {
      Ok(hash) => Some(hash),
      Err(error) => {
        log::error!("{error}");
        return internal_error();
      }
    },
    None => None,
  };
  let update = UpdateUser {
    email: dto.email.to_lowercase(),
    full_name: dto.full_name,
    role: dto.role,
    department_uuid: dto.department_uuid,
    password_hash,
    is_active: dto.is_active,
  };
  match user_repository.update(&existing.uuid, update).await {
    Ok(Some(user)) => ok(GetUserRto::from(user)),
    Ok(None) => not_found("User"),
    Err(error) => repository_error(error),
  }
}

pub async fn delete_user<
  UR: UserRepository + 'static,
  PR: PermissionRepository + 'static,
  VR: VehicleRepository + 'static,
>(
  user_repository: web::Data<UR>,
  permission_repository: web::Data<PR>,
  vehicle_repository: web::Data<VR>,
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
  if auth.is_self(&path.uuid) {
    return conflict("Users cannot delete themselves");
  }
  let existing = match user_repository.find_one(&path.uuid).await {
    Ok(Some(user)) => user,
    Ok(None) => return not_found("User"),
    Err(error) => return repository_error(error),
  };
  if existing.role == Role::Admin && !auth.is_admin() {
    return forbidden();
  }
  match is_current_driver(&**vehicle_repository, &existing.uuid).await {
    Ok(false) => {}
    Ok(true) => return conflict("User is the current driver of a vehicle"),
    Err(response) => return response,
  }
  match user_repository.delete(&existing.uuid).await {
    Ok(true) => no_content(),
    Ok(false) => not_found("User"),
    Err(error) => repository_error(error.on_delete()),
  }
}

/// Vehicles the user has driven, newest first.
pub async fn get_user_vehicle_history<
  PR: PermissionRepository + 'static,
  HR: AssignmentHistoryRepository + 'static,
>(
  permission_repository: web::Data<PR>,
  history_repository: web::Data<HR>,
  path: web::Path<UuidPathDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(validation_errors) = path.validate() {
    return validation_failed(validation_errors);
  }
  if let Err(response) = authorize_self_or(
    &**permission_repository,
    &auth,
    &path.uuid,
    "vehicles",
    Action::View,
  )
  .await
  {
    return response;
  }
  history_response(
    &**history_repository,
    AssignmentKind::VehicleDriver,
    HistorySide::Assignee,
    &path.uuid,
  )
  .await
}

impl From<User> for GetUserRto {
  fn from(user: User) -> Self {
    Self {
      uuid: user.uuid,
      user_name: user.user_name,
      email: user.email,
      full_name: user.full_name,
      role: user.role,
      department_uuid: user.department_uuid,
      is_active: user.is_active,
      created_at: user.created_at,
      updated_at: user.updated_at,
    }
  }
}
