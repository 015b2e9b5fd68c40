pub mod dto;
pub mod model;
pub mod repository;
pub mod rto;

use actix_web::{web, Responder};
use dto::route_dto::RouteDto;
use model::Route;
use repository::route_repository::{CreateRoute, RouteRepository, UpdateRoute};
use rto::get_route_rto::GetRouteRto;
use validator::Validate;

use crate::auth::model::access_token_claims::AccessTokenClaims;
use crate::custom_nanoid;
use crate::permissions::model::Action;
use crate::permissions::repository::permission_repository::PermissionRepository;
use crate::shared::authorization::authorize;
use crate::shared::dto::pagination_dto::{Pagination, PaginationDto};
use crate::shared::dto::uuid_path_dto::UuidPathDto;
use crate::shared::responses::{
  conflict, created, no_content, not_found, ok, repository_error,
  validation_failed,
};
use crate::shared::rto::list_rto::ListRto;
use crate::trips::repository::trip_repository::{TripFilter, TripRepository};

const RESOURCE: &str = "routes";

pub async fn list_routes<
  RR: RouteRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  route_repository: web::Data<RR>,
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
  route_repository
    .find_all(pagination)
    .await
    .map(|routes| ok(ListRto::<GetRouteRto>::new(routes, pagination)))
    .unwrap_or_else(repository_error)
}

pub async fn get_route<
  RR: RouteRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  route_repository: web::Data<RR>,
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
  match route_repository.find_one(&path.uuid).await {
    Ok(Some(route)) => ok(GetRouteRto::from(route)),
    Ok(None) => not_found("Route"),
    Err(error) => repository_error(error),
  }
}

pub async fn create_route<
  RR: RouteRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  route_repository: web::Data<RR>,
  permission_repository: web::Data<PR>,
  dto: web::Json<RouteDto>,
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
  let create = CreateRoute {
    uuid: custom_nanoid(),
    fields: UpdateRoute::from(dto.into_inner()),
  };
  route_repository
    .create(create)
    .await
    .map(|route| created(format!("/v1/routes/{}", route.uuid), route.uuid))
    .unwrap_or_else(repository_error)
}

pub async fn update_route<
  RR: RouteRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  route_repository: web::Data<RR>,
  permission_repository: web::Data<PR>,
  path: web::Path<UuidPathDto>,
  dto: web::Json<RouteDto>,
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
  match route_repository
    .update(&path.uuid, UpdateRoute::from(dto.into_inner()))
    .await
  {
    Ok(Some(route)) => ok(GetRouteRto::from(route)),
    Ok(None) => not_found("Route"),
    Err(error) => repository_error(error),
  }
}

/// Routes referenced by any trip, finished or not, stay.
pub async fn delete_route<
  RR: RouteRepository + 'static,
  PR: PermissionRepository + 'static,
  TR: TripRepository + 'static,
>(
  route_repository: web::Data<RR>,
  permission_repository: web::Data<PR>,
  trip_repository: web::Data<TR>,
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
  match trip_repository.count(&TripFilter::for_route(&path.uuid)).await {
    Ok(0) => {}
    Ok(_) => return conflict("Route is used by trips"),
    Err(error) => return repository_error(error),
  }
  match route_repository.delete(&path.uuid).await {
    Ok(true) => no_content(),
    Ok(false) => not_found("Route"),
    Err(error) => repository_error(error.on_delete()),
  }
}

impl From<RouteDto> for UpdateRoute {
  fn from(dto: RouteDto) -> Self {
    Self {
      name: dto.name,
      origin: dto.origin,
      destination: dto.destination,
      distance_km: dto.distance_km,
      estimated_minutes: dto.estimated_minutes,
    }
  }
}

impl From<Route> for GetRouteRto {
  fn from(route: Route) -> Self {
    Self {
      uuid: route.uuid,
      name: route.name,
      origin: route.origin,
      destination: route.destination,
      distance_km: route.distance_km,
      estimated_minutes: route.estimated_minutes,
      created_at: route.created_at,
      updated_at: route.updated_at,
    }
  }
}
