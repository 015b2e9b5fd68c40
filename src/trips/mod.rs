pub mod dto;
pub mod model;
pub mod repository;
pub mod rto;

use actix_web::{web, HttpResponse, Responder};
use dto::trip_dto::TripDto;
use dto::trip_list_query_dto::TripListQueryDto;
use model::Trip;
use repository::trip_repository::{CreateTrip, TripRepository, UpdateTrip};
use rto::get_trip_rto::GetTripRto;
use validator::Validate;

use crate::assignments::model::AssignmentKind;
use crate::assignments::repository::assignment_repository::AssignmentHistoryRepository;
use crate::assignments::tracker::{recorded, track};
use crate::assignments::{history_response, HistorySide};
use crate::auth::model::access_token_claims::AccessTokenClaims;
use crate::custom_nanoid;
use crate::permissions::model::Action;
use crate::permissions::repository::permission_repository::PermissionRepository;
use crate::routes::repository::route_repository::RouteRepository;
use crate::shared::authorization::authorize;
use crate::shared::dto::uuid_path_dto::UuidPathDto;
use crate::shared::responses::{
  conflict, created, no_content, not_found, ok, repository_error,
  unprocessable, validation_failed,
};
use crate::shared::rto::list_rto::ListRto;
use crate::vehicles::repository::vehicle_repository::VehicleRepository;

const RESOURCE: &str = "trips";

/// Checks the references of a trip body: the route must exist and an
/// assigned vehicle must be dispatchable and big enough.
///
/// On update the vehicle is only looked at again when it changes or must
/// seat more passengers, and a trip that is being closed out may keep a
/// vehicle that can no longer be dispatched.
async fn ensure_bookable<RR, VR>(
  route_repository: &RR,
  vehicle_repository: &VR,
  fields: &UpdateTrip,
  existing: Option<&Trip>,
) -> Result<(), HttpResponse>
where
  RR: RouteRepository,
  VR: VehicleRepository,
{
  match route_repository.find_one(&fields.route_uuid).await {
    Ok(Some(_)) => {}
    Ok(None) => return Err(unprocessable("Route does not exist")),
    Err(error) => return Err(repository_error(error)),
  }
  let Some(vehicle_uuid) = &fields.vehicle_uuid else {
    return Ok(());
  };
  let same_vehicle =
    existing.is_some_and(|trip| trip.vehicle_uuid == fields.vehicle_uuid);
  let more_passengers =
    existing.map_or(true, |trip| fields.passengers > trip.passengers);
  if same_vehicle && !more_passengers {
    return Ok(());
  }

  let vehicle = match vehicle_repository.find_one(vehicle_uuid).await {
    Ok(Some(vehicle)) => vehicle,
    Ok(None) => return Err(unprocessable("Vehicle does not exist")),
    Err(error) => return Err(repository_error(error)),
  };
  if !same_vehicle
    && !fields.status.is_terminal()
    && !vehicle.status.is_dispatchable()
  {
    return Err(unprocessable(&format!(
      "Vehicle is {} and cannot be dispatched",
      vehicle.status
    )));
  }
  if fields.passengers > vehicle.capacity {
    return Err(unprocessable(&format!(
      "Vehicle seats at most {} passengers",
      vehicle.capacity
    )));
  }
  Ok(())
}

/// The requester and the current driver of the trip's vehicle may always
/// see a trip; anyone else needs `trips.view`.
async fn authorize_trip_view<PR, VR>(
  permission_repository: &PR,
  vehicle_repository: &VR,
  auth: &AccessTokenClaims,
  trip: &Trip,
) -> Result<(), HttpResponse>
where
  PR: PermissionRepository,
  VR: VehicleRepository,
{
  if auth.is_self(&trip.requester_uuid) {
    return Ok(());
  }
  if let Some(vehicle_uuid) = &trip.vehicle_uuid {
    match vehicle_repository.find_one(vehicle_uuid).await {
      Ok(Some(vehicle))
        if vehicle.driver_uuid.as_deref() == Some(auth.uuid.as_str()) =>
      {
        return Ok(())
      }
      Ok(_) => {}
      Err(error) => return Err(repository_error(error)),
    }
  }
  authorize(permission_repository, auth, RESOURCE, Action::View).await
}

pub async fn list_trips<
  TR: TripRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  trip_repository: web::Data<TR>,
  permission_repository: web::Data<PR>,
  query: web::Query<TripListQueryDto>,
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
  trip_repository
    .find_all(&query.filter(), pagination)
    .await
    .map(|trips| ok(ListRto::<GetTripRto>::new(trips, pagination)))
    .unwrap_or_else(repository_error)
}

pub async fn get_trip<
  TR: TripRepository + 'static,
  PR: PermissionRepository + 'static,
  VR: VehicleRepository + 'static,
>(
  trip_repository: web::Data<TR>,
  permission_repository: web::Data<PR>,
  vehicle_repository: web::Data<VR>,
  path: web::Path<UuidPathDto>,
  auth: AccessTokenClaims,
) -> impl Responder {
  if let Err(validation_errors) = path.validate() {
    return validation_failed(validation_errors);
  }
  let trip = match trip_repository.find_one(&path.uuid).await {
    Ok(Some(trip)) => trip,
    Ok(None) => return not_found("Trip"),
    Err(error) => return repository_error(error),
  };
  if let Err(response) = authorize_trip_view(
    &**permission_repository,
    &**vehicle_repository,
    &auth,
    &trip,
  )
  .await
  {
    return response;
  }
  ok(GetTripRto::from(trip))
}

pub async fn create_trip<
  TR: TripRepository + 'static,
  PR: PermissionRepository + 'static,
  RR: RouteRepository + 'static,
  VR: VehicleRepository + 'static,
>(
  trip_repository: web::Data<TR>,
  permission_repository: web::Data<PR>,
  route_repository: web::Data<RR>,
  vehicle_repository: web::Data<VR>,
  dto: web::Json<TripDto>,
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
  let fields = UpdateTrip::from(dto.into_inner());
  if let Err(response) =
    ensure_bookable(&**route_repository, &**vehicle_repository, &fields, None)
      .await
  {
    return response;
  }

  let create = CreateTrip {
    uuid: custom_nanoid(),
    requester_uuid: auth.uuid.clone(),
    fields,
  };
  let assignments = track(
    AssignmentKind::TripVehicle,
    &create.uuid,
    None,
    create.fields.vehicle_uuid.as_deref(),
  );
  let trip = match trip_repository.create(create, assignments.clone()).await {
    Ok(trip) => trip,
    Err(error) => return repository_error(error),
  };
  recorded(&assignments);
  created(format!("/v1/trips/{}", trip.uuid), trip.uuid)
}

pub async fn update_trip<
  TR: TripRepository + 'static,
  PR: PermissionRepository + 'static,
  RR: RouteRepository + 'static,
  VR: VehicleRepository + 'static,
>(
  trip_repository: web::Data<TR>,
  permission_repository: web::Data<PR>,
  route_repository: web::Data<RR>,
  vehicle_repository: web::Data<VR>,
  path: web::Path<UuidPathDto>,
  dto: web::Json<TripDto>,
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
  let existing = match trip_repository.find_one(&path.uuid).await {
    Ok(Some(trip)) => trip,
    Ok(None) => return not_found("Trip"),
    Err(error) => return repository_error(error),
  };
  if existing.status.is_terminal() {
    return conflict(&format!(
      "Trip is {} and can no longer change",
      existing.status
    ));
  }
  let fields = UpdateTrip::from(dto.into_inner());
  if let Err(response) = ensure_bookable(
    &**route_repository,
    &**vehicle_repository,
    &fields,
    Some(&existing),
  )
  .await
  {
    return response;
  }

  let assignments = track(
    AssignmentKind::TripVehicle,
    &existing.uuid,
    existing.vehicle_uuid.as_deref(),
    fields.vehicle_uuid.as_deref(),
  );
  let trip = match trip_repository
    .update(&existing.uuid, fields, assignments.clone())
    .await
  {
    Ok(Some(trip)) => trip,
    Ok(None) => return not_found("Trip"),
    Err(error) => return repository_error(error),
  };
  recorded(&assignments);
  ok(GetTripRto::from(trip))
}

pub async fn delete_trip<
  TR: TripRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  trip_repository: web::Data<TR>,
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
  let existing = match trip_repository.find_one(&path.uuid).await {
    Ok(Some(trip)) => trip,
    Ok(None) => return not_found("Trip"),
    Err(error) => return repository_error(error),
  };
  let assignments = track(
    AssignmentKind::TripVehicle,
    &existing.uuid,
    existing.vehicle_uuid.as_deref(),
    None,
  );
  match trip_repository
    .delete(&existing.uuid, assignments.clone())
    .await
  {
    Ok(true) => {}
    Ok(false) => return not_found("Trip"),
    Err(error) => return repository_error(error.on_delete()),
  }
  recorded(&assignments);
  no_content()
}

pub async fn get_trip_vehicle_history<
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
  if let Err(response) =
    authorize(&**permission_repository, &auth, RESOURCE, Action::View).await
  {
    return response;
  }
  history_response(
    &**history_repository,
    AssignmentKind::TripVehicle,
    HistorySide::Subject,
    &path.uuid,
  )
  .await
}

impl From<TripDto> for UpdateTrip {
  fn from(dto: TripDto) -> Self {
    Self {
      route_uuid: dto.route_uuid,
      vehicle_uuid: dto.vehicle_uuid,
      purpose: dto.purpose,
      passengers: dto.passengers,
      departure_at: dto.departure_at,
      return_at: dto.return_at,
      status: dto.status,
    }
  }
}

impl From<Trip> for GetTripRto {
  fn from(trip: Trip) -> Self {
    Self {
      uuid: trip.uuid,
      route_uuid: trip.route_uuid,
      vehicle_uuid: trip.vehicle_uuid,
      requester_uuid: trip.requester_uuid,
      purpose: trip.purpose,
      passengers: trip.passengers,
      departure_at: trip.departure_at,
      return_at: trip.return_at,
      status: trip.status,
      created_at: trip.created_at,
      updated_at: trip.updated_at,
    }
  }
}
