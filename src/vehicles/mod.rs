pub mod dto;
pub mod model;
pub mod repository;
pub mod rto;

use actix_web::{web, HttpResponse, Responder};
use dto::vehicle_dto::VehicleDto;
use dto::vehicle_list_query_dto::VehicleListQueryDto;
use model::Vehicle;
use repository::vehicle_repository::{
  CreateVehicle, UpdateVehicle, VehicleRepository,
};
use rto::get_vehicle_rto::GetVehicleRto;
use validator::Validate;

use crate::assignments::model::AssignmentKind;
use crate::assignments::repository::assignment_repository::AssignmentHistoryRepository;
use crate::assignments::tracker::{recorded, track};
use crate::assignments::{history_response, HistorySide};
use crate::auth::model::access_token_claims::AccessTokenClaims;
use crate::custom_nanoid;
use crate::permissions::model::Action;
use crate::permissions::repository::permission_repository::PermissionRepository;
use crate::shared::authorization::authorize;
use crate::shared::dto::uuid_path_dto::UuidPathDto;
use crate::shared::responses::{
  conflict, created, no_content, not_found, ok, repository_error,
  unprocessable, validation_failed,
};
use crate::shared::rto::list_rto::ListRto;
use crate::trips::repository::trip_repository::{TripFilter, TripRepository};
use crate::users::repository::user_repository::UserRepository;

const RESOURCE: &str = "vehicles";

/// A driver must be an active `driver` user that holds no other vehicle.
async fn ensure_driver_available<UR, VR>(
  user_repository: &UR,
  vehicle_repository: &VR,
  driver_uuid: Option<&str>,
  vehicle_uuid: Option<&str>,
) -> Result<(), HttpResponse>
where
  UR: UserRepository,
  VR: VehicleRepository,
{
  let Some(driver_uuid) = driver_uuid else {
    return Ok(());
  };
  match user_repository.find_one(driver_uuid).await {
    Ok(Some(user)) if user.can_drive() => {}
    Ok(_) => {
      return Err(unprocessable(
        "Driver must be an active user with the driver role",
      ))
    }
    Err(error) => return Err(repository_error(error)),
  }
  match vehicle_repository.find_by_driver(driver_uuid).await {
    Ok(Some(held)) if Some(held.uuid.as_str()) != vehicle_uuid => {
      Err(conflict("Driver is already assigned to another vehicle"))
    }
    Ok(_) => Ok(()),
    Err(error) => Err(repository_error(error)),
  }
}

pub async fn list_vehicles<
  VR: VehicleRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  vehicle_repository: web::Data<VR>,
  permission_repository: web::Data<PR>,
  query: web::Query<VehicleListQueryDto>,
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
  vehicle_repository
    .find_all(&query.filter(), pagination)
    .await
    .map(|vehicles| ok(ListRto::<GetVehicleRto>::new(vehicles, pagination)))
    .unwrap_or_else(repository_error)
}

pub async fn get_vehicle<
  VR: VehicleRepository + 'static,
  PR: PermissionRepository + 'static,
>(
  vehicle_repository: web::Data<VR>,
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
  match vehicle_repository.find_one(&path.uuid).await {
    Ok(Some(vehicle)) => ok(GetVehicleRto::from(vehicle)),
    Ok(None) => not_found("Vehicle"),
    Err(error) => repository_error(error),
  }
}

pub async fn create_vehicle<
  VR: VehicleRepository + 'static,
  PR: PermissionRepository + 'static,
  UR: UserRepository + 'static,
>(
  vehicle_repository: web::Data<VR>,
  permission_repository: web::Data<PR>,
  user_repository: web::Data<UR>,
  dto: web::Json<VehicleDto>,
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
  if let Err(response) = ensure_driver_available(
    &**user_repository,
    &**vehicle_repository,
    dto.driver_uuid.as_deref(),
    None,
  )
  .await
  {
    return response;
  }

  let create = CreateVehicle {
    uuid: custom_nanoid(),
    fields: UpdateVehicle::from(dto.into_inner()),
  };
  let assignments = track(
    AssignmentKind::VehicleDriver,
    &create.uuid,
    None,
    create.fields.driver_uuid.as_deref(),
  );
  let vehicle = match vehicle_repository
    .create(create, assignments.clone())
    .await
  {
    Ok(vehicle) => vehicle,
    Err(error) => return repository_error(error),
  };
  recorded(&assignments);
  created(format!("/v1/vehicles/{}", vehicle.uuid), vehicle.uuid)
}

pub async fn update_vehicle<
  VR: VehicleRepository + 'static,
  PR: PermissionRepository + 'static,
  UR: UserRepository + 'static,
>(
  vehicle_repository: web::Data<VR>,
  permission_repository: web::Data<PR>,
  user_repository: web::Data<UR>,
  path: web::Path<UuidPathDto>,
  dto: web::Json<VehicleDto>,
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
  let existing = match vehicle_repository.find_one(&path.uuid).await {
    Ok(Some(vehicle)) => vehicle,
    Ok(None) => return not_found("Vehicle"),
    Err(error) => return repository_error(error),
  };
  if let Err(response) = ensure_driver_available(
    &**user_repository,
    &**vehicle_repository,
    dto.driver_uuid.as_deref(),
    Some(&existing.uuid),
  )
  .await
  {
    return response;
  }

  let fields = UpdateVehicle::from(dto.into_inner());
  let assignments = track(
    AssignmentKind::VehicleDriver,
    &existing.uuid,
    existing.driver_uuid.as_deref(),
    fields.driver_uuid.as_deref(),
  );
  let vehicle = match vehicle_repository
    .update(&existing.uuid, fields, assignments.clone())
    .await
  {
    Ok(Some(vehicle)) => vehicle,
    Ok(None) => return not_found("Vehicle"),
    Err(error) => return repository_error(error),
  };
  recorded(&assignments);
  ok(GetVehicleRto::from(vehicle))
}

pub async fn delete_vehicle<
  VR: VehicleRepository + 'static,
  PR: PermissionRepository + 'static,
  TR: TripRepository + 'static,
  HR: AssignmentHistoryRepository + 'static,
>(
  vehicle_repository: web::Data<VR>,
  permission_repository: web::Data<PR>,
  trip_repository: web::Data<TR>,
  history_repository: web::Data<HR>,
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
  let existing = match vehicle_repository.find_one(&path.uuid).await {
    Ok(Some(vehicle)) => vehicle,
    Ok(None) => return not_found("Vehicle"),
    Err(error) => return repository_error(error),
  };
  match trip_repository
    .count(&TripFilter::active_for_vehicle(&existing.uuid))
    .await
  {
    Ok(0) => {}
    Ok(_) => return conflict("Vehicle has scheduled or in-progress trips"),
    Err(error) => return repository_error(error),
  }

  // Finished trips lose their vehicle with it, so their records close too.
  let served = match history_repository
    .find_by_assignee(AssignmentKind::TripVehicle, &existing.uuid)
    .await
  {
    Ok(records) => records,
    Err(error) => return repository_error(error),
  };
  let mut assignments = track(
    AssignmentKind::VehicleDriver,
    &existing.uuid,
    existing.driver_uuid.as_deref(),
    None,
  );
  for record in served.iter().filter(|record| record.is_current) {
    assignments.extend(track(
      AssignmentKind::TripVehicle,
      &record.subject_uuid,
      Some(&existing.uuid),
      None,
    ));
  }

  match vehicle_repository
    .delete(&existing.uuid, assignments.clone())
    .await
  {
    Ok(true) => {}
    Ok(false) => return not_found("Vehicle"),
    Err(error) => return repository_error(error.on_delete()),
  }
  recorded(&assignments);
  no_content()
}

pub async fn get_vehicle_driver_history<
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
    AssignmentKind::VehicleDriver,
    HistorySide::Subject,
    &path.uuid,
  )
  .await
}

impl From<VehicleDto> for UpdateVehicle {
  fn from(dto: VehicleDto) -> Self {
    Self {
      plate_number: dto.plate_number.to_uppercase(),
      make: dto.make,
      model: dto.model,
      year: dto.year,
      capacity: dto.capacity,
      status: dto.status,
      department_uuid: dto.department_uuid,
      vendor_uuid: dto.vendor_uuid,
      driver_uuid: dto.driver_uuid,
    }
  }
}

impl From<Vehicle> for GetVehicleRto {
  fn from(vehicle: Vehicle) -> Self {
    Self {
      uuid: vehicle.uuid,
      plate_number: vehicle.plate_number,
      make: vehicle.make,
      model: vehicle.model,
      year: vehicle.year,
      capacity: vehicle.capacity,
      status: vehicle.status,
      department_uuid: vehicle.department_uuid,
      vendor_uuid: vehicle.vendor_uuid,
      driver_uuid: vehicle.driver_uuid,
      created_at: vehicle.created_at,
      updated_at: vehicle.updated_at,
    }
  }
}
