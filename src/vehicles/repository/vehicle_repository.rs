use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, QueryBuilder, Row};

use crate::assignments::repository::assignment_repository::{
  transition_in, AssignmentTransition,
};
use crate::shared::database::Database;
use crate::shared::dto::pagination_dto::Pagination;
use crate::shared::repository::RepositoryError;
use crate::vehicles::model::{Vehicle, VehicleStatus};

pub trait VehicleRepository {
  async fn find_all(
    &self,
    filter: &VehicleFilter,
    pagination: Pagination,
  ) -> Result<Vec<Vehicle>, RepositoryError>;
  async fn find_one(
    &self,
    uuid: &str,
  ) -> Result<Option<Vehicle>, RepositoryError>;
  /// The vehicle the driver currently holds, if any.
  async fn find_by_driver(
    &self,
    driver_uuid: &str,
  ) -> Result<Option<Vehicle>, RepositoryError>;
  /// Writes go through together with `assignments`, or not at all.
  async fn create(
    &self,
    create_vehicle: CreateVehicle,
    assignments: Vec<AssignmentTransition>,
  ) -> Result<Vehicle, RepositoryError>;
  async fn update(
    &self,
    uuid: &str,
    update_vehicle: UpdateVehicle,
    assignments: Vec<AssignmentTransition>,
  ) -> Result<Option<Vehicle>, RepositoryError>;
  async fn delete(
    &self,
    uuid: &str,
    assignments: Vec<AssignmentTransition>,
  ) -> Result<bool, RepositoryError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleFilter {
  pub status: Option<VehicleStatus>,
  pub department_uuid: Option<String>,
  pub vendor_uuid: Option<String>,
  pub driver_uuid: Option<String>,
}

impl VehicleFilter {
  pub fn matches(&self, vehicle: &Vehicle) -> bool {
    fn same(wanted: &Option<String>, actual: &Option<String>) -> bool {
      wanted.is_none() || wanted == actual
    }
    self.status.map_or(true, |status| vehicle.status == status)
      && same(&self.department_uuid, &vehicle.department_uuid)
      && same(&self.vendor_uuid, &vehicle.vendor_uuid)
      && same(&self.driver_uuid, &vehicle.driver_uuid)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVehicle {
  pub uuid: String,
  pub fields: UpdateVehicle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateVehicle {
  pub plate_number: String,
  pub make: String,
  pub model: String,
  pub year: i32,
  pub capacity: i32,
  pub status: VehicleStatus,
  pub department_uuid: Option<String>,
  pub vendor_uuid: Option<String>,
  pub driver_uuid: Option<String>,
}

pub struct VehicleRepositoryImpl {
  pool: Arc<Pool<Postgres>>,
}

impl VehicleRepositoryImpl {
  pub fn new(database: Arc<Database>) -> Self {
    Self {
      pool: database.pool.clone(),
    }
  }
}

const COLUMNS: &str = "uuid, created_at, updated_at, plate_number, make, model, year, capacity, status, department_uuid, vendor_uuid, driver_uuid";

impl VehicleRepository for VehicleRepositoryImpl {
  async fn find_all(
    &self,
    filter: &VehicleFilter,
    pagination: Pagination,
  ) -> Result<Vec<Vehicle>, RepositoryError> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
      "SELECT {COLUMNS} FROM vehicles WHERE TRUE"
    ));
    if let Some(status) = filter.status {
      builder.push(" AND status = ").push_bind(status.as_str());
    }
    let optional_columns = [
      ("department_uuid", &filter.department_uuid),
      ("vendor_uuid", &filter.vendor_uuid),
      ("driver_uuid", &filter.driver_uuid),
    ];
    for (column, value) in optional_columns {
      if let Some(value) = value {
        builder
          .push(format!(" AND {column} = "))
          .push_bind(value.clone());
      }
    }
    builder
      .push(" ORDER BY plate_number LIMIT ")
      .push_bind(pagination.limit())
      .push(" OFFSET ")
      .push_bind(pagination.offset());

    builder
      .build()
      .try_map(|row: PgRow| Vehicle::try_from(row))
      .fetch_all(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn find_one(
    &self,
    uuid: &str,
  ) -> Result<Option<Vehicle>, RepositoryError> {
    let query = format!("SELECT {COLUMNS} FROM vehicles WHERE uuid = $1");
    sqlx::query(&query)
      .bind(uuid)
      .try_map(|row: PgRow| Vehicle::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn find_by_driver(
    &self,
    driver_uuid: &str,
  ) -> Result<Option<Vehicle>, RepositoryError> {
    let query = format!("SELECT {COLUMNS} FROM vehicles WHERE driver_uuid = $1");
    sqlx::query(&query)
      .bind(driver_uuid)
      .try_map(|row: PgRow| Vehicle::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn create(
    &self,
    create_vehicle: CreateVehicle,
    assignments: Vec<AssignmentTransition>,
  ) -> Result<Vehicle, RepositoryError> {
    let mut tx = self.pool.begin().await?;
    let query = format!(
      r#"
      INSERT INTO vehicles (uuid, plate_number, make, model, year, capacity, status, department_uuid, vendor_uuid, driver_uuid)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
      RETURNING {COLUMNS}
    "#
    );
    let fields = &create_vehicle.fields;
    let vehicle = sqlx::query(&query)
      .bind(&create_vehicle.uuid)
      .bind(&fields.plate_number)
      .bind(&fields.make)
      .bind(&fields.model)
      .bind(fields.year)
      .bind(fields.capacity)
      .bind(fields.status.as_str())
      .bind(&fields.department_uuid)
      .bind(&fields.vendor_uuid)
      .bind(&fields.driver_uuid)
      .try_map(|row: PgRow| Vehicle::try_from(row))
      .fetch_one(&mut *tx)
      .await?;
    for transition in &assignments {
      transition_in(&mut tx, transition).await?;
    }
    tx.commit().await?;
    Ok(vehicle)
  }

  async fn update(
    &self,
    uuid: &str,
    update_vehicle: UpdateVehicle,
    assignments: Vec<AssignmentTransition>,
  ) -> Result<Option<Vehicle>, RepositoryError> {
    let mut tx = self.pool.begin().await?;
    let query = format!(
      r#"
      UPDATE vehicles
      SET plate_number = $2, make = $3, model = $4, year = $5, capacity = $6,
          status = $7, department_uuid = $8, vendor_uuid = $9, driver_uuid = $10,
          updated_at = now()
      WHERE uuid = $1
      RETURNING {COLUMNS}
    "#
    );
    let vehicle = sqlx::query(&query)
      .bind(uuid)
      .bind(&update_vehicle.plate_number)
      .bind(&update_vehicle.make)
      .bind(&update_vehicle.model)
      .bind(update_vehicle.year)
      .bind(update_vehicle.capacity)
      .bind(update_vehicle.status.as_str())
      .bind(&update_vehicle.department_uuid)
      .bind(&update_vehicle.vendor_uuid)
      .bind(&update_vehicle.driver_uuid)
      .try_map(|row: PgRow| Vehicle::try_from(row))
      .fetch_optional(&mut *tx)
      .await?;
    // Dropping the transaction rolls it back.
    let Some(vehicle) = vehicle else {
      return Ok(None);
    };
    for transition in &assignments {
      transition_in(&mut tx, transition).await?;
    }
    tx.commit().await?;
    Ok(Some(vehicle))
  }

  async fn delete(
    &self,
    uuid: &str,
    assignments: Vec<AssignmentTransition>,
  ) -> Result<bool, RepositoryError> {
    let mut tx = self.pool.begin().await?;
    let deleted = sqlx::query("DELETE FROM vehicles WHERE uuid = $1")
      .bind(uuid)
      .execute(&mut *tx)
      .await
      .map_err(|error| RepositoryError::from(error).on_delete())?
      .rows_affected()
      > 0;
    if !deleted {
      return Ok(false);
    }
    for transition in &assignments {
      transition_in(&mut tx, transition).await?;
    }
    tx.commit().await?;
    Ok(true)
  }
}

impl TryFrom<PgRow> for Vehicle {
  type Error = sqlx::Error;

  fn try_from(row: PgRow) -> Result<Self, Self::Error> {
    let status: String = row.try_get("status")?;
    Ok(Self {
      uuid: row.try_get("uuid")?,
      created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
      updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
      plate_number: row.try_get("plate_number")?,
      make: row.try_get("make")?,
      model: row.try_get("model")?,
      year: row.try_get("year")?,
      capacity: row.try_get("capacity")?,
      status: status
        .parse()
        .map_err(|error: String| sqlx::Error::Decode(error.into()))?,
      department_uuid: row.try_get("department_uuid")?,
      vendor_uuid: row.try_get("vendor_uuid")?,
      driver_uuid: row.try_get("driver_uuid")?,
    })
  }
}

#[cfg(test)]
pub mod tests {
  use std::sync::RwLock;

  use chrono::Utc;

  use super::{
    AssignmentTransition, CreateVehicle, RepositoryError, UpdateVehicle,
    VehicleFilter, VehicleRepository,
  };
  use crate::assignments::repository::assignment_repository::tests::InMemoryAssignmentHistoryRepository;
  use crate::shared::dto::pagination_dto::Pagination;
  use crate::vehicles::model::Vehicle;

  pub struct InMemoryVehicleRepository {
    pub vehicles: RwLock<Vec<Vehicle>>,
    history: InMemoryAssignmentHistoryRepository,
  }

  impl InMemoryVehicleRepository {
    pub fn new() -> Self {
      Self::with(Vec::new())
    }

    pub fn with(vehicles: Vec<Vehicle>) -> Self {
      Self {
        vehicles: RwLock::new(vehicles),
        history: InMemoryAssignmentHistoryRepository::new(),
      }
    }

    /// Records assignment transitions into `history`.
    pub fn tracking(self, history: InMemoryAssignmentHistoryRepository) -> Self {
      Self { history, ..self }
    }

    fn check_unique(
      vehicles: &[Vehicle],
      fields: &UpdateVehicle,
      except_uuid: Option<&str>,
    ) -> Result<(), RepositoryError> {
      for vehicle in vehicles
        .iter()
        .filter(|v| Some(v.uuid.as_str()) != except_uuid)
      {
        if vehicle.plate_number == fields.plate_number {
          return Err(RepositoryError::Conflict(
            "vehicles_plate_number_key".into(),
          ));
        }
        if fields.driver_uuid.is_some()
          && vehicle.driver_uuid == fields.driver_uuid
        {
          return Err(RepositoryError::Conflict(
            "vehicles_driver_uuid_key".into(),
          ));
        }
      }
      Ok(())
    }

    fn apply(vehicle: &mut Vehicle, fields: UpdateVehicle) {
      vehicle.plate_number = fields.plate_number;
      vehicle.make = fields.make;
      vehicle.model = fields.model;
      vehicle.year = fields.year;
      vehicle.capacity = fields.capacity;
      vehicle.status = fields.status;
      vehicle.department_uuid = fields.department_uuid;
      vehicle.vendor_uuid = fields.vendor_uuid;
      vehicle.driver_uuid = fields.driver_uuid;
      vehicle.updated_at = Utc::now();
    }
  }

  impl VehicleRepository for InMemoryVehicleRepository {
    async fn find_all(
      &self,
      filter: &VehicleFilter,
      pagination: Pagination,
    ) -> Result<Vec<Vehicle>, RepositoryError> {
      let vehicles = self.vehicles.read().unwrap(); // Acquire read lock
      let mut matching: Vec<Vehicle> =
        vehicles.iter().filter(|v| filter.matches(v)).cloned().collect();
      matching.sort_by(|a, b| a.plate_number.cmp(&b.plate_number));
      Ok(pagination.slice(&matching))
    }

    async fn find_one(
      &self,
      uuid: &str,
    ) -> Result<Option<Vehicle>, RepositoryError> {
      let vehicles = self.vehicles.read().unwrap(); // Acquire read lock
      Ok(vehicles.iter().find(|v| v.uuid == uuid).cloned())
    }

    async fn find_by_driver(
      &self,
      driver_uuid: &str,
    ) -> Result<Option<Vehicle>, RepositoryError> {
      let vehicles = self.vehicles.read().unwrap();
      Ok(
        vehicles
          .iter()
          .find(|v| v.driver_uuid.as_deref() == Some(driver_uuid))
          .cloned(),
      )
    }

    async fn create(
      &self,
      create_vehicle: CreateVehicle,
      assignments: Vec<AssignmentTransition>,
    ) -> Result<Vehicle, RepositoryError> {
      let mut vehicles = self.vehicles.write().unwrap(); // Acquire write lock
      Self::check_unique(&vehicles, &create_vehicle.fields, None)?;
      self.history.apply(&assignments)?;
      let now = Utc::now();
      let mut vehicle = Vehicle {
        uuid: create_vehicle.uuid,
        created_at: now,
        updated_at: now,
        plate_number: String::new(),
        make: String::new(),
        model: String::new(),
        year: 0,
        capacity: 0,
        status: create_vehicle.fields.status,
        department_uuid: None,
        vendor_uuid: None,
        driver_uuid: None,
      };
      Self::apply(&mut vehicle, create_vehicle.fields);
      vehicles.push(vehicle.clone());
      Ok(vehicle)
    }

    async fn update(
      &self,
      uuid: &str,
      update_vehicle: UpdateVehicle,
      assignments: Vec<AssignmentTransition>,
    ) -> Result<Option<Vehicle>, RepositoryError> {
      let mut vehicles = self.vehicles.write().unwrap(); // Acquire write lock
      Self::check_unique(&vehicles, &update_vehicle, Some(uuid))?;
      let Some(vehicle) = vehicles.iter_mut().find(|v| v.uuid == uuid) else {
        return Ok(None);
      };
      self.history.apply(&assignments)?;
      Self::apply(vehicle, update_vehicle);
      Ok(Some(vehicle.clone()))
    }

    async fn delete(
      &self,
      uuid: &str,
      assignments: Vec<AssignmentTransition>,
    ) -> Result<bool, RepositoryError> {
      let mut vehicles = self.vehicles.write().unwrap();
      if !vehicles.iter().any(|v| v.uuid == uuid) {
        return Ok(false);
      }
      self.history.apply(&assignments)?;
      vehicles.retain(|v| v.uuid != uuid);
      Ok(true)
    }
  }
}
