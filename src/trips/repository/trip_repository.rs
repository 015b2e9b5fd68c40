use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, QueryBuilder, Row};

use crate::assignments::repository::assignment_repository::{
  transition_in, AssignmentTransition,
};
use crate::shared::database::Database;
use crate::shared::dto::pagination_dto::Pagination;
use crate::shared::repository::RepositoryError;
use crate::trips::model::{Trip, TripStatus};

pub trait TripRepository {
  async fn find_all(
    &self,
    filter: &TripFilter,
    pagination: Pagination,
  ) -> Result<Vec<Trip>, RepositoryError>;
  async fn count(&self, filter: &TripFilter) -> Result<i64, RepositoryError>;
  async fn find_one(&self, uuid: &str) -> Result<Option<Trip>, RepositoryError>;
  /// Writes go through together with `assignments`, or not at all.
  async fn create(
    &self,
    create_trip: CreateTrip,
    assignments: Vec<AssignmentTransition>,
  ) -> Result<Trip, RepositoryError>;
  async fn update(
    &self,
    uuid: &str,
    update_trip: UpdateTrip,
    assignments: Vec<AssignmentTransition>,
  ) -> Result<Option<Trip>, RepositoryError>;
  async fn delete(
    &self,
    uuid: &str,
    assignments: Vec<AssignmentTransition>,
  ) -> Result<bool, RepositoryError>;
}

/// Empty `statuses` matches every status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripFilter {
  pub statuses: Vec<TripStatus>,
  pub vehicle_uuid: Option<String>,
  pub requester_uuid: Option<String>,
  pub route_uuid: Option<String>,
}

impl TripFilter {
  pub fn active_for_vehicle(vehicle_uuid: &str) -> Self {
    Self {
      statuses: TripStatus::ACTIVE.to_vec(),
      vehicle_uuid: Some(vehicle_uuid.to_string()),
      ..Self::default()
    }
  }

  pub fn for_route(route_uuid: &str) -> Self {
    Self {
      route_uuid: Some(route_uuid.to_string()),
      ..Self::default()
    }
  }

  pub fn matches(&self, trip: &Trip) -> bool {
    (self.statuses.is_empty() || self.statuses.contains(&trip.status))
      && (self.vehicle_uuid.is_none() || self.vehicle_uuid == trip.vehicle_uuid)
      && self
        .requester_uuid
        .as_ref()
        .map_or(true, |uuid| *uuid == trip.requester_uuid)
      && self
        .route_uuid
        .as_ref()
        .map_or(true, |uuid| *uuid == trip.route_uuid)
  }

  fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>) {
    if !self.statuses.is_empty() {
      let statuses: Vec<String> =
        self.statuses.iter().map(|s| s.as_str().to_string()).collect();
      builder.push(" AND status = ANY(").push_bind(statuses).push(")");
    }
    let columns = [
      ("vehicle_uuid", &self.vehicle_uuid),
      ("requester_uuid", &self.requester_uuid),
      ("route_uuid", &self.route_uuid),
    ];
    for (column, value) in columns {
      if let Some(value) = value {
        builder
          .push(format!(" AND {column} = "))
          .push_bind(value.clone());
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTrip {
  pub uuid: String,
  pub requester_uuid: String,
  pub fields: UpdateTrip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTrip {
  pub route_uuid: String,
  pub vehicle_uuid: Option<String>,
  pub purpose: String,
  pub passengers: i32,
  pub departure_at: DateTime<Utc>,
  pub return_at: Option<DateTime<Utc>>,
  pub status: TripStatus,
}

pub struct TripRepositoryImpl {
  pool: Arc<Pool<Postgres>>,
}

impl TripRepositoryImpl {
  pub fn new(database: Arc<Database>) -> Self {
    Self {
      pool: database.pool.clone(),
    }
  }
}

const COLUMNS: &str = "uuid, created_at, updated_at, route_uuid, vehicle_uuid, requester_uuid, purpose, passengers, departure_at, return_at, status";

impl TripRepository for TripRepositoryImpl {
  async fn find_all(
    &self,
    filter: &TripFilter,
    pagination: Pagination,
  ) -> Result<Vec<Trip>, RepositoryError> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
      "SELECT {COLUMNS} FROM trips WHERE TRUE"
    ));
    filter.push_conditions(&mut builder);
    builder
      .push(" ORDER BY departure_at DESC LIMIT ")
      .push_bind(pagination.limit())
      .push(" OFFSET ")
      .push_bind(pagination.offset());

    builder
      .build()
      .try_map(|row: PgRow| Trip::try_from(row))
      .fetch_all(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn count(&self, filter: &TripFilter) -> Result<i64, RepositoryError> {
    let mut builder =
      QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM trips WHERE TRUE");
    filter.push_conditions(&mut builder);
    builder
      .build_query_scalar::<i64>()
      .fetch_one(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn find_one(&self, uuid: &str) -> Result<Option<Trip>, RepositoryError> {
    let query = format!("SELECT {COLUMNS} FROM trips WHERE uuid = $1");
    sqlx::query(&query)
      .bind(uuid)
      .try_map(|row: PgRow| Trip::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn create(
    &self,
    create_trip: CreateTrip,
    assignments: Vec<AssignmentTransition>,
  ) -> Result<Trip, RepositoryError> {
    let mut tx = self.pool.begin().await?;
    let query = format!(
      r#"
      INSERT INTO trips (uuid, route_uuid, vehicle_uuid, requester_uuid, purpose, passengers, departure_at, return_at, status)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
      RETURNING {COLUMNS}
    "#
    );
    let fields = &create_trip.fields;
    let trip = sqlx::query(&query)
      .bind(&create_trip.uuid)
      .bind(&fields.route_uuid)
      .bind(&fields.vehicle_uuid)
      .bind(&create_trip.requester_uuid)
      .bind(&fields.purpose)
      .bind(fields.passengers)
      .bind(fields.departure_at)
      .bind(fields.return_at)
      .bind(fields.status.as_str())
      .try_map(|row: PgRow| Trip::try_from(row))
      .fetch_one(&mut *tx)
      .await?;
    for transition in &assignments {
      transition_in(&mut tx, transition).await?;
    }
    tx.commit().await?;
    Ok(trip)
  }

  async fn update(
    &self,
    uuid: &str,
    update_trip: UpdateTrip,
    assignments: Vec<AssignmentTransition>,
  ) -> Result<Option<Trip>, RepositoryError> {
    let mut tx = self.pool.begin().await?;
    let query = format!(
      r#"
      UPDATE trips
      SET route_uuid = $2, vehicle_uuid = $3, purpose = $4, passengers = $5,
          departure_at = $6, return_at = $7, status = $8, updated_at = now()
      WHERE uuid = $1
      RETURNING {COLUMNS}
    "#
    );
    let trip = sqlx::query(&query)
      .bind(uuid)
      .bind(&update_trip.route_uuid)
      .bind(&update_trip.vehicle_uuid)
      .bind(&update_trip.purpose)
      .bind(update_trip.passengers)
      .bind(update_trip.departure_at)
      .bind(update_trip.return_at)
      .bind(update_trip.status.as_str())
      .try_map(|row: PgRow| Trip::try_from(row))
      .fetch_optional(&mut *tx)
      .await?;
    let Some(trip) = trip else {
      return Ok(None);
    };
    for transition in &assignments {
      transition_in(&mut tx, transition).await?;
    }
    tx.commit().await?;
    Ok(Some(trip))
  }

  async fn delete(
    &self,
    uuid: &str,
    assignments: Vec<AssignmentTransition>,
  ) -> Result<bool, RepositoryError> {
    let mut tx = self.pool.begin().await?;
    let result = sqlx::query("DELETE FROM trips WHERE uuid = $1")
      .bind(uuid)
      .execute(&mut *tx)
      .await
      .map_err(|error| RepositoryError::from(error).on_delete())?;
    if result.rows_affected() == 0 {
      return Ok(false);
    }
    for transition in &assignments {
      transition_in(&mut tx, transition).await?;
    }
    tx.commit().await?;
    Ok(true)
  }
}

impl TryFrom<PgRow> for Trip {
  type Error = sqlx::Error;

  fn try_from(row: PgRow) -> Result<Self, Self::Error> {
    let status: String = row.try_get("status")?;
    Ok(Self {
      uuid: row.try_get("uuid")?,
      created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
      updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
      route_uuid: row.try_get("route_uuid")?,
      vehicle_uuid: row.try_get("vehicle_uuid")?,
      requester_uuid: row.try_get("requester_uuid")?,
      purpose: row.try_get("purpose")?,
      passengers: row.try_get("passengers")?,
      departure_at: row.try_get::<DateTime<Utc>, _>("departure_at")?,
      return_at: row.try_get::<Option<DateTime<Utc>>, _>("return_at")?,
      status: status
        .parse()
        .map_err(|error: String| sqlx::Error::Decode(error.into()))?,
    })
  }
}

#[cfg(test)]
pub mod tests {
  use std::sync::RwLock;

  use chrono::Utc;

  use super::{
    AssignmentTransition, CreateTrip, RepositoryError, TripFilter,
    TripRepository, UpdateTrip,
  };
  use crate::assignments::repository::assignment_repository::tests::InMemoryAssignmentHistoryRepository;
  use crate::shared::dto::pagination_dto::Pagination;
  use crate::trips::model::Trip;

  pub struct InMemoryTripRepository {
    pub trips: RwLock<Vec<Trip>>,
    history: InMemoryAssignmentHistoryRepository,
  }

  impl InMemoryTripRepository {
    pub fn new() -> Self {
      Self::with(Vec::new())
    }

    pub fn with(trips: Vec<Trip>) -> Self {
      Self {
        trips: RwLock::new(trips),
        history: InMemoryAssignmentHistoryRepository::new(),
      }
    }

    pub fn tracking(self, history: InMemoryAssignmentHistoryRepository) -> Self {
      Self { history, ..self }
    }

    fn apply(trip: &mut Trip, fields: UpdateTrip) {
      trip.route_uuid = fields.route_uuid;
      trip.vehicle_uuid = fields.vehicle_uuid;
      trip.purpose = fields.purpose;
      trip.passengers = fields.passengers;
      trip.departure_at = fields.departure_at;
      trip.return_at = fields.return_at;
      trip.status = fields.status;
      trip.updated_at = Utc::now();
    }
  }

  impl TripRepository for InMemoryTripRepository {
    async fn find_all(
      &self,
      filter: &TripFilter,
      pagination: Pagination,
    ) -> Result<Vec<Trip>, RepositoryError> {
      let trips = self.trips.read().unwrap(); // Acquire read lock
      let mut matching: Vec<Trip> =
        trips.iter().filter(|t| filter.matches(t)).cloned().collect();
      matching.sort_by(|a, b| b.departure_at.cmp(&a.departure_at));
      Ok(pagination.slice(&matching))
    }

    async fn count(&self, filter: &TripFilter) -> Result<i64, RepositoryError> {
      let trips = self.trips.read().unwrap();
      Ok(trips.iter().filter(|t| filter.matches(t)).count() as i64)
    }

    async fn find_one(
      &self,
      uuid: &str,
    ) -> Result<Option<Trip>, RepositoryError> {
      let trips = self.trips.read().unwrap(); // Acquire read lock
      Ok(trips.iter().find(|trip| trip.uuid == uuid).cloned())
    }

    async fn create(
      &self,
      create_trip: CreateTrip,
      assignments: Vec<AssignmentTransition>,
    ) -> Result<Trip, RepositoryError> {
      let mut trips = self.trips.write().unwrap(); // Acquire write lock
      self.history.apply(&assignments)?;
      let now = Utc::now();
      let mut trip = Trip {
        uuid: create_trip.uuid,
        created_at: now,
        updated_at: now,
        route_uuid: String::new(),
        vehicle_uuid: None,
        requester_uuid: create_trip.requester_uuid,
        purpose: String::new(),
        passengers: 0,
        departure_at: create_trip.fields.departure_at,
        return_at: None,
        status: create_trip.fields.status,
      };
      Self::apply(&mut trip, create_trip.fields);
      trips.push(trip.clone());
      Ok(trip)
    }

    async fn update(
      &self,
      uuid: &str,
      update_trip: UpdateTrip,
      assignments: Vec<AssignmentTransition>,
    ) -> Result<Option<Trip>, RepositoryError> {
      let mut trips = self.trips.write().unwrap();
      let Some(trip) = trips.iter_mut().find(|trip| trip.uuid == uuid) else {
        return Ok(None);
      };
      self.history.apply(&assignments)?;
      Self::apply(trip, update_trip);
      Ok(Some(trip.clone()))
    }

    async fn delete(
      &self,
      uuid: &str,
      assignments: Vec<AssignmentTransition>,
    ) -> Result<bool, RepositoryError> {
      let mut trips = self.trips.write().unwrap();
      if !trips.iter().any(|trip| trip.uuid == uuid) {
        return Ok(false);
      }
      self.history.apply(&assignments)?;
      trips.retain(|trip| trip.uuid != uuid);
      Ok(true)
    }
  }
}
