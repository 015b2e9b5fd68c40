use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::{postgres::PgRow, Pool, Postgres};

use crate::routes::model::Route;
use crate::shared::database::Database;
use crate::shared::dto::pagination_dto::Pagination;
use crate::shared::repository::RepositoryError;

pub trait RouteRepository {
  async fn find_all(
    &self,
    pagination: Pagination,
  ) -> Result<Vec<Route>, RepositoryError>;
  async fn find_one(&self, uuid: &str) -> Result<Option<Route>, RepositoryError>;
  async fn create(
    &self,
    create_route: CreateRoute,
  ) -> Result<Route, RepositoryError>;
  async fn update(
    &self,
    uuid: &str,
    update_route: UpdateRoute,
  ) -> Result<Option<Route>, RepositoryError>;
  async fn delete(&self, uuid: &str) -> Result<bool, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateRoute {
  pub uuid: String,
  pub fields: UpdateRoute,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRoute {
  pub name: String,
  pub origin: String,
  pub destination: String,
  pub distance_km: f64,
  pub estimated_minutes: i32,
}

pub struct RouteRepositoryImpl {
  pool: Arc<Pool<Postgres>>,
}

impl RouteRepositoryImpl {
  pub fn new(database: Arc<Database>) -> Self {
    Self {
      pool: database.pool.clone(),
    }
  }
}

const COLUMNS: &str = "uuid, created_at, updated_at, name, origin, destination, distance_km, estimated_minutes";

impl RouteRepository for RouteRepositoryImpl {
  async fn find_all(
    &self,
    pagination: Pagination,
  ) -> Result<Vec<Route>, RepositoryError> {
    let query =
      format!("SELECT {COLUMNS} FROM routes ORDER BY name LIMIT $1 OFFSET $2");
    sqlx::query(&query)
      .bind(pagination.limit())
      .bind(pagination.offset())
      .try_map(|row: PgRow| Route::try_from(row))
      .fetch_all(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn find_one(&self, uuid: &str) -> Result<Option<Route>, RepositoryError> {
    let query = format!("SELECT {COLUMNS} FROM routes WHERE uuid = $1");
    sqlx::query(&query)
      .bind(uuid)
      .try_map(|row: PgRow| Route::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn create(
    &self,
    create_route: CreateRoute,
  ) -> Result<Route, RepositoryError> {
    let query = format!(
      r#"
      INSERT INTO routes (uuid, name, origin, destination, distance_km, estimated_minutes)
      VALUES ($1, $2, $3, $4, $5, $6)
      RETURNING {COLUMNS}
    "#
    );
    let fields = &create_route.fields;
    sqlx::query(&query)
      .bind(&create_route.uuid)
      .bind(&fields.name)
      .bind(&fields.origin)
      .bind(&fields.destination)
      .bind(fields.distance_km)
      .bind(fields.estimated_minutes)
      .try_map(|row: PgRow| Route::try_from(row))
      .fetch_one(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn update(
    &self,
    uuid: &str,
    update_route: UpdateRoute,
  ) -> Result<Option<Route>, RepositoryError> {
    let query = format!(
      r#"
      UPDATE routes
      SET name = $2, origin = $3, destination = $4, distance_km = $5,
          estimated_minutes = $6, updated_at = now()
      WHERE uuid = $1
      RETURNING {COLUMNS}
    "#
    );
    sqlx::query(&query)
      .bind(uuid)
      .bind(&update_route.name)
      .bind(&update_route.origin)
      .bind(&update_route.destination)
      .bind(update_route.distance_km)
      .bind(update_route.estimated_minutes)
      .try_map(|row: PgRow| Route::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn delete(&self, uuid: &str) -> Result<bool, RepositoryError> {
    sqlx::query("DELETE FROM routes WHERE uuid = $1")
      .bind(uuid)
      .execute(&*self.pool)
      .await
      .map(|result| result.rows_affected() > 0)
      .map_err(|error| RepositoryError::from(error).on_delete())
  }
}

impl TryFrom<PgRow> for Route {
  type Error = sqlx::Error;

  fn try_from(row: PgRow) -> Result<Self, Self::Error> {
    Ok(Self {
      uuid: row.try_get("uuid")?,
      created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
      updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
      name: row.try_get("name")?,
      origin: row.try_get("origin")?,
      destination: row.try_get("destination")?,
      distance_km: row.try_get("distance_km")?,
      estimated_minutes: row.try_get("estimated_minutes")?,
    })
  }
}
