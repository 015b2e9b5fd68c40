use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::{postgres::PgRow, Pool, Postgres};

use crate::shared::database::Database;
use crate::shared::dto::pagination_dto::Pagination;
use crate::shared::repository::RepositoryError;
use crate::vendors::model::Vendor;

pub trait VendorRepository {
  async fn find_all(
    &self,
    pagination: Pagination,
  ) -> Result<Vec<Vendor>, RepositoryError>;
  async fn find_one(&self, uuid: &str)
    -> Result<Option<Vendor>, RepositoryError>;
  async fn create(
    &self,
    create_vendor: CreateVendor,
  ) -> Result<Vendor, RepositoryError>;
  async fn update(
    &self,
    uuid: &str,
    update_vendor: UpdateVendor,
  ) -> Result<Option<Vendor>, RepositoryError>;
  async fn delete(&self, uuid: &str) -> Result<bool, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVendor {
  pub uuid: String,
  pub fields: UpdateVendor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateVendor {
  pub name: String,
  pub contact_name: Option<String>,
  pub phone: Option<String>,
  pub email: Option<String>,
  pub address: Option<String>,
}

pub struct VendorRepositoryImpl {
  pool: Arc<Pool<Postgres>>,
}

impl VendorRepositoryImpl {
  pub fn new(database: Arc<Database>) -> Self {
    Self {
      pool: database.pool.clone(),
    }
  }
}

const COLUMNS: &str =
  "uuid, created_at, updated_at, name, contact_name, phone, email, address";

impl VendorRepository for VendorRepositoryImpl {
  async fn find_all(
    &self,
    pagination: Pagination,
  ) -> Result<Vec<Vendor>, RepositoryError> {
    let query =
      format!("SELECT {COLUMNS} FROM vendors ORDER BY name LIMIT $1 OFFSET $2");
    sqlx::query(&query)
      .bind(pagination.limit())
      .bind(pagination.offset())
      .try_map(|row: PgRow| Vendor::try_from(row))
      .fetch_all(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn find_one(
    &self,
    uuid: &str,
  ) -> Result<Option<Vendor>, RepositoryError> {
    let query = format!("SELECT {COLUMNS} FROM vendors WHERE uuid = $1");
    sqlx::query(&query)
      .bind(uuid)
      .try_map(|row: PgRow| Vendor::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn create(
    &self,
    create_vendor: CreateVendor,
  ) -> Result<Vendor, RepositoryError> {
    let query = format!(
      r#"
      INSERT INTO vendors (uuid, name, contact_name, phone, email, address)
      VALUES ($1, $2, $3, $4, $5, $6)
      RETURNING {COLUMNS}
    "#
    );
    let fields = &create_vendor.fields;
    sqlx::query(&query)
      .bind(&create_vendor.uuid)
      .bind(&fields.name)
      .bind(&fields.contact_name)
      .bind(&fields.phone)
      .bind(&fields.email)
      .bind(&fields.address)
      .try_map(|row: PgRow| Vendor::try_from(row))
      .fetch_one(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn update(
    &self,
    uuid: &str,
    update_vendor: UpdateVendor,
  ) -> Result<Option<Vendor>, RepositoryError> {
    let query = format!(
      r#"
      UPDATE vendors
      SET name = $2, contact_name = $3, phone = $4, email = $5, address = $6,
          updated_at = now()
      WHERE uuid = $1
      RETURNING {COLUMNS}
    "#
    );
    sqlx::query(&query)
      .bind(uuid)
      .bind(&update_vendor.name)
      .bind(&update_vendor.contact_name)
      .bind(&update_vendor.phone)
      .bind(&update_vendor.email)
      .bind(&update_vendor.address)
      .try_map(|row: PgRow| Vendor::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn delete(&self, uuid: &str) -> Result<bool, RepositoryError> {
    sqlx::query("DELETE FROM vendors WHERE uuid = $1")
      .bind(uuid)
      .execute(&*self.pool)
      .await
      .map(|result| result.rows_affected() > 0)
      .map_err(|error| RepositoryError::from(error).on_delete())
  }
}

impl TryFrom<PgRow> for Vendor {
  type Error = sqlx::Error;

  fn try_from(row: PgRow) -> Result<Self, Self::Error> {
    Ok(Self {
      uuid: row.try_get("uuid")?,
      created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
      updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
      name: row.try_get("name")?,
      contact_name: row.try_get("contact_name")?,
      phone: row.try_get("phone")?,
      email: row.try_get("email")?,
      address: row.try_get("address")?,
    })
  }
}
