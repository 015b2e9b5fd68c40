use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::{postgres::PgRow, Pool, Postgres};

use crate::permissions::model::Permission;
use crate::shared::database::Database;
use crate::shared::dto::pagination_dto::Pagination;
use crate::shared::repository::RepositoryError;
use crate::shared::role::Role;

pub trait PermissionRepository {
  async fn find_all(
    &self,
    pagination: Pagination,
  ) -> Result<Vec<Permission>, RepositoryError>;
  async fn find_one(
    &self,
    uuid: &str,
  ) -> Result<Option<Permission>, RepositoryError>;
  async fn create(
    &self,
    create_permission: CreatePermission,
  ) -> Result<Permission, RepositoryError>;
  async fn update(
    &self,
    uuid: &str,
    update_permission: UpdatePermission,
  ) -> Result<Option<Permission>, RepositoryError>;
  async fn delete(&self, uuid: &str) -> Result<bool, RepositoryError>;
  async fn find_for_role(
    &self,
    role: Role,
  ) -> Result<Vec<String>, RepositoryError>;
  async fn role_has(
    &self,
    role: Role,
    permission_name: &str,
  ) -> Result<bool, RepositoryError>;
  /// Idempotent. Fails with `InvalidReference` for unknown permissions.
  async fn grant(
    &self,
    role: Role,
    permission_name: &str,
  ) -> Result<(), RepositoryError>;
  async fn revoke(
    &self,
    role: Role,
    permission_name: &str,
  ) -> Result<bool, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermission {
  pub uuid: String,
  pub name: String,
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePermission {
  pub name: String,
  pub description: Option<String>,
}

pub struct PermissionRepositoryImpl {
  pool: Arc<Pool<Postgres>>,
}

impl PermissionRepositoryImpl {
  pub fn new(database: Arc<Database>) -> Self {
    Self {
      pool: database.pool.clone(),
    }
  }
}

const COLUMNS: &str = "uuid, created_at, updated_at, name, description";

impl PermissionRepository for PermissionRepositoryImpl {
  async fn find_all(
    &self,
    pagination: Pagination,
  ) -> Result<Vec<Permission>, RepositoryError> {
    sqlx::query(&format!(
      "SELECT {COLUMNS} FROM permissions ORDER BY name LIMIT $1 OFFSET $2"
    ))
    .bind(pagination.limit())
    .bind(pagination.offset())
    .try_map(|row: PgRow| Permission::try_from(row))
    .fetch_all(&*self.pool)
    .await
    .map_err(RepositoryError::from)
  }

  async fn find_one(
    &self,
    uuid: &str,
  ) -> Result<Option<Permission>, RepositoryError> {
    sqlx::query(&format!("SELECT {COLUMNS} FROM permissions WHERE uuid = $1"))
      .bind(uuid)
      .try_map(|row: PgRow| Permission::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn create(
    &self,
    create_permission: CreatePermission,
  ) -> Result<Permission, RepositoryError> {
    let query = format!(
      r#"
      INSERT INTO permissions (uuid, name, description)
      VALUES ($1, $2, $3)
      RETURNING {COLUMNS}
    "#
    );
    sqlx::query(&query)
      .bind(&create_permission.uuid)
      .bind(&create_permission.name)
      .bind(&create_permission.description)
      .try_map(|row: PgRow| Permission::try_from(row))
      .fetch_one(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn update(
    &self,
    uuid: &str,
    update_permission: UpdatePermission,
  ) -> Result<Option<Permission>, RepositoryError> {
    let query = format!(
      r#"
      UPDATE permissions
      SET name = $2, description = $3, updated_at = now()
      WHERE uuid = $1
      RETURNING {COLUMNS}
    "#
    );
    sqlx::query(&query)
      .bind(uuid)
      .bind(&update_permission.name)
      .bind(&update_permission.description)
      .try_map(|row: PgRow| Permission::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn delete(&self, uuid: &str) -> Result<bool, RepositoryError> {
    sqlx::query("DELETE FROM permissions WHERE uuid = $1")
      .bind(uuid)
      .execute(&*self.pool)
      .await
      .map(|result| result.rows_affected() > 0)
      .map_err(|error| RepositoryError::from(error).on_delete())
  }

  async fn find_for_role(
    &self,
    role: Role,
  ) -> Result<Vec<String>, RepositoryError> {
    sqlx::query_scalar(
      "SELECT permission_name FROM role_permissions WHERE role = $1 ORDER BY permission_name",
    )
    .bind(role.as_str())
    .fetch_all(&*self.pool)
    .await
    .map_err(RepositoryError::from)
  }

  async fn role_has(
    &self,
    role: Role,
    permission_name: &str,
  ) -> Result<bool, RepositoryError> {
    sqlx::query_scalar(
      "SELECT EXISTS (SELECT 1 FROM role_permissions WHERE role = $1 AND permission_name = $2)",
    )
    .bind(role.as_str())
    .bind(permission_name)
    .fetch_one(&*self.pool)
    .await
    .map_err(RepositoryError::from)
  }

  async fn grant(
    &self,
    role: Role,
    permission_name: &str,
  ) -> Result<(), RepositoryError> {
    sqlx::query(
      r#"
      INSERT INTO role_permissions (role, permission_name)
      VALUES ($1, $2)
      ON CONFLICT DO NOTHING
    "#,
    )
    .bind(role.as_str())
    .bind(permission_name)
    .execute(&*self.pool)
    .await
    .map(|_| ())
    .map_err(RepositoryError::from)
  }

  async fn revoke(
    &self,
    role: Role,
    permission_name: &str,
  ) -> Result<bool, RepositoryError> {
    sqlx::query(
      "DELETE FROM role_permissions WHERE role = $1 AND permission_name = $2",
    )
    .bind(role.as_str())
    .bind(permission_name)
    .execute(&*self.pool)
    .await
    .map(|result| result.rows_affected() > 0)
    .map_err(RepositoryError::from)
  }
}

impl TryFrom<PgRow> for Permission {
  type Error = sqlx::Error;

  fn try_from(row: PgRow) -> Result<Self, Self::Error> {
    Ok(Self {
      uuid: row.try_get("uuid")?,
      created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
      updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
      name: row.try_get("name")?,
      description: row.try_get("description")?,
    })
  }
}
