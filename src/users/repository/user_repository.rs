use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, QueryBuilder, Row};

use crate::shared::database::Database;
use crate::shared::dto::pagination_dto::Pagination;
use crate::shared::repository::RepositoryError;
use crate::shared::role::Role;
use crate::users::model::User;

pub trait UserRepository {
  async fn find_all(
    &self,
    filter: &UserFilter,
    pagination: Pagination,
  ) -> Result<Vec<User>, RepositoryError>;
  async fn find_one(&self, uuid: &str) -> Result<Option<User>, RepositoryError>;
  async fn find_by_user_name(
    &self,
    user_name: &str,
  ) -> Result<Option<User>, RepositoryError>;
  async fn create(&self, create_user: CreateUser)
    -> Result<User, RepositoryError>;
  async fn update(
    &self,
    uuid: &str,
    update_user: UpdateUser,
  ) -> Result<Option<User>, RepositoryError>;
  async fn delete(&self, uuid: &str) -> Result<bool, RepositoryError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
  pub role: Option<Role>,
  pub department_uuid: Option<String>,
}

impl UserFilter {
  pub fn matches(&self, user: &User) -> bool {
    self.role.map_or(true, |role| user.role == role)
      && self
        .department_uuid
        .as_ref()
        .map_or(true, |uuid| user.department_uuid.as_ref() == Some(uuid))
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
  pub uuid: String,
  pub user_name: String,
  pub email: String,
  pub full_name: String,
  pub role: Role,
  pub department_uuid: Option<String>,
  pub password_hash: String,
  pub is_active: bool,
}

/// `password_hash: None` keeps the stored hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUser {
  pub email: String,
  pub full_name: String,
  pub role: Role,
  pub department_uuid: Option<String>,
  pub password_hash: Option<String>,
  pub is_active: bool,
}

pub struct UserRepositoryImpl {
  pool: Arc<Pool<Postgres>>,
}

impl UserRepositoryImpl {
  pub fn new(database: Arc<Database>) -> Self {
    Self {
      pool: database.pool.clone(),
    }
  }
}

const COLUMNS: &str = "uuid, created_at, updated_at, user_name, email, full_name, role, department_uuid, password_hash, is_active";

impl UserRepository for UserRepositoryImpl {
  async fn find_all(
    &self,
    filter: &UserFilter,
    pagination: Pagination,
  ) -> Result<Vec<User>, RepositoryError> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
      "SELECT {COLUMNS} FROM users WHERE TRUE"
    ));
    if let Some(role) = filter.role {
      builder.push(" AND role = ").push_bind(role.as_str());
    }
    if let Some(department_uuid) = &filter.department_uuid {
      builder
        .push(" AND department_uuid = ")
        .push_bind(department_uuid.clone());
    }
    builder
      .push(" ORDER BY user_name LIMIT ")
      .push_bind(pagination.limit())
      .push(" OFFSET ")
      .push_bind(pagination.offset());

    builder
      .build()
      .try_map(|row: PgRow| User::try_from(row))
      .fetch_all(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn find_one(&self, uuid: &str) -> Result<Option<User>, RepositoryError> {
    let query = format!("SELECT {COLUMNS} FROM users WHERE uuid = $1");
    sqlx::query(&query)
      .bind(uuid)
      .try_map(|row: PgRow| User::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn find_by_user_name(
    &self,
    user_name: &str,
  ) -> Result<Option<User>, RepositoryError> {
    let query = format!("SELECT {COLUMNS} FROM users WHERE user_name = $1");
    sqlx::query(&query)
      .bind(user_name)
      .try_map(|row: PgRow| User::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn create(
    &self,
    create_user: CreateUser,
  ) -> Result<User, RepositoryError> {
    let query = format!(
      r#"
      INSERT INTO users (uuid, user_name, email, full_name, role, department_uuid, password_hash, is_active)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
      RETURNING {COLUMNS}
    "#
    );
    sqlx::query(&query)
      .bind(&create_user.uuid)
      .bind(&create_user.user_name)
      .bind(&create_user.email)
      .bind(&create_user.full_name)
      .bind(create_user.role.as_str())
      .bind(&create_user.department_uuid)
      .bind(&create_user.password_hash)
      .bind(create_user.is_active)
      .try_map(|row: PgRow| User::try_from(row))
      .fetch_one(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn update(
    &self,
    uuid: &str,
    update_user: UpdateUser,
  ) -> Result<Option<User>, RepositoryError> {
    let query = format!(
      r#"
      UPDATE users
      SET email = $2, full_name = $3, role = $4, department_uuid = $5,
          password_hash = COALESCE($6, password_hash), is_active = $7,
          updated_at = now()
      WHERE uuid = $1
      RETURNING {COLUMNS}
    "#
    );
    sqlx::query(&query)
      .bind(uuid)
      .bind(&update_user.email)
      .bind(&update_user.full_name)
      .bind(update_user.role.as_str())
      .bind(&update_user.department_uuid)
      .bind(&update_user.password_hash)
      .bind(update_user.is_active)
      .try_map(|row: PgRow| User::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn delete(&self, uuid: &str) -> Result<bool, RepositoryError> {
    sqlx::query("DELETE FROM users WHERE uuid = $1")
      .bind(uuid)
      .execute(&*self.pool)
      .await
      .map(|result| result.rows_affected() > 0)
      .map_err(|error| RepositoryError::from(error).on_delete())
  }
}

impl TryFrom<PgRow> for User {
  type Error = sqlx::Error;

  fn try_from(row: PgRow) -> Result<Self, Self::Error> {
    let role: String = row.try_get("role")?;
    Ok(Self {
      uuid: row.try_get("uuid")?,
      created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
      updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
      user_name: row.try_get("user_name")?,
      email: row.try_get("email")?,
      full_name: row.try_get("full_name")?,
      role: role
        .parse()
        .map_err(|error: String| sqlx::Error::Decode(error.into()))?,
      department_uuid: row.try_get("department_uuid")?,
      password_hash: row.try_get("password_hash")?,
      is_active: row.try_get("is_active")?,
    })
  }
}
