use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::{postgres::PgRow, Pool, Postgres};

use crate::departments::model::Department;
use crate::shared::database::Database;
use crate::shared::dto::pagination_dto::Pagination;
use crate::shared::repository::RepositoryError;

pub trait DepartmentRepository {
  async fn find_all(
    &self,
    pagination: Pagination,
  ) -> Result<Vec<Department>, RepositoryError>;
  async fn find_one(
    &self,
    uuid: &str,
  ) -> Result<Option<Department>, RepositoryError>;
  async fn create(
    &self,
    create_department: CreateDepartment,
  ) -> Result<Department, RepositoryError>;
  async fn update(
    &self,
    uuid: &str,
    update_department: UpdateDepartment,
  ) -> Result<Option<Department>, RepositoryError>;
  async fn delete(&self, uuid: &str) -> Result<bool, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDepartment {
  pub uuid: String,
  pub fields: UpdateDepartment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDepartment {
  pub name: String,
  pub code: String,
  pub description: Option<String>,
}

pub struct DepartmentRepositoryImpl {
  pool: Arc<Pool<Postgres>>,
}

impl DepartmentRepositoryImpl {
  pub fn new(database: Arc<Database>) -> Self {
    Self {
      pool: database.pool.clone(),
    }
  }
}

const COLUMNS: &str = "uuid, created_at, updated_at, name, code, description";

impl DepartmentRepository for DepartmentRepositoryImpl {
  async fn find_all(
    &self,
    pagination: Pagination,
  ) -> Result<Vec<Department>, RepositoryError> {
    let query = format!(
      "SELECT {COLUMNS} FROM departments ORDER BY name LIMIT $1 OFFSET $2"
    );
    sqlx::query(&query)
      .bind(pagination.limit())
      .bind(pagination.offset())
      .try_map(|row: PgRow| Department::try_from(row))
      .fetch_all(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn find_one(
    &self,
    uuid: &str,
  ) -> Result<Option<Department>, RepositoryError> {
    let query = format!("SELECT {COLUMNS} FROM departments WHERE uuid = $1");
    sqlx::query(&query)
      .bind(uuid)
      .try_map(|row: PgRow| Department::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn create(
    &self,
    create_department: CreateDepartment,
  ) -> Result<Department, RepositoryError> {
    let query = format!(
      r#"
      INSERT INTO departments (uuid, name, code, description)
      VALUES ($1, $2, $3, $4)
      RETURNING {COLUMNS}
    "#
    );
    sqlx::query(&query)
      .bind(&create_department.uuid)
      .bind(&create_department.fields.name)
      .bind(&create_department.fields.code)
      .bind(&create_department.fields.description)
      .try_map(|row: PgRow| Department::try_from(row))
      .fetch_one(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn update(
    &self,
    uuid: &str,
    update_department: UpdateDepartment,
  ) -> Result<Option<Department>, RepositoryError> {
    let query = format!(
      r#"
      UPDATE departments
      SET name = $2, code = $3, description = $4, updated_at = now()
      WHERE uuid = $1
      RETURNING {COLUMNS}
    "#
    );
    sqlx::query(&query)
      .bind(uuid)
      .bind(&update_department.name)
      .bind(&update_department.code)
      .bind(&update_department.description)
      .try_map(|row: PgRow| Department::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn delete(&self, uuid: &str) -> Result<bool, RepositoryError> {
    sqlx::query("DELETE FROM departments WHERE uuid = $1")
      .bind(uuid)
      .execute(&*self.pool)
      .await
      .map(|result| result.rows_affected() > 0)
      .map_err(|error| RepositoryError::from(error).on_delete())
  }
}

impl TryFrom<PgRow> for Department {
  type Error = sqlx::Error;

  fn try_from(row: PgRow) -> Result<Self, Self::Error> {
    Ok(Self {
      uuid: row.try_get("uuid")?,
      created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
      updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
      name: row.try_get("name")?,
      code: row.try_get("code")?,
      description: row.try_get("description")?,
    })
  }
}

#[cfg(test)]
pub mod tests {
  use std::sync::RwLock;

  use chrono::Utc;

  use super::{
    CreateDepartment, DepartmentRepository, RepositoryError, UpdateDepartment,
  };
  use crate::departments::model::Department;
  use crate::shared::dto::pagination_dto::Pagination;

  pub struct InMemoryDepartmentRepository {
    pub departments: RwLock<Vec<Department>>,
  }

  impl InMemoryDepartmentRepository {
    pub fn new() -> Self {
      Self {
        departments: RwLock::new(Vec::new()),
      }
    }

    fn check_unique(
      departments: &[Department],
      fields: &UpdateDepartment,
      except_uuid: Option<&str>,
    ) -> Result<(), RepositoryError> {
      for department in departments
        .iter()
        .filter(|d| Some(d.uuid.as_str()) != except_uuid)
      {
        if department.name == fields.name {
          return Err(RepositoryError::Conflict("departments_name_key".into()));
        }
        if department.code == fields.code {
          return Err(RepositoryError::Conflict("departments_code_key".into()));
        }
      }
      Ok(())
    }
  }

  impl DepartmentRepository for InMemoryDepartmentRepository {
    async fn find_all(
      &self,
      pagination: Pagination,
    ) -> Result<Vec<Department>, RepositoryError> {
      let mut departments = self.departments.read().unwrap().clone();
      departments.sort_by(|a, b| a.name.cmp(&b.name));
      Ok(pagination.slice(&departments))
    }

    async fn find_one(
      &self,
      uuid: &str,
    ) -> Result<Option<Department>, RepositoryError> {
      let departments = self.departments.read().unwrap(); // Acquire read lock
      Ok(departments.iter().find(|d| d.uuid == uuid).cloned())
    }

    async fn create(
      &self,
      create_department: CreateDepartment,
    ) -> Result<Department, RepositoryError> {
      let mut departments = self.departments.write().unwrap(); // Acquire write lock
      Self::check_unique(&departments, &create_department.fields, None)?;
      let fields = create_department.fields;
      let department = Department {
        uuid: create_department.uuid,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        name: fields.name,
        code: fields.code,
        description: fields.description,
      };
      departments.push(department.clone());
      Ok(department)
    }

    async fn update(
      &self,
      uuid: &str,
      update_department: UpdateDepartment,
    ) -> Result<Option<Department>, RepositoryError> {
      let mut departments = self.departments.write().unwrap();
      Self::check_unique(&departments, &update_department, Some(uuid))?;
      let Some(department) = departments.iter_mut().find(|d| d.uuid == uuid)
      else {
        return Ok(None);
      };
      department.name = update_department.name;
      department.code = update_department.code;
      department.description = update_department.description;
      department.updated_at = Utc::now();
      Ok(Some(department.clone()))
    }

    async fn delete(&self, uuid: &str) -> Result<bool, RepositoryError> {
      let mut departments = self.departments.write().unwrap();
      let before = departments.len();
      departments.retain(|d| d.uuid != uuid);
      Ok(departments.len() < before)
    }
  }
}
