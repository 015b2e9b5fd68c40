use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::{postgres::PgRow, PgConnection, Pool, Postgres};

use crate::assignments::model::{AssignmentKind, AssignmentRecord};
use crate::shared::database::Database;
use crate::shared::repository::RepositoryError;

pub trait AssignmentHistoryRepository {
  /// Newest first.
  async fn find_by_subject(
    &self,
    kind: AssignmentKind,
    subject_uuid: &str,
  ) -> Result<Vec<AssignmentRecord>, RepositoryError>;
  /// Newest first.
  async fn find_by_assignee(
    &self,
    kind: AssignmentKind,
    assignee_uuid: &str,
  ) -> Result<Vec<AssignmentRecord>, RepositoryError>;
  async fn find_current(
    &self,
    kind: AssignmentKind,
    subject_uuid: &str,
  ) -> Result<Option<AssignmentRecord>, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentTransition {
  /// Id of the record to open.
  pub uuid: String,
  pub kind: AssignmentKind,
  pub subject_uuid: String,
  pub assignee_uuid: Option<String>,
  pub at: DateTime<Utc>,
}

pub struct AssignmentHistoryRepositoryImpl {
  pool: Arc<Pool<Postgres>>,
}

impl AssignmentHistoryRepositoryImpl {
  pub fn new(database: Arc<Database>) -> Self {
    Self {
      pool: database.pool.clone(),
    }
  }
}

const COLUMNS: &str =
  "uuid, kind, subject_uuid, assignee_uuid, assigned_at, released_at, is_current";

impl AssignmentHistoryRepository for AssignmentHistoryRepositoryImpl {
  async fn find_by_subject(
    &self,
    kind: AssignmentKind,
    subject_uuid: &str,
  ) -> Result<Vec<AssignmentRecord>, RepositoryError> {
    let query = format!(
      r#"
      SELECT {COLUMNS} FROM assignment_histories
      WHERE kind = $1 AND subject_uuid = $2
      ORDER BY assigned_at DESC
    "#
    );
    sqlx::query(&query)
      .bind(kind.as_str())
      .bind(subject_uuid)
      .try_map(|row: PgRow| AssignmentRecord::try_from(row))
      .fetch_all(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn find_by_assignee(
    &self,
    kind: AssignmentKind,
    assignee_uuid: &str,
  ) -> Result<Vec<AssignmentRecord>, RepositoryError> {
    let query = format!(
      r#"
      SELECT {COLUMNS} FROM assignment_histories
      WHERE kind = $1 AND assignee_uuid = $2
      ORDER BY assigned_at DESC
    "#
    );
    sqlx::query(&query)
      .bind(kind.as_str())
      .bind(assignee_uuid)
      .try_map(|row: PgRow| AssignmentRecord::try_from(row))
      .fetch_all(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }

  async fn find_current(
    &self,
    kind: AssignmentKind,
    subject_uuid: &str,
  ) -> Result<Option<AssignmentRecord>, RepositoryError> {
    let query = format!(
      r#"
      SELECT {COLUMNS} FROM assignment_histories
      WHERE kind = $1 AND subject_uuid = $2 AND is_current
    "#
    );
    sqlx::query(&query)
      .bind(kind.as_str())
      .bind(subject_uuid)
      .try_map(|row: PgRow| AssignmentRecord::try_from(row))
      .fetch_optional(&*self.pool)
      .await
      .map_err(RepositoryError::from)
  }
}

/// Closes whatever record is current for the subject, then opens one for the
/// new assignee if there is one.
///
/// Runs on the caller's connection so the entity write that caused the
/// transition commits or rolls back together with it.
pub async fn transition_in(
  connection: &mut PgConnection,
  transition: &AssignmentTransition,
) -> Result<(), RepositoryError> {
  sqlx::query(
    r#"
    UPDATE assignment_histories
    SET is_current = FALSE, released_at = $3
    WHERE kind = $1 AND subject_uuid = $2 AND is_current
  "#,
  )
  .bind(transition.kind.as_str())
  .bind(&transition.subject_uuid)
  .bind(transition.at)
  .execute(&mut *connection)
  .await?;

  if let Some(assignee_uuid) = &transition.assignee_uuid {
    sqlx::query(
      r#"
      INSERT INTO assignment_histories
        (uuid, kind, subject_uuid, assignee_uuid, assigned_at, is_current)
      VALUES ($1, $2, $3, $4, $5, TRUE)
    "#,
    )
    .bind(&transition.uuid)
    .bind(transition.kind.as_str())
    .bind(&transition.subject_uuid)
    .bind(assignee_uuid)
    .bind(transition.at)
    .execute(&mut *connection)
    .await?;
  }
  Ok(())
}

impl TryFrom<PgRow> for AssignmentRecord {
  type Error = sqlx::Error;

  fn try_from(row: PgRow) -> Result<Self, Self::Error> {
    let kind: String = row.try_get("kind")?;
    Ok(Self {
      uuid: row.try_get("uuid")?,
      kind: kind
        .parse()
        .map_err(|error: String| sqlx::Error::Decode(error.into()))?,
      subject_uuid: row.try_get("subject_uuid")?,
      assignee_uuid: row.try_get("assignee_uuid")?,
      assigned_at: row.try_get::<DateTime<Utc>, _>("assigned_at")?,
      released_at: row.try_get::<Option<DateTime<Utc>>, _>("released_at")?,
      is_current: row.try_get("is_current")?,
    })
  }
}
