use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
  #[error("Database error: {0}")]
  DatabaseError(sqlx::Error),

  /// A unique constraint rejected the write, or a delete hit a live reference.
  #[error("Conflict: {0}")]
  Conflict(String),

  /// The write points at a row that does not exist.
  #[error("Invalid reference: {0}")]
  InvalidReference(String),

  #[error("Not found")]
  NotFound,

  #[error("Other error: {0}")]
  Other(String),
}

impl From<sqlx::Error> for RepositoryError {
  fn from(error: sqlx::Error) -> Self {
    if let sqlx::Error::Database(db) = &error {
      if db.is_unique_violation() {
        return RepositoryError::Conflict(constraint_name(&**db));
      }
      if db.is_foreign_key_violation() {
        return RepositoryError::InvalidReference(constraint_name(&**db));
      }
    }
    match error {
      sqlx::Error::RowNotFound => RepositoryError::NotFound,
      other => RepositoryError::DatabaseError(other),
    }
  }
}

impl RepositoryError {
  /// A foreign key failing on delete means the row is still referenced.
  pub fn on_delete(self) -> Self {
    match self {
      RepositoryError::InvalidReference(constraint) => {
        RepositoryError::Conflict(constraint)
      }
      other => other,
    }
  }
}

fn constraint_name(db: &dyn sqlx::error::DatabaseError) -> String {
  db.constraint()
    .map(String::from)
    .unwrap_or_else(|| db.message().to_string())
}
