use actix_web::error::BlockingError;
use actix_web::web;
use lazy_static::lazy_static;
use thiserror::Error;

lazy_static! {
  // Verified against when the user does not exist, so a miss costs as much as a hit.
  static ref DUMMY_HASH: Option<String> =
    bcrypt::hash("fleet-office-dummy-password", bcrypt::DEFAULT_COST).ok();
}

#[derive(Debug, Error)]
pub enum PasswordError {
  #[error("Hashing error: {0}")]
  Hash(#[from] bcrypt::BcryptError),

  #[error("Blocking task failed: {0}")]
  Blocking(#[from] BlockingError),
}

pub async fn hash_password(
  password: String,
  cost: u32,
) -> Result<String, PasswordError> {
  web::block(move || bcrypt::hash(password, cost))
    .await?
    .map_err(PasswordError::from)
}

/// `Ok(false)` for a wrong password and for a missing hash alike.
pub async fn verify_password(
  password: String,
  hash: Option<String>,
) -> Result<bool, PasswordError> {
  web::block(move || match hash {
    Some(hash) => bcrypt::verify(password, &hash),
    None => {
      if let Some(dummy) = DUMMY_HASH.as_deref() {
        let _ = bcrypt::verify(password, dummy);
      }
      Ok(false)
    }
  })
  .await?
  .map_err(PasswordError::from)
}
