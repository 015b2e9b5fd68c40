use actix_web::{dev::ServiceRequest, error, web, Error};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use subtle::ConstantTimeEq;

use crate::shared::config::Config;

/// Validator for the bootstrap scope:
/// - accepts Bearer auth carrying the master key;
/// - rejects requests without a Bearer Authorization header or with a wrong key.
pub async fn master_key_validator(
  req: ServiceRequest,
  credentials: Option<BearerAuth>,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
  let Some(credentials) = credentials else {
    return Err((error::ErrorBadRequest("no bearer header"), req));
  };

  let Some(config) = req.app_data::<web::Data<Config>>() else {
    log::error!("Config is not registered as app data");
    return Err((error::ErrorInternalServerError("Missing configuration"), req));
  };

  if !constant_time_compare(credentials.token(), &config.master_key) {
    log::warn!("rejected master key from {:?}", req.peer_addr());
    return Err((error::ErrorUnauthorized("Invalid master key"), req));
  }

  Ok(req)
}

fn constant_time_compare(a: &str, b: &str) -> bool {
  a.as_bytes().ct_eq(b.as_bytes()).unwrap_u8() == 1
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_constant_time_compare() {
    assert!(constant_time_compare("secret", "secret"));
    assert!(!constant_time_compare("secret", "secreT"));
    assert!(!constant_time_compare("secret", "secret-longer"));
    assert!(!constant_time_compare("", "secret"));
  }
}
