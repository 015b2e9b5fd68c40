use actix_web::{dev::ServiceRequest, error, web, Error};
use actix_web_httpauth::extractors::bearer::BearerAuth;

use crate::shared::config::Config;
use crate::shared::middleware::bearer_middleware::decode_access_token;
use crate::users::repository::user_repository::UserRepository;

/// Validator for the API scope: the account behind an access token must still
/// exist, be active and hold the role the token was issued with.
///
/// Requests without a decodable access token pass through untouched. The
/// claims extractor turns them away where a token is required.
pub async fn account_validator<UR: UserRepository + 'static>(
  req: ServiceRequest,
  credentials: Option<BearerAuth>,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
  let Some(credentials) = credentials else {
    return Ok(req);
  };
  let (Some(config), Some(users)) = (
    req.app_data::<web::Data<Config>>().cloned(),
    req.app_data::<web::Data<UR>>().cloned(),
  ) else {
    log::error!("Config or user repository is not registered as app data");
    return Err((error::ErrorInternalServerError("Missing configuration"), req));
  };
  let Ok(claims) = decode_access_token(&config, credentials.token()) else {
    return Ok(req);
  };

  match users.find_one(&claims.uuid).await {
    Ok(Some(user)) if user.is_active && user.role == claims.role => Ok(req),
    Ok(_) => {
      log::info!("rejected stale token for {}", claims.uuid);
      Err((
        error::ErrorUnauthorized("Account is disabled or its role changed"),
        req,
      ))
    }
    Err(error) => {
      log::error!("{error}");
      Err((error::ErrorInternalServerError("Cannot load account"), req))
    }
  }
}
