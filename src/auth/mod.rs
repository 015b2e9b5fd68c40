pub mod dto;
pub mod model;
pub mod password;
pub mod rto;

use actix_web::{web, Responder};
use dto::login_dto::LoginDto;
use jsonwebtoken::{encode, EncodingKey, Header};
use model::access_token_claims::AccessTokenClaims;
use password::verify_password;
use rto::access_token_rto::AccessTokenRto;
use validator::Validate;

use crate::shared::config::Config;
use crate::shared::responses::{
  internal_error, ok, repository_error, unauthorized, validation_failed,
};
use crate::users::dto::create_user_dto::CreateUserDto;
use crate::users::insert_user;
use crate::users::repository::user_repository::UserRepository;

const INVALID_CREDENTIALS: &str = "Invalid user name or password";

/// Exchanges credentials for an access token. Unknown users, inactive users
/// and wrong passwords are indistinguishable, in body and in timing.
pub async fn login<UR: UserRepository + 'static>(
  user_repository: web::Data<UR>,
  config: web::Data<Config>,
  dto: web::Json<LoginDto>,
) -> impl Responder {
  if let Err(validation_errors) = dto.validate() {
    return validation_failed(validation_errors);
  }
  let dto = dto.into_inner();
  let user = match user_repository.find_by_user_name(&dto.user_name).await {
    Ok(user) => user.filter(|user| user.is_active),
    Err(error) => return repository_error(error),
  };

  let hash = user.as_ref().map(|user| user.password_hash.clone());
  let user = match verify_password(dto.password, hash).await {
    Ok(true) => user,
    Ok(false) => None,
    Err(error) => {
      log::error!("{error}");
      return internal_error();
    }
  };
  let Some(user) = user else {
    log::info!("failed login for {}", dto.user_name);
    return unauthorized(INVALID_CREDENTIALS);
  };

  let claims =
    AccessTokenClaims::for_user(&user, config.access_token_ttl_seconds);
  match encode(
    &Header::default(),
    &claims,
    &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
  ) {
    Ok(access_token) => {
      log::info!("issued access token for {}", user.uuid);
      ok(AccessTokenRto {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: config.access_token_ttl_seconds,
      })
    }
    Err(error) => {
      log::error!("{error}");
      internal_error()
    }
  }
}

/// Master key only. Creates a user of any role, which is how the first
/// admin gets in.
pub async fn create_admin_user<UR: UserRepository + 'static>(
  user_repository: web::Data<UR>,
  config: web::Data<Config>,
  dto: web::Json<CreateUserDto>,
) -> impl Responder {
  if let Err(validation_errors) = dto.validate() {
    return validation_failed(validation_errors);
  }
  insert_user(&**user_repository, config.bcrypt_cost, dto.into_inner()).await
}
