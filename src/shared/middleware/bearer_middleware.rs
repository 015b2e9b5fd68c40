use actix_web::web::Data;
use actix_web::Error;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::auth::model::access_token_claims::AccessTokenClaims;
use crate::shared::config::Config;
use crate::shared::http_error::HttpError;

impl FromRequest for AccessTokenClaims {
  type Error = Error;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let Some(config) = req.app_data::<Data<Config>>() else {
      log::error!("Config is not registered as app data");
      return ready(Err(actix_web::error::ErrorInternalServerError(
        "Missing configuration",
      )));
    };
    ready(
      req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .and_then(|token| decode_access_token(config, token).ok())
        .ok_or_else(|| {
          actix_web::error::InternalError::from_response(
            "Invalid Authorization header",
            actix_web::HttpResponse::Unauthorized()
              .json(HttpError::from("Invalid Authorization header")),
          )
          .into()
        }),
    )
  }
}

pub fn decode_access_token(
  config: &Config,
  token: &str,
) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
  decode::<AccessTokenClaims>(
    token,
    &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
    &Validation::default(),
  )
  .map(|token| token.claims)
}

#[cfg(test)]
mod tests {
  use actix_web::http::header::HeaderValue;
  use actix_web::{http::StatusCode, test::TestRequest};

  use super::*;
  use crate::helpers::tests::create_fake_access_token;
  use crate::shared::role::Role;

  fn request_with(config: &Config, authorization: Option<String>) -> HttpRequest {
    let mut request =
      TestRequest::default().app_data(Data::new(config.clone()));
    if let Some(value) = authorization {
      request = request.append_header((
        actix_web::http::header::AUTHORIZATION,
        HeaderValue::from_str(&value).unwrap(),
      ));
    }
    request.to_http_request()
  }

  #[actix_web::test]
  async fn test_valid_token_is_extracted() {
    let config = Config::for_tests();
    let token = create_fake_access_token(&config.jwt_secret, Role::Manager);
    let request = request_with(&config, Some(format!("Bearer {token}")));

    let claims = AccessTokenClaims::extract(&request).await.unwrap();
    assert_eq!(claims.role, Role::Manager);
  }

  #[actix_web::test]
  async fn test_token_signed_with_other_secret_is_rejected() {
    let config = Config::for_tests();
    let token = create_fake_access_token("another-secret", Role::Admin);
    let request = request_with(&config, Some(format!("Bearer {token}")));

    let error = AccessTokenClaims::extract(&request).await.unwrap_err();
    assert_eq!(error.error_response().status(), StatusCode::UNAUTHORIZED);
  }

  #[actix_web::test]
  async fn test_missing_header_is_rejected() {
    let config = Config::for_tests();
    let request = request_with(&config, None);

    assert!(AccessTokenClaims::extract(&request).await.is_err());
  }
}
