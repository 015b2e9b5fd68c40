use actix_web::{http::header, HttpResponse};
use serde::Serialize;
use validator::ValidationErrors;

use crate::shared::http_error::HttpError;
use crate::shared::repository::RepositoryError;
use crate::shared::rto::created_rto::CreatedRto;

pub fn ok<T: Serialize>(body: T) -> HttpResponse {
  HttpResponse::Ok()
    .content_type("application/json")
    .json(body)
}

pub fn created(location: String, uuid: String) -> HttpResponse {
  HttpResponse::Created()
    .content_type("application/json")
    .append_header((header::LOCATION, location))
    .json(CreatedRto::from(uuid))
}

pub fn no_content() -> HttpResponse {
  HttpResponse::NoContent().finish()
}

pub fn validation_failed(errors: ValidationErrors) -> HttpResponse {
  HttpResponse::BadRequest().json(errors)
}

pub fn not_found(what: &str) -> HttpResponse {
  HttpResponse::NotFound()
    .content_type("application/json")
    .json(HttpError::from(format!("{what} not found")))
}

pub fn forbidden() -> HttpResponse {
  HttpResponse::Forbidden()
    .content_type("application/json")
    .json(HttpError::from("Forbidden"))
}

pub fn unauthorized(message: &str) -> HttpResponse {
  HttpResponse::Unauthorized()
    .content_type("application/json")
    .json(HttpError::from(message))
}

pub fn conflict(message: &str) -> HttpResponse {
  HttpResponse::Conflict()
    .content_type("application/json")
    .json(HttpError::from(message))
}

pub fn unprocessable(message: &str) -> HttpResponse {
  HttpResponse::UnprocessableEntity()
    .content_type("application/json")
    .json(HttpError::from(message))
}

pub fn internal_error() -> HttpResponse {
  HttpResponse::InternalServerError()
    .content_type("application/json")
    .json(HttpError::from("Internal server error"))
}

pub fn repository_error(error: RepositoryError) -> HttpResponse {
  match error {
    RepositoryError::Conflict(constraint) => {
      log::debug!("write rejected by constraint {constraint}");
      conflict(&format!("Conflicts with existing data ({constraint})"))
    }
    RepositoryError::InvalidReference(constraint) => {
      log::debug!("write references a missing row ({constraint})");
      unprocessable(&format!("Referenced record does not exist ({constraint})"))
    }
    RepositoryError::NotFound => not_found("Record"),
    error => {
      log::error!("{error}");
      internal_error()
    }
  }
}
