use actix_web::{
  error::ResponseError,
  HttpResponse
};
use derive_more::Display;
use log::error;
use serde_json::json;
use crate::db::validation::ValidationErrors;

// The full error detail only ever appears in the logs,
// random internet people get the generic variant text.
#[derive(Debug, Display)]
pub enum Error {
  #[display(fmt = "Internal server error")]
  InternalServerError(String),
  #[display(fmt = "Database error")]
  DatabaseError(String),
  #[display(fmt = "Unauthorized")]
  Unauthorized,
  #[display(fmt = "Not found: {}", _0)]
  NotFound(String),
  #[display(fmt = "Bad request: {}", _0)]
  BadRequest(String),
  // Field validation failures carry the field -> message
  // map so the submitting user can correct the form:
  #[display(fmt = "Validation error")]
  ValidationFailed(ValidationErrors)
}

impl ResponseError for Error {
  fn error_response(&self) -> HttpResponse {
    match self {
      Error::InternalServerError(detail) | Error::DatabaseError(detail) => {
        error!("Responding with a 500 - {}", detail);
        HttpResponse::InternalServerError()
          .json(json!({ "error": self.to_string() }))
      },
      Error::Unauthorized => HttpResponse::Unauthorized()
        .json(json!({ "error": "Unauthorized" })),
      Error::NotFound(_) => HttpResponse::NotFound()
        .json(json!({ "error": self.to_string() })),
      Error::BadRequest(_) => HttpResponse::BadRequest()
        .json(json!({ "error": self.to_string() })),
      Error::ValidationFailed(errors) => HttpResponse::BadRequest()
        .json(json!({
          "error": "Validation error",
          "validationErrors": errors
        }))
    }
  }
}

// Data layer failures all collapse into the same opaque
// database error; the message ends up in the logs through
// error_response above.
pub fn map_db_error<E: std::fmt::Display>(e: E) -> Error {
  Error::DatabaseError(e.to_string())
}
