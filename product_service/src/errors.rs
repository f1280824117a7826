// product_service/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::models::DataValidationError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(#[from] DataValidationError),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Unsupported Media Type: {0}")]
  UnsupportedMediaType(String),

  #[error("Method Not Allowed: {0}")]
  MethodNotAllowed(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

// Handlers and repositories may bubble up anyhow errors; they all count as internal.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(err) => AppError::Internal(format!("{:#}", err)),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
      AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migration(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    // Client errors echo their message; server errors never leak internals.
    let message = match self {
      AppError::Validation(e) => e.to_string(),
      AppError::NotFound(m) | AppError::UnsupportedMediaType(m) | AppError::MethodNotAllowed(m) => m.clone(),
      _ => {
        tracing::error!(application_error = %self, "Responding with internal server error");
        "An internal error occurred".to_string()
      }
    };
    if status.is_client_error() {
      tracing::warn!(status = status.as_u16(), %message, "Responding with client error");
    }

    HttpResponse::build(status).json(json!({
      "status": status.as_u16(),
      "error": status.canonical_reason().unwrap_or("Error"),
      "message": message,
    }))
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
