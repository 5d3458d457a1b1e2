//! Origin error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OriginError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl IntoResponse for OriginError {
  fn into_response(self) -> Response {
    let status = match &self {
      OriginError::NotFound(_) => StatusCode::NOT_FOUND,
      OriginError::BadRequest(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
