//! HTTP error responses.

use crate::api::dto::MessageResponse;
use crate::protocol::Response as StoreResponse;
use axum::Json;
use crate::store::StoreError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// An error returned from a handler, rendered as `{"message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Todo not found")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a non-success store response onto an HTTP error.
    pub fn from_store(response: StoreResponse) -> Self {
        match response {
            StoreResponse::NotFound { .. } => Self::not_found(),
            StoreResponse::Invalid { message } => Self::bad_request(message),
            StoreResponse::Error { message } => Self::internal(message),
            other => Self::internal(format!("unexpected store response: {:?}", other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            log::error!("{} {}", self.status, self.message);
        } else {
            log::debug!("{} {}", self.status, self.message);
        }
        (self.status, Json(MessageResponse::new(self.message))).into_response()
    }
}

impl From<eyre::Report> for ApiError {
    fn from(report: eyre::Report) -> Self {
        match StoreError::find(&report) {
            Some(StoreError::NotFound(_)) => Self::not_found(),
            Some(StoreError::Validation(e)) => Self::bad_request(e.to_string()),
            None => Self::internal(format!("{:#}", report)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
