use crate::models::dto::{RemoteResponse, ResponseCode};
use crate::services::error::ServiceError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use core::fmt;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    InvalidData(String),
    /// Detail is logged, never sent to the client.
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidData(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> ResponseCode {
        match self {
            ApiError::NotFound(_) => ResponseCode::EntityNotFound,
            ApiError::InvalidData(_) => ResponseCode::InvalidData,
            ApiError::Internal(_) => ResponseCode::InternalError,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) | ApiError::InvalidData(msg) => f.write_str(msg),
            ApiError::Internal(detail) => write!(f, "internal error: {}", detail),
        }
    }
}

impl Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::InvalidInput(msg) => ApiError::InvalidData(msg),
            ServiceError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(detail) => {
                error!("Request failed: {}", detail);
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        };
        let body: RemoteResponse<()> = RemoteResponse::failure(self.code(), message);
        (self.status(), Json(body)).into_response()
    }
}
