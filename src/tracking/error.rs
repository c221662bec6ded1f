use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::tracking::store::StoreError;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("failed to create service: {0}")]
    Service(#[from] std::io::Error),
    #[error("failed to parse address: {0}")]
    Address(#[from] std::net::AddrParseError),
    #[error("{0}")]
    Validation(String),
    #[error("could not reserve a unique tracking number after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("issuer task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
}

impl IntoResponse for TrackingError {
    fn into_response(self) -> Response {
        let status = match &self {
            TrackingError::Validation(_) => StatusCode::BAD_REQUEST,
            TrackingError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TrackingError::Address(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TrackingError::RetriesExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            TrackingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TrackingError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TrackingError::InvalidHeader(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, TrackingError>;
