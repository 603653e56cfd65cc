use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::chart::PaletteIndex;

/// Failures of the chart engine and the generation pipeline
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Unknown palette index: {0}")]
    UnknownIndex(PaletteIndex),

    #[error("Color {0} is the only color left and cannot be merged")]
    NoMergeTarget(PaletteIndex),

    #[error("Chart has not been generated yet")]
    EmptyBuffer,

    #[error("No source image loaded")]
    NoSourceImage,

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unsupported dimensions: {width}x{height}")]
    UnsupportedDimensions { width: u32, height: u32 },

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("PNG decode error: {0}")]
    PngDecode(String),
}

/// Failures of session persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Corrupt session {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session not found")]
    SessionNotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Chart(#[from] ChartError),

    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::SessionNotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Chart(e) => match e {
                ChartError::UnknownIndex(_)
                | ChartError::NoMergeTarget(_)
                | ChartError::InvalidColor(_) => StatusCode::BAD_REQUEST,
                ChartError::InvalidImage(_) | ChartError::NoSourceImage => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ChartError::EmptyBuffer => StatusCode::CONFLICT,
            },
            ApiError::Render(_) | ApiError::Store(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
