use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Json},
    Json as JsonExtractor,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::{ParamsPatch, SessionId};
use crate::services::{GenerateSummary, SessionManager};

/// Response from session creation
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Identifier to use in every other route
    pub session_id: String,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Response from chart generation
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateResponse {
    pub message: String,
    /// Chart width in cells
    pub width: u32,
    /// Chart height in cells
    pub height: u32,
    /// Number of palette colors produced
    pub colors: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UndoResponse {
    /// `false` when there was nothing to undo
    pub undone: bool,
}

/// A click on the displayed chart
#[derive(Debug, Deserialize, ToSchema)]
pub struct RowAtRequest {
    /// Vertical click position inside the zoomed image, in pixels
    pub click_y: f64,
    /// Zoom the image was displayed at
    pub zoom: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RowAtResponse {
    /// Chart row under the click, `null` outside the grid
    pub row: Option<u32>,
}

/// Malformed ids cannot name a session, so they are reported as not found
pub(crate) fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    SessionId::parse(raw).ok_or(ApiError::SessionNotFound)
}

/// Create an editing session
#[utoipa::path(
    post,
    path = "/api/session",
    responses(
        (status = 200, description = "Session created", body = SessionResponse),
    ),
    tag = "Session"
)]
pub async fn create_session(
    State(sessions): State<Arc<SessionManager>>,
) -> Result<impl IntoResponse, ApiError> {
    let id = sessions.create().await?;
    Ok(Json(SessionResponse {
        session_id: id.to_string(),
    }))
}

/// Upload the source photo
///
/// The request body is the raw image file (PNG, JPEG, GIF, BMP or WebP).
/// Loading a new photo discards the current chart and its undo history.
#[utoipa::path(
    post,
    path = "/api/upload/{id}",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Image loaded", body = MessageResponse),
        (status = 404, description = "Session not found"),
        (status = 422, description = "Body is not a decodable image"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Session"
)]
pub async fn upload_image(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let (width, height) = sessions
        .update(&id, move |s| Ok(s.load_image(&body)?))
        .await?;
    Ok(Json(MessageResponse {
        message: format!("Image loaded ({width}x{height})"),
    }))
}

/// Generate the chart from the source photo
#[utoipa::path(
    post,
    path = "/api/generate/{id}",
    responses(
        (status = 200, description = "Chart generated", body = GenerateResponse),
        (status = 404, description = "Session not found"),
        (status = 422, description = "No source image loaded"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Session"
)]
pub async fn generate(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let GenerateSummary {
        width,
        height,
        colors,
    } = sessions.update(&id, |s| Ok(s.generate()?)).await?;
    Ok(Json(GenerateResponse {
        message: "Chart generated".to_string(),
        width,
        height,
        colors,
    }))
}

/// Update generation and display parameters
///
/// Only the fields present in the body change. Generation settings apply
/// on the next generate; display settings apply immediately.
#[utoipa::path(
    post,
    path = "/api/params/{id}",
    request_body = ParamsPatch,
    responses(
        (status = 200, description = "Parameters updated", body = MessageResponse),
        (status = 404, description = "Session not found"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Session"
)]
pub async fn update_params(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
    JsonExtractor(patch): JsonExtractor<ParamsPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    sessions
        .update(&id, move |s| {
            s.apply_params(&patch);
            Ok(())
        })
        .await?;
    Ok(Json(MessageResponse {
        message: "Parameters updated".to_string(),
    }))
}

/// Revert the last chart change
#[utoipa::path(
    post,
    path = "/api/undo/{id}",
    responses(
        (status = 200, description = "Undo result", body = UndoResponse),
        (status = 404, description = "Session not found"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Session"
)]
pub async fn undo(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let undone = sessions.update(&id, |s| Ok(s.undo())).await?;
    Ok(Json(UndoResponse { undone }))
}

/// Map a click on the displayed chart to a chart row
#[utoipa::path(
    post,
    path = "/api/row-at/{id}",
    request_body = RowAtRequest,
    responses(
        (status = 200, description = "Row under the click", body = RowAtResponse),
        (status = 404, description = "Session not found"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Session"
)]
pub async fn row_at(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
    JsonExtractor(click): JsonExtractor<RowAtRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let row = sessions
        .read(&id, move |s| Ok(s.row_at(click.click_y, click.zoom)))
        .await?;
    Ok(Json(RowAtResponse { row }))
}
