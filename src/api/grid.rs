use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Json, Response},
    Json as JsonExtractor,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::palette::EditResponse;
use super::session::parse_session_id;
use crate::chart::PaletteIndex;
use crate::error::ApiError;
use crate::services::SessionManager;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaintCellRequest {
    pub x: u32,
    pub y: u32,
    pub index: PaletteIndex,
}

/// Rectangle in cell coordinates; parts outside the chart are ignored
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegionReplaceRequest {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub from: PaletteIndex,
    pub to: PaletteIndex,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GridResponse {
    /// Chart PNG, base64 encoded
    pub image_base64: String,
}

/// Set a single cell
#[utoipa::path(
    post,
    path = "/api/cell/{id}",
    request_body = PaintCellRequest,
    responses(
        (status = 200, description = "Cell painted", body = EditResponse),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Chart not generated yet"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Grid"
)]
pub async fn paint_cell(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
    JsonExtractor(request): JsonExtractor<PaintCellRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let outcome = sessions
        .update(&id, move |s| {
            Ok(s.editor().paint(request.x, request.y, request.index)?)
        })
        .await?;
    Ok(Json(EditResponse::new("Cell painted", outcome)))
}

/// Replace one color with another inside a rectangle
#[utoipa::path(
    post,
    path = "/api/region/{id}",
    request_body = RegionReplaceRequest,
    responses(
        (status = 200, description = "Region updated", body = EditResponse),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Chart not generated yet"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Grid"
)]
pub async fn region_replace(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
    JsonExtractor(r): JsonExtractor<RegionReplaceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let outcome = sessions
        .update(&id, move |s| {
            Ok(s.editor().region_replace(r.x, r.y, r.w, r.h, r.from, r.to)?)
        })
        .await?;
    Ok(Json(EditResponse::new("Region updated", outcome)))
}

/// Rendered chart as base64 PNG
#[utoipa::path(
    get,
    path = "/api/grid/{id}",
    responses(
        (status = 200, description = "Rendered chart", body = GridResponse),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Chart not generated yet"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Grid"
)]
pub async fn get_grid(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let image_base64 = sessions.read(&id, |s| s.render_base64()).await?;
    Ok(Json(GridResponse { image_base64 }))
}

/// Rendered chart as a PNG file (300 DPI, for printing)
#[utoipa::path(
    get,
    path = "/api/grid/{id}/png",
    responses(
        (status = 200, description = "Rendered chart", content_type = "image/png"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Chart not generated yet"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Grid"
)]
pub async fn get_grid_png(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_session_id(&id)?;
    let png = sessions.read(&id, |s| s.render_png()).await?;
    tracing::debug!(session_id = %id, size_bytes = png.len(), "Chart PNG served");
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"chart-{id}.png\""),
            ),
        ],
        png,
    )
        .into_response())
}
