use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Json as JsonExtractor,
};
use chart_quant::Rgb;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use super::session::parse_session_id;
use crate::chart::{EditOutcome, PaletteIndex, PaletteUsage};
use crate::error::{ApiError, ChartError};
use crate::services::SessionManager;

/// Red-mean distance below which colors are suggested for merging
pub const DEFAULT_CLUSTER_THRESHOLD: f64 = 30.0;

/// Result of a palette or cell edit
#[derive(Debug, Serialize, ToSchema)]
pub struct EditResponse {
    pub message: String,
    /// `false` when the edit was a no-op (nothing recorded for undo)
    pub changed: bool,
}

impl EditResponse {
    pub(crate) fn new(message: &str, outcome: EditOutcome) -> Self {
        Self {
            message: message.to_string(),
            changed: outcome.is_changed(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ColorReplaceRequest {
    pub index: PaletteIndex,
    /// New color as `#rrggbb` or `#rgb`
    pub new_hex: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ColorDeleteRequest {
    pub index: PaletteIndex,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ColorMergeRequest {
    /// Color that disappears
    pub from: PaletteIndex,
    /// Color that takes over its cells
    pub to: PaletteIndex,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SimplifyRequest {
    /// 0 keeps every color, 100 merges as much as possible
    pub intensity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SimplifyBwResponse {
    pub message: String,
    pub changed: bool,
    /// Intensity picked from the palette's brightness range
    pub intensity: u8,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClustersQuery {
    /// Maximum perceptual distance to a group's first color
    pub threshold: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClustersResponse {
    /// Groups of at least two similar palette indices
    pub clusters: Vec<Vec<PaletteIndex>>,
}

/// Palette colors in use, most frequent first
#[utoipa::path(
    get,
    path = "/api/palette/{id}",
    responses(
        (status = 200, description = "Palette usage", body = Vec<PaletteUsage>),
        (status = 404, description = "Session not found"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Palette"
)]
pub async fn get_palette(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let usage = sessions.read(&id, |s| Ok(s.palette_report())).await?;
    Ok(Json(usage))
}

/// Recolor one palette entry
#[utoipa::path(
    post,
    path = "/api/color/replace/{id}",
    request_body = ColorReplaceRequest,
    responses(
        (status = 200, description = "Color replaced", body = EditResponse),
        (status = 400, description = "Malformed color"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Chart not generated yet"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Palette"
)]
pub async fn replace_color(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
    JsonExtractor(request): JsonExtractor<ColorReplaceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let color: Rgb = request
        .new_hex
        .parse()
        .map_err(|_| ChartError::InvalidColor(request.new_hex.clone()))?;
    let outcome = sessions
        .update(&id, move |s| Ok(s.editor().recolor(request.index, color)?))
        .await?;
    Ok(Json(EditResponse::new("Color replaced", outcome)))
}

/// Delete a color, moving its cells to the nearest remaining color
#[utoipa::path(
    post,
    path = "/api/color/delete/{id}",
    request_body = ColorDeleteRequest,
    responses(
        (status = 200, description = "Color removed", body = EditResponse),
        (status = 400, description = "Last remaining color"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Chart not generated yet"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Palette"
)]
pub async fn delete_color(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
    JsonExtractor(request): JsonExtractor<ColorDeleteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let outcome = sessions
        .update(&id, move |s| {
            Ok(s.editor().delete_merge_nearest(request.index)?)
        })
        .await?;
    Ok(Json(EditResponse::new("Color removed", outcome)))
}

/// Merge one color into another
#[utoipa::path(
    post,
    path = "/api/color/merge/{id}",
    request_body = ColorMergeRequest,
    responses(
        (status = 200, description = "Colors merged", body = EditResponse),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Chart not generated yet"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Palette"
)]
pub async fn merge_colors(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
    JsonExtractor(request): JsonExtractor<ColorMergeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let outcome = sessions
        .update(&id, move |s| Ok(s.editor().merge(request.from, request.to)?))
        .await?;
    Ok(Json(EditResponse::new("Colors merged", outcome)))
}

/// Suggest groups of similar colors to merge
#[utoipa::path(
    get,
    path = "/api/clusters/{id}",
    responses(
        (status = 200, description = "Merge suggestions", body = ClustersResponse),
        (status = 400, description = "Invalid threshold"),
        (status = 404, description = "Session not found"),
    ),
    params(("id" = String, Path, description = "Session id"), ClustersQuery),
    tag = "Palette"
)]
pub async fn get_clusters(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
    Query(query): Query<ClustersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let threshold = query.threshold.unwrap_or(DEFAULT_CLUSTER_THRESHOLD);
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ApiError::BadRequest(format!(
            "threshold must be a non-negative number, got {threshold}"
        )));
    }
    let clusters = sessions.read(&id, move |s| Ok(s.clusters(threshold))).await?;
    Ok(Json(ClustersResponse { clusters }))
}

/// Merge similar colors; intensity 0-100
#[utoipa::path(
    post,
    path = "/api/simplify/{id}",
    request_body = SimplifyRequest,
    responses(
        (status = 200, description = "Palette simplified", body = EditResponse),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Chart not generated yet"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Palette"
)]
pub async fn simplify(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
    JsonExtractor(request): JsonExtractor<SimplifyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let intensity = request.intensity.clamp(0, 100) as u8;
    let outcome = sessions
        .update(&id, move |s| Ok(s.editor().simplify(intensity)?))
        .await?;
    Ok(Json(EditResponse::new("Palette simplified", outcome)))
}

/// Simplify with an intensity chosen from the palette's brightness range
#[utoipa::path(
    post,
    path = "/api/simplify-bw/{id}",
    responses(
        (status = 200, description = "Palette simplified", body = SimplifyBwResponse),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Chart not generated yet"),
    ),
    params(("id" = String, Path, description = "Session id")),
    tag = "Palette"
)]
pub async fn simplify_bw(
    State(sessions): State<Arc<SessionManager>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let (outcome, intensity) = sessions
        .update(&id, |s| Ok(s.editor().simplify_bw_smart()?))
        .await?;
    Ok(Json(SimplifyBwResponse {
        message: "Black & white simplification applied".to_string(),
        changed: outcome.is_changed(),
        intensity,
    }))
}
