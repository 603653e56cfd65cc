//! Tests for session lifecycle routes: create, upload, generate, params,
//! undo and row picking.

mod common;

use axum::http::StatusCode;
use common::{fixtures, TestApp};
use pretty_assertions::assert_eq;
use stitchgrid::rendering::MARGIN;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.get("/health").await;
    common::assert_ok(&response);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_create_session_returns_uuid() {
    let app = TestApp::new().await;
    let id = app.create_session().await;
    assert_eq!(id.len(), 36);
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    let other = app.create_session().await;
    assert_ne!(id, other);
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = TestApp::new().await;
    let missing = uuid::Uuid::new_v4();

    let response = app.post(&format!("/api/generate/{missing}")).await;
    common::assert_error(&response, StatusCode::NOT_FOUND);

    let response = app.get(&format!("/api/palette/{missing}")).await;
    common::assert_error(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_session_id_is_404() {
    let app = TestApp::new().await;
    let response = app.get("/api/grid/not-a-session").await;
    common::assert_error(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_rejects_non_image() {
    let app = TestApp::new().await;
    let id = app.create_session().await;

    let response = app
        .post_bytes(&format!("/api/upload/{id}"), b"definitely not a png".to_vec())
        .await;
    common::assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_generate_without_image() {
    let app = TestApp::new().await;
    let id = app.create_session().await;

    let response = app.post(&format!("/api/generate/{id}")).await;
    common::assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_generate_reports_chart_size() {
    let app = TestApp::new().await;
    let id = app.create_session().await;

    let response = app
        .post_bytes(&format!("/api/upload/{id}"), fixtures::stripes_png())
        .await;
    common::assert_ok(&response);

    let response = app.post(&format!("/api/generate/{id}")).await;
    common::assert_ok(&response);
    let json: serde_json::Value = response.json();
    assert_eq!(json["width"], 20);
    assert_eq!(json["height"], 10);
    let colors = json["colors"].as_u64().unwrap();
    assert!((4..=8).contains(&colors), "got {colors} colors");
}

#[tokio::test]
async fn test_grid_before_generate_is_conflict() {
    let app = TestApp::new().await;
    let id = app.create_session().await;

    let response = app.get(&format!("/api/grid/{id}")).await;
    common::assert_error(&response, StatusCode::CONFLICT);

    let response = app
        .post_json(&format!("/api/color/delete/{id}"), r#"{"index": 0}"#)
        .await;
    common::assert_error(&response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_params_patch_regenerates_with_new_width() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;

    let response = app
        .post_json(
            &format!("/api/params/{id}"),
            r#"{"grid_width_cells": 10, "max_colors": 4}"#,
        )
        .await;
    common::assert_ok(&response);

    let response = app.post(&format!("/api/generate/{id}")).await;
    let json: serde_json::Value = response.json();
    assert_eq!(json["width"], 10);
    assert_eq!(json["height"], 5);
    assert!(json["colors"].as_u64().unwrap() <= 4);
}

#[tokio::test]
async fn test_params_patch_rejects_wrong_types() {
    let app = TestApp::new().await;
    let id = app.create_session().await;

    let response = app
        .post_json(&format!("/api/params/{id}"), r#"{"zoom": "big"}"#)
        .await;
    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_undo_after_recolor() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;
    let before = app.palette(&id).await;
    let index = before[0]["index"].as_u64().unwrap();

    let response = app
        .post_json(
            &format!("/api/color/replace/{id}"),
            &format!(r##"{{"index": {index}, "new_hex": "#123456"}}"##),
        )
        .await;
    assert!(common::assert_edit(&response));

    let response = app.post(&format!("/api/undo/{id}")).await;
    common::assert_ok(&response);
    let json: serde_json::Value = response.json();
    assert_eq!(json["undone"], true);
    assert_eq!(app.palette(&id).await, before);

    // the first generation itself is not undoable
    let response = app.post(&format!("/api/undo/{id}")).await;
    let json: serde_json::Value = response.json();
    assert_eq!(json["undone"], false);
}

#[tokio::test]
async fn test_new_upload_clears_chart_and_history() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;
    app.post_json(
        &format!("/api/simplify/{id}"),
        r#"{"intensity": 100}"#,
    )
    .await;

    let response = app
        .post_bytes(
            &format!("/api/upload/{id}"),
            fixtures::solid_png(8, 8, [10, 10, 10]),
        )
        .await;
    common::assert_ok(&response);

    let response = app.post(&format!("/api/undo/{id}")).await;
    let json: serde_json::Value = response.json();
    assert_eq!(json["undone"], false);

    let response = app.get(&format!("/api/grid/{id}")).await;
    common::assert_error(&response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_row_at_maps_clicks_to_rows() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;

    let click = |y: f64, zoom: f64| format!(r#"{{"click_y": {y}, "zoom": {zoom}}}"#);
    let row_y = (MARGIN + 22 * 3 + 5) as f64;

    let response = app
        .post_json(&format!("/api/row-at/{id}"), &click(row_y, 1.0))
        .await;
    common::assert_ok(&response);
    let json: serde_json::Value = response.json();
    assert_eq!(json["row"], 3);

    let response = app
        .post_json(&format!("/api/row-at/{id}"), &click(row_y * 2.0, 2.0))
        .await;
    let json: serde_json::Value = response.json();
    assert_eq!(json["row"], 3);

    // inside the top margin
    let response = app
        .post_json(&format!("/api/row-at/{id}"), &click(10.0, 1.0))
        .await;
    let json: serde_json::Value = response.json();
    assert!(json["row"].is_null());

    // below the last row
    let response = app
        .post_json(&format!("/api/row-at/{id}"), &click(5000.0, 1.0))
        .await;
    let json: serde_json::Value = response.json();
    assert!(json["row"].is_null());
}

#[tokio::test]
async fn test_highlight_is_undoable() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;
    let plain = app.get(&format!("/api/grid/{id}")).await.text();

    app.post_json(&format!("/api/params/{id}"), r#"{"highlighted_row": 2}"#)
        .await;
    let highlighted = app.get(&format!("/api/grid/{id}")).await.text();
    assert_ne!(plain, highlighted);

    let response = app.post(&format!("/api/undo/{id}")).await;
    let json: serde_json::Value = response.json();
    assert_eq!(json["undone"], true);
    assert_eq!(app.get(&format!("/api/grid/{id}")).await.text(), plain);
}
