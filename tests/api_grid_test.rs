//! Tests for cell edits and chart rendering routes.

mod common;

use axum::http::StatusCode;
use base64::Engine;
use common::TestApp;
use pretty_assertions::assert_eq;
use serde_json::Value;
use stitchgrid::rendering::{MARGIN, PAD};

/// Canvas size of the 20×10 fixture chart at zoom 1
const CANVAS_W: u32 = MARGIN + 20 * 22 + PAD;
const CANVAS_H: u32 = MARGIN + 10 * 22 + PAD;

fn decode_grid(json: &Value) -> image::RgbImage {
    let b64 = json["image_base64"].as_str().expect("image_base64");
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64)
        .expect("valid base64");
    image::load_from_memory(&bytes)
        .expect("valid PNG")
        .to_rgb8()
}

async fn two_indices(app: &TestApp, id: &str) -> (u64, u64) {
    let palette = app.palette(id).await;
    (
        palette[0]["index"].as_u64().unwrap(),
        palette[1]["index"].as_u64().unwrap(),
    )
}

#[tokio::test]
async fn test_paint_cell() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;
    let (a, b) = two_indices(&app, &id).await;
    let paint = |index: u64| format!(r#"{{"x": 0, "y": 0, "index": {index}}}"#);

    app.post_json(&format!("/api/cell/{id}"), &paint(a)).await;

    // painting the color a cell already has records nothing
    let response = app.post_json(&format!("/api/cell/{id}"), &paint(a)).await;
    assert!(!common::assert_edit(&response));

    let response = app.post_json(&format!("/api/cell/{id}"), &paint(b)).await;
    assert!(common::assert_edit(&response));

    let response = app.post(&format!("/api/undo/{id}")).await;
    let json: Value = response.json();
    assert_eq!(json["undone"], true);
}

#[tokio::test]
async fn test_paint_outside_grid_is_noop() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;
    let (a, _) = two_indices(&app, &id).await;

    let response = app
        .post_json(
            &format!("/api/cell/{id}"),
            &format!(r#"{{"x": 20, "y": 0, "index": {a}}}"#),
        )
        .await;
    assert!(!common::assert_edit(&response));
}

#[tokio::test]
async fn test_region_replace_whole_chart() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;
    let before = app.palette(&id).await;
    let (a, b) = two_indices(&app, &id).await;
    let a_count = before[0]["count"].as_u64().unwrap();
    let b_count = before[1]["count"].as_u64().unwrap();

    let response = app
        .post_json(
            &format!("/api/region/{id}"),
            &format!(r#"{{"x": 0, "y": 0, "w": 1000, "h": 1000, "from": {a}, "to": {b}}}"#),
        )
        .await;
    assert!(common::assert_edit(&response));

    let after = app.palette(&id).await;
    assert!(after.iter().all(|e| e["index"].as_u64() != Some(a)));
    let b_entry = after
        .iter()
        .find(|e| e["index"].as_u64() == Some(b))
        .unwrap();
    assert_eq!(b_entry["count"].as_u64().unwrap(), a_count + b_count);
}

#[tokio::test]
async fn test_region_outside_grid_is_noop() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;
    let (a, b) = two_indices(&app, &id).await;

    let response = app
        .post_json(
            &format!("/api/region/{id}"),
            &format!(r#"{{"x": 50, "y": 0, "w": 5, "h": 5, "from": {a}, "to": {b}}}"#),
        )
        .await;
    assert!(!common::assert_edit(&response));
}

#[tokio::test]
async fn test_grid_base64_dimensions() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;

    let response = app.get(&format!("/api/grid/{id}")).await;
    common::assert_ok(&response);
    let image = decode_grid(&response.json());
    assert_eq!(image.dimensions(), (CANVAS_W, CANVAS_H));

    // margins stay white
    assert_eq!(image.get_pixel(2, 2).0, [255, 255, 255]);
}

#[tokio::test]
async fn test_grid_zoom_scales_output() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;

    app.post_json(&format!("/api/params/{id}"), r#"{"zoom": 2.0}"#)
        .await;
    let response = app.get(&format!("/api/grid/{id}")).await;
    let image = decode_grid(&response.json());
    assert_eq!(image.dimensions(), (CANVAS_W * 2, CANVAS_H * 2));

    // zoom is clamped to 8
    app.post_json(&format!("/api/params/{id}"), r#"{"zoom": 50}"#)
        .await;
    let response = app.get(&format!("/api/grid/{id}")).await;
    let image = decode_grid(&response.json());
    assert_eq!(image.dimensions(), (CANVAS_W * 8, CANVAS_H * 8));
}

#[tokio::test]
async fn test_absurd_gauge_is_clamped() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;

    // 1/100 stitches per row: the tallest cells allowed
    let response = app
        .post_json(
            &format!("/api/params/{id}"),
            r#"{"gauge_stitches": 0.0001, "gauge_rows": 1000000}"#,
        )
        .await;
    common::assert_ok(&response);
    let response = app.get(&format!("/api/grid/{id}")).await;
    common::assert_ok(&response);
    let image = decode_grid(&response.json());
    assert_eq!(image.dimensions(), (CANVAS_W, MARGIN + 10 * 22 * 100 + PAD));

    // The opposite extreme stretches the next chart to 100 rows per stitch
    app.post_json(
        &format!("/api/params/{id}"),
        r#"{"gauge_stitches": 1000000, "gauge_rows": 0.0001}"#,
    )
    .await;
    let response = app.post(&format!("/api/generate/{id}")).await;
    common::assert_ok(&response);
    let json: Value = response.json();
    assert_eq!(json["width"], 20);
    assert_eq!(json["height"], 1000);

    let response = app.get(&format!("/api/grid/{id}/png")).await;
    common::assert_png(&response);
}

#[tokio::test]
async fn test_grid_without_lines_matches_cell_colors() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;

    app.post_json(&format!("/api/params/{id}"), r#"{"show_grid": false}"#)
        .await;
    let response = app.get(&format!("/api/grid/{id}")).await;
    let image = decode_grid(&response.json());
    assert_eq!(image.dimensions(), (CANVAS_W, CANVAS_H));

    let palette = app.palette(&id).await;
    let hexes: Vec<String> = palette
        .iter()
        .map(|e| e["hex"].as_str().unwrap().to_string())
        .collect();
    // every cell center shows a palette color
    for row in 0..10 {
        for col in 0..20 {
            let [r, g, b] = image
                .get_pixel(MARGIN + col * 22 + 11, MARGIN + row * 22 + 11)
                .0;
            let hex = format!("#{r:02x}{g:02x}{b:02x}");
            assert!(hexes.contains(&hex), "cell ({col},{row}) has {hex}");
        }
    }
}

#[tokio::test]
async fn test_grid_png_route() {
    let app = TestApp::new().await;
    let id = app.generated_session().await;

    let response = app.get(&format!("/api/grid/{id}/png")).await;
    common::assert_png(&response);
    let disposition = response
        .headers
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(disposition.contains(&id));
}

#[tokio::test]
async fn test_grid_png_requires_chart() {
    let app = TestApp::new().await;
    let id = app.create_session().await;

    let response = app.get(&format!("/api/grid/{id}/png")).await;
    common::assert_error(&response, StatusCode::CONFLICT);
}
