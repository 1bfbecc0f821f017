use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use electrifind::web::{create_router, AppState};

use crate::helpers::test_harness::TestHarness;

async fn router() -> Result<Router> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;
    Ok(create_router(AppState::new(Arc::new(engine), harness.config.clone())))
}

async fn post_json(app: Router, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?;
    let response = app.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

async fn get(app: Router, uri: &str) -> Result<(StatusCode, Vec<u8>)> {
    let request = Request::get(uri).body(Body::empty())?;
    let response = app.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, bytes.to_vec()))
}

#[tokio::test]
async fn test_search_by_distance() -> Result<()> {
    let (status, body) = post_json(
        router().await?,
        "/api/search",
        json!({"lat": "42.30", "lng": "-83.72", "sort": "distance", "radius": "small"}),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "distance");
    assert_eq!(body["total"], 3);

    let names: Vec<&str> = body["stations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["station_name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Fuller Road Supercharger", "Briarwood Mall DC Fast", "Downtown Library"]
    );
    assert_eq!(body["stations"][0]["ev_network"], "Tesla");
    assert_eq!(body["stations"][0]["latitude"], 42.301);

    Ok(())
}

#[tokio::test]
async fn test_search_with_numeric_fields_and_limit() -> Result<()> {
    let (status, body) = post_json(
        router().await?,
        "/api/search",
        json!({
            "lat": 42.30,
            "lng": -83.72,
            "sort": "cf",
            "radius": "large",
            "prompt": "tesla",
            "user_id": 2,
            "limit": 2
        }),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "cf");
    assert_eq!(body["total"], 5);
    assert_eq!(body["stations"].as_array().unwrap().len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_search_validation_errors() -> Result<()> {
    let cases = [
        (
            json!({"sort": "distance", "radius": "small"}),
            "Latitude and Longitude are required.",
        ),
        (
            json!({"lat": "42.30", "lng": "-83.72", "radius": "small"}),
            "Invalid sort mode",
        ),
        (
            json!({"lat": "42.30", "lng": "-83.72", "sort": "distance", "radius": "huge"}),
            "Invalid radius",
        ),
        (
            json!({"lat": "42.30", "lng": "-83.72", "sort": "cf", "radius": "small", "prompt": "tesla", "user_id": "-1"}),
            "User ID is required for collaborative filtering.",
        ),
        (
            json!({"lat": "42.30", "lng": "-83.72", "sort": "base", "radius": "small", "prompt": ""}),
            "prompt is required",
        ),
    ];

    for (request, message) in cases {
        let (status, body) = post_json(router().await?, "/api/search", request).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains(message), "{} should mention {}", error, message);
    }

    Ok(())
}

#[tokio::test]
async fn test_search_with_no_stations_nearby() -> Result<()> {
    let (status, body) = post_json(
        router().await?,
        "/api/search",
        json!({"lat": "43.5", "lng": "-87.0", "sort": "base", "radius": "large", "prompt": "fast"}),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert!(body["stations"].as_array().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_station_lookup() -> Result<()> {
    let app = router().await?;

    let (status, bytes) = get(app.clone(), "/api/stations/3").await?;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["id"], 3);
    assert_eq!(body["street_address"], "100 Briarwood Cir");

    let (status, bytes) = get(app, "/api/stations/404").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["error"], "Station 404 not found");

    Ok(())
}

#[tokio::test]
async fn test_station_batch_keeps_order() -> Result<()> {
    let (status, body) =
        post_json(router().await?, "/api/stations", json!({"ids": [4, 2, 6]})).await?;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![4, 2, 6]);

    Ok(())
}

#[tokio::test]
async fn test_client_config() -> Result<()> {
    let (status, bytes) = get(router().await?, "/api/config").await?;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["modes"], json!(["distance", "base", "cf"]));
    assert_eq!(body["radius"]["small"], 0.01);
    assert_eq!(body["default_mode"], "distance");

    Ok(())
}

#[tokio::test]
async fn test_health_and_metrics() -> Result<()> {
    electrifind::metrics::register_metrics();
    let app = router().await?;

    let (status, bytes) = get(app.clone(), "/health").await?;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["stations"], 7);

    let (status, bytes) = get(app, "/metrics").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(bytes)?.contains("electrifind_indexed_stations"));

    Ok(())
}
