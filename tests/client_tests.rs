//! Metrics API client against a local fake upstream

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde_json::json;
use tokio::net::TcpListener;
use uuid::Uuid;

use volcast::config::UpstreamSettings;
use volcast::error::ClientError;
use volcast::models::Sport;
use volcast::Vo2Client;

const ATHLETE: &str = "c263ed11-624f-43c8-a217-666ae8427dbb";
const UNKNOWN_ATHLETE: &str = "00000000-0000-0000-0000-000000000404";
const BROKEN_ATHLETE: &str = "00000000-0000-0000-0000-000000000500";

/// Raw query and API key of the last request the fake upstream saw
#[derive(Default)]
struct Seen {
    query: Option<String>,
    api_key: Option<String>,
}

type Shared = Arc<Mutex<Seen>>;

fn record(seen: &Shared, uri: &Uri, headers: &HeaderMap) {
    let mut seen = seen.lock().unwrap();
    seen.query = uri.query().map(str::to_string);
    seen.api_key = headers
        .get("x-vo2-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
}

async fn volume(
    State(seen): State<Shared>,
    Path(athlete): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    record(&seen, &uri, &headers);
    Json(json!({
        "data": {
            "running": [{
                "period": "2024-W02",
                "activityCount": 3,
                "totalDistanceMeters": 21000.0,
                "totalElapsedTimeSeconds": 7800.0,
                "totalMovingTimeSeconds": 7500.0,
                "totalElevationGainMeters": 210.0
            }]
        },
        "frequency": "week",
        "provider": "strava",
        "sports": ["running", "cycling"],
        "startDate": "2024-01-01",
        "userId": athlete
    }))
    .into_response()
}

async fn running_ytd(
    State(seen): State<Shared>,
    Path(athlete): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    record(&seen, &uri, &headers);
    match athlete.as_str() {
        UNKNOWN_ATHLETE => (StatusCode::NOT_FOUND, Json(json!({ "error": "Athlete not found" }))).into_response(),
        BROKEN_ATHLETE => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => Json(json!({
            "athleteId": athlete,
            "volume": {
                "totalDistanceMeters": 412345.0,
                "totalMovingTimeSeconds": 151200.0,
                "totalElevationGainMeters": 5230.4
            }
        }))
        .into_response(),
    }
}

async fn spawn_upstream() -> (SocketAddr, Shared) {
    let seen = Shared::default();
    let app = Router::new()
        .route("/v1/athletes/:athlete/metrics/volume", get(volume))
        .route("/v1/athletes/:athlete/metrics/running-ytd-volume", get(running_ytd))
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen)
}

fn client_for(addr: SocketAddr) -> Vo2Client {
    let settings = UpstreamSettings {
        base_url: Some(format!("http://{}/v1/", addr)),
        api_key: Some("client-key".to_string()),
        ..UpstreamSettings::default()
    };
    Vo2Client::new(&settings, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_weekly_volume_query_shape() {
    let (addr, seen) = spawn_upstream().await;
    let client = client_for(addr);
    let athlete = Uuid::parse_str(ATHLETE).unwrap();

    let response = client
        .weekly_volume(
            athlete,
            &[Sport::Running, Sport::Cycling],
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.user_id, ATHLETE);
    assert_eq!(response.data[&Sport::Running][0].activity_count, 3);

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen.query.as_deref(),
        Some("provider=strava&frequency=week&sport=running&sport=cycling&startDate=2024-01-01")
    );
    assert_eq!(seen.api_key.as_deref(), Some("client-key"));
}

#[tokio::test]
async fn test_running_ytd() {
    let (addr, seen) = spawn_upstream().await;
    let client = client_for(addr);

    let ytd = client.running_ytd(Uuid::parse_str(ATHLETE).unwrap()).await.unwrap();

    assert_eq!(ytd.athlete_id, ATHLETE);
    assert_eq!(ytd.volume.total_distance_meters, 412345.0);
    assert_eq!(seen.lock().unwrap().query.as_deref(), Some("provider=strava"));
}

#[tokio::test]
async fn test_error_body_message_is_used() {
    let (addr, _) = spawn_upstream().await;
    let client = client_for(addr);

    let err = client
        .running_ytd(Uuid::parse_str(UNKNOWN_ATHLETE).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Status { status: 404, .. }));
    assert_eq!(err.to_string(), "Athlete not found");
}

#[tokio::test]
async fn test_error_without_body_uses_status_line() {
    let (addr, _) = spawn_upstream().await;
    let client = client_for(addr);

    let err = client
        .running_ytd(Uuid::parse_str(BROKEN_ATHLETE).unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
}

#[tokio::test]
async fn test_unknown_route_is_a_status_error() {
    let (addr, _) = spawn_upstream().await;
    let settings = UpstreamSettings {
        base_url: Some(format!("http://{}/other/", addr)),
        api_key: Some("client-key".to_string()),
        ..UpstreamSettings::default()
    };
    let client = Vo2Client::new(&settings, Duration::from_secs(5)).unwrap();

    let err = client.running_ytd(Uuid::parse_str(ATHLETE).unwrap()).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 404, ref message } if message == "HTTP 404: Not Found"));
}
