//! Shared helpers for the API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use bantay_api::config::ServerConfig;
use bantay_api::router::build_app_router;
use bantay_api::state::AppState;
use bantay_core::roles::{ROLE_ADMIN, ROLE_PATROL_OFFICER, ROLE_SUPER_ADMIN};
use bantay_core::types::DbId;
use bantay_db::models::report::{CreateReport, Report};
use bantay_db::models::station::{CreateStation, PoliceStation};
use bantay_db::models::user::{CreateUser, User};
use bantay_db::repositories::{ReportRepo, StationRepo, UserRepo};
use bantay_events::EventBus;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This goes through [`build_app_router`] so integration tests exercise the
/// same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_bus(pool).0
}

/// Like [`build_test_app`], but also hands back the event bus so a test can
/// subscribe (e.g. to drive the status projector).
pub fn build_test_app_with_bus(pool: PgPool) -> (Router, Arc<EventBus>) {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };

    (build_app_router(state, &config), event_bus)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seeding helpers
// ---------------------------------------------------------------------------

pub async fn seed_station(pool: &PgPool, name: &str) -> PoliceStation {
    StationRepo::create(
        pool,
        &CreateStation {
            station_name: name.to_string(),
            address: None,
            contact_number: None,
        },
    )
    .await
    .expect("seed station")
}

pub async fn seed_user(pool: &PgPool, name: &str, role: &str, station_id: Option<DbId>) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            display_name: name.to_string(),
            role: role.to_string(),
            station_id,
            is_on_duty: true,
        },
    )
    .await
    .expect("seed user")
}

pub async fn seed_officer(pool: &PgPool, name: &str, station_id: DbId) -> User {
    seed_user(pool, name, ROLE_PATROL_OFFICER, Some(station_id)).await
}

pub async fn seed_super_admin(pool: &PgPool, name: &str) -> User {
    seed_user(pool, name, ROLE_SUPER_ADMIN, None).await
}

pub async fn seed_station_admin(pool: &PgPool, name: &str, station_id: DbId) -> User {
    seed_user(pool, name, ROLE_ADMIN, Some(station_id)).await
}

/// Insert a report with the given tags and coordinates, optionally recording
/// a station assignment.
pub async fn seed_report(
    pool: &PgPool,
    crime_types: &[&str],
    latitude: f64,
    longitude: f64,
    assigned_station_id: Option<DbId>,
) -> Report {
    let report = ReportRepo::create(
        pool,
        &CreateReport {
            reporter_id: None,
            title: Some("Incident report".to_string()),
            crime_types: crime_types.iter().map(|s| s.to_string()).collect(),
            latitude,
            longitude,
            barangay_id: None,
        },
    )
    .await
    .expect("seed report");

    match assigned_station_id {
        Some(station_id) => ReportRepo::set_assigned_station(pool, report.report_id, Some(station_id))
            .await
            .expect("assign station")
            .expect("report exists"),
        None => report,
    }
}
