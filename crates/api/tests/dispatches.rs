//! Integration tests for the `/dispatches` endpoints: creation conflicts,
//! the accept race surface, transition guards, and the end-to-end status
//! projection onto reports.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use serde_json::json;
use sqlx::PgPool;

use bantay_db::repositories::ReportRepo;
use bantay_events::ReportStatusProjector;

/// Wait until the report's status reaches `expected` (the projector runs
/// asynchronously behind the event bus).
async fn wait_for_report_status(pool: &PgPool, report_id: i64, expected: &str) {
    for _ in 0..100 {
        let report = ReportRepo::find_by_id(pool, report_id)
            .await
            .unwrap()
            .unwrap();
        if report.status == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("report {report_id} never reached status '{expected}'");
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn creating_a_dispatch_requires_an_assigned_station(pool: PgPool) {
    let report = common::seed_report(&pool, &["Theft"], 7.5, 125.5, None).await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/dispatches",
        json!({ "report_id": report.report_id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_dispatch_for_a_report_returns_409(pool: PgPool) {
    let station = common::seed_station(&pool, "Station 1").await;
    let report = common::seed_report(&pool, &["Theft"], 7.5, 125.5, Some(station.station_id)).await;

    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/dispatches",
        json!({ "report_id": report.report_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["report_id"], report.report_id);
    assert_eq!(body["data"]["time_remaining"], 180);
    assert_eq!(body["data"]["is_overdue"], false);

    let response = post_json(
        app,
        "/api/v1/dispatches",
        json!({ "report_id": report.report_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "ACTIVE_DISPATCH_EXISTS");
    assert_eq!(body["error"], "This report already has an active dispatch");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn targeted_dispatch_rejects_officers_from_other_stations(pool: PgPool) {
    let station = common::seed_station(&pool, "Station 1").await;
    let other_station = common::seed_station(&pool, "Station 2").await;
    let outsider = common::seed_officer(&pool, "PO1 Cruz", other_station.station_id).await;
    let report = common::seed_report(&pool, &["Theft"], 7.5, 125.5, Some(station.station_id)).await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/dispatches",
        json!({ "report_id": report.report_id, "officer_id": outsider.id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["code"], "FORBIDDEN");
}

// ---------------------------------------------------------------------------
// Accept
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn accept_is_first_come_first_served(pool: PgPool) {
    let station = common::seed_station(&pool, "Station 1").await;
    let first = common::seed_officer(&pool, "PO1 Cruz", station.station_id).await;
    let second = common::seed_officer(&pool, "PO2 Reyes", station.station_id).await;
    let report = common::seed_report(&pool, &["Theft"], 7.5, 125.5, Some(station.station_id)).await;

    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/dispatches",
        json!({ "report_id": report.report_id }),
    )
    .await;
    let body = body_json(response).await;
    let dispatch_id = body["data"]["dispatch_id"].as_i64().unwrap();

    let response = post_json(
        app.clone(),
        &format!("/api/v1/dispatches/{dispatch_id}/accept"),
        json!({ "officer_id": first.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["patrol_officer_id"], first.id);
    assert!(body["data"]["accepted_at"].is_string());
    assert!(body["data"]["acceptance_time"].as_i64().unwrap() >= 0);

    // The loser of the race gets the dedicated conflict.
    let response = post_json(
        app,
        &format!("/api/v1/dispatches/{dispatch_id}/accept"),
        json!({ "officer_id": second.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "ALREADY_ACCEPTED");
    assert_eq!(body["error"], "Dispatch already accepted by another officer");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn accept_by_an_officer_of_another_station_is_forbidden(pool: PgPool) {
    let station = common::seed_station(&pool, "Station 1").await;
    let other_station = common::seed_station(&pool, "Station 2").await;
    let outsider = common::seed_officer(&pool, "PO1 Cruz", other_station.station_id).await;
    let report = common::seed_report(&pool, &["Theft"], 7.5, 125.5, Some(station.station_id)).await;

    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/dispatches",
        json!({ "report_id": report.report_id }),
    )
    .await;
    let body = body_json(response).await;
    let dispatch_id = body["data"]["dispatch_id"].as_i64().unwrap();

    let response = post_json(
        app,
        &format!("/api/v1/dispatches/{dispatch_id}/accept"),
        json!({ "officer_id": outsider.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Transition guards over HTTP
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_order_transitions_return_409(pool: PgPool) {
    let station = common::seed_station(&pool, "Station 1").await;
    let officer = common::seed_officer(&pool, "PO1 Cruz", station.station_id).await;
    let report = common::seed_report(&pool, &["Theft"], 7.5, 125.5, Some(station.station_id)).await;

    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/dispatches",
        json!({ "report_id": report.report_id }),
    )
    .await;
    let body = body_json(response).await;
    let dispatch_id = body["data"]["dispatch_id"].as_i64().unwrap();

    // Verifying a dispatch that was never accepted.
    let response = post_json(
        app.clone(),
        &format!("/api/v1/dispatches/{dispatch_id}/verify"),
        json!({ "officer_id": officer.id, "is_valid": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_TRANSITION");

    // Accept, then try to mark arrival without going en route.
    let response = post_json(
        app.clone(),
        &format!("/api/v1/dispatches/{dispatch_id}/accept"),
        json!({ "officer_id": officer.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        app,
        &format!("/api/v1/dispatches/{dispatch_id}/arrived"),
        json!({ "officer_id": officer.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelling_twice_returns_409(pool: PgPool) {
    let station = common::seed_station(&pool, "Station 1").await;
    let admin = common::seed_station_admin(&pool, "Desk Admin", station.station_id).await;
    let report = common::seed_report(&pool, &["Theft"], 7.5, 125.5, Some(station.station_id)).await;

    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/dispatches",
        json!({ "report_id": report.report_id }),
    )
    .await;
    let body = body_json(response).await;
    let dispatch_id = body["data"]["dispatch_id"].as_i64().unwrap();

    let response = post_json(
        app.clone(),
        &format!("/api/v1/dispatches/{dispatch_id}/cancel"),
        json!({ "cancelled_by": admin.id, "reason": "duplicate report" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["cancellation_reason"], "duplicate report");

    let response = post_json(
        app,
        &format!("/api/v1/dispatches/{dispatch_id}/cancel"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_dispatch_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/dispatches/9999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// End-to-end projection
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn lifecycle_projects_status_onto_the_report(pool: PgPool) {
    let station = common::seed_station(&pool, "Station 1").await;
    let officer = common::seed_officer(&pool, "PO1 Cruz", station.station_id).await;
    let report = common::seed_report(&pool, &["Theft"], 7.5, 125.5, Some(station.station_id)).await;

    let (app, bus) = common::build_test_app_with_bus(pool.clone());
    tokio::spawn(ReportStatusProjector::run(pool.clone(), bus.subscribe()));

    let response = post_json(
        app.clone(),
        "/api/v1/dispatches",
        json!({ "report_id": report.report_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let dispatch_id = body["data"]["dispatch_id"].as_i64().unwrap();
    wait_for_report_status(&pool, report.report_id, "dispatched").await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/dispatches/{dispatch_id}/accept"),
        json!({ "officer_id": officer.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    wait_for_report_status(&pool, report.report_id, "investigating").await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/dispatches/{dispatch_id}/en-route"),
        json!({ "officer_id": officer.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        app.clone(),
        &format!("/api/v1/dispatches/{dispatch_id}/arrived"),
        json!({ "officer_id": officer.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["within_sla"], true);
    assert_eq!(body["data"]["time_remaining"], 0);

    let response = post_json(
        app,
        &format!("/api/v1/dispatches/{dispatch_id}/verify"),
        json!({
            "officer_id": officer.id,
            "is_valid": false,
            "validation_notes": "No incident found at the scene"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["is_valid"], false);

    wait_for_report_status(&pool, report.report_id, "invalid").await;
    let stored = ReportRepo::find_by_id(&pool, report.report_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.is_valid, Some(false));
    assert!(stored.validated_at.is_some());
}
