//! Shared seeding helpers for the database integration tests.

#![allow(dead_code)]

use sqlx::PgPool;

use bantay_core::roles::{ROLE_PATROL_OFFICER, ROLE_SUPER_ADMIN};
use bantay_core::types::DbId;
use bantay_db::models::barangay::{Barangay, CreateBarangay};
use bantay_db::models::report::{CreateReport, Report};
use bantay_db::models::station::{CreateStation, PoliceStation};
use bantay_db::models::user::{CreateUser, User};
use bantay_db::repositories::{BarangayRepo, ReportRepo, StationRepo, UserRepo};

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

pub async fn seed_officer(pool: &PgPool, name: &str, station_id: DbId) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            display_name: name.to_string(),
            role: ROLE_PATROL_OFFICER.to_string(),
            station_id: Some(station_id),
            is_on_duty: true,
        },
    )
    .await
    .expect("seed officer")
}

pub async fn seed_super_admin(pool: &PgPool, name: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            display_name: name.to_string(),
            role: ROLE_SUPER_ADMIN.to_string(),
            station_id: None,
            is_on_duty: false,
        },
    )
    .await
    .expect("seed super admin")
}

pub async fn seed_user(pool: &PgPool, name: &str, role: &str, station_id: Option<DbId>) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            display_name: name.to_string(),
            role: role.to_string(),
            station_id,
            is_on_duty: false,
        },
    )
    .await
    .expect("seed user")
}

/// Insert a report and optionally record a station assignment on it.
pub async fn seed_report(pool: &PgPool, assigned_station_id: Option<DbId>) -> Report {
    let report = ReportRepo::create(
        pool,
        &CreateReport {
            reporter_id: None,
            title: Some("Snatching near the market".to_string()),
            crime_types: vec!["Theft".to_string()],
            latitude: 7.07,
            longitude: 125.61,
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

/// Insert a barangay with a square GeoJSON boundary spanning one degree from
/// `(lat, lng)`.
pub async fn seed_barangay_square(
    pool: &PgPool,
    name: &str,
    station_id: Option<DbId>,
    lat: f64,
    lng: f64,
) -> Barangay {
    let boundary = serde_json::json!({
        "type": "Polygon",
        "coordinates": [[
            [lng, lat],
            [lng + 1.0, lat],
            [lng + 1.0, lat + 1.0],
            [lng, lat + 1.0],
            [lng, lat]
        ]]
    });
    BarangayRepo::create(
        pool,
        &CreateBarangay {
            barangay_name: name.to_string(),
            station_id,
            boundary_polygon: Some(boundary),
        },
    )
    .await
    .expect("seed barangay")
}
