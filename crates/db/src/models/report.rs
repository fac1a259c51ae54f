//! Report entity models and DTOs.
//!
//! Reports are created by the (external) submission flow; this core reads
//! their coordinates and crime-type tags, writes `assigned_station_id`, and
//! the status projector later mutates `status` / `is_valid`.

use bantay_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub report_id: DbId,
    pub reporter_id: Option<DbId>,
    pub title: Option<String>,
    /// Crime-type tags, non-empty for a valid report.
    pub crime_types: Json<Vec<String>>,
    pub latitude: f64,
    pub longitude: f64,
    /// Submitter-declared barangay, trusted over geometric detection.
    pub barangay_id: Option<DbId>,
    pub assigned_station_id: Option<DbId>,
    pub status: String,
    pub is_valid: Option<bool>,
    pub validated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a report (exercised by tests; production rows come from
/// the out-of-scope submission service writing the same table).
#[derive(Debug, Deserialize)]
pub struct CreateReport {
    pub reporter_id: Option<DbId>,
    pub title: Option<String>,
    pub crime_types: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub barangay_id: Option<DbId>,
}

/// Query parameters for `GET /api/v1/reports`.
#[derive(Debug, Deserialize)]
pub struct ReportListQuery {
    /// Acting user; visibility is derived from their role and station.
    pub actor_id: DbId,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
