//! Handlers for the `/reports` resource.
//!
//! Report submission itself is an external concern; these endpoints cover
//! the station assignment decision and role-scoped reads.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use bantay_core::assignment::{self, Assignment, AssignmentInput};
use bantay_core::error::CoreError;
use bantay_core::roles::ROLE_SUPER_ADMIN;
use bantay_core::types::DbId;
use bantay_db::models::report::{Report, ReportListQuery};
use bantay_db::models::user::User;
use bantay_db::repositories::{BarangayRepo, ReportRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the acting user or fail with 404.
async fn load_actor(pool: &sqlx::PgPool, actor_id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(pool, actor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: actor_id,
        }))
}

/// Whether the actor may see this report.
///
/// Super-admins see everything. Everyone else is station-scoped, which makes
/// unassigned reports invisible to them.
fn can_view(actor: &User, report: &Report) -> bool {
    if actor.role == ROLE_SUPER_ADMIN {
        return true;
    }
    match (actor.station_id, report.assigned_station_id) {
        (Some(actor_station), Some(report_station)) => actor_station == report_station,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Assign station
// ---------------------------------------------------------------------------

/// Query parameters naming the acting user.
#[derive(Debug, Deserialize)]
pub struct ActorQuery {
    pub actor_id: DbId,
}

/// Response payload for the assignment endpoint: the decision plus the
/// report as persisted afterwards.
#[derive(Debug, Serialize)]
pub struct AssignStationResponse {
    pub assignment: Assignment,
    pub report: Report,
}

/// POST /api/v1/reports/{id}/assign-station
///
/// Run the assignment engine over the report and persist the outcome. The
/// decision is recomputed from scratch on every call; an unassigned outcome
/// clears any previous assignment.
pub async fn assign_station(
    State(state): State<AppState>,
    Path(report_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = ReportRepo::find_by_id(&state.pool, report_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id: report_id,
        }))?;

    let index = BarangayRepo::load_index(&state.pool).await?;

    let input = AssignmentInput {
        report_id: report.report_id,
        latitude: report.latitude,
        longitude: report.longitude,
        crime_types: &report.crime_types,
        barangay_id: report.barangay_id,
    };
    let assignment = assignment::assign(&input, &index);

    if assignment == Assignment::Unassigned {
        tracing::warn!(
            report_id,
            latitude = report.latitude,
            longitude = report.longitude,
            "Report could not be assigned to any station",
        );
    }

    let updated = ReportRepo::set_assigned_station(&state.pool, report_id, assignment.station_id())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id: report_id,
        }))?;

    tracing::info!(
        report_id,
        station_id = ?assignment.station_id(),
        "Station assignment recorded",
    );

    Ok(Json(DataResponse {
        data: AssignStationResponse {
            assignment,
            report: updated,
        },
    }))
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /api/v1/reports
///
/// List reports visible to the acting user (`actor_id` query parameter).
/// Super-admins see all reports including unassigned ones; station-scoped
/// users see only reports assigned to their station.
pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<ReportListQuery>,
) -> AppResult<impl IntoResponse> {
    let actor = load_actor(&state.pool, params.actor_id).await?;
    let reports = ReportRepo::list_visible_to(&state.pool, &actor, &params).await?;

    Ok(Json(DataResponse { data: reports }))
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

/// GET /api/v1/reports/{id}
///
/// Get a single report, subject to the same visibility rules as listing.
/// A report outside the actor's scope reads as 404, not 403, so its
/// existence is not leaked.
pub async fn get_report(
    State(state): State<AppState>,
    Path(report_id): Path<DbId>,
    Query(params): Query<ActorQuery>,
) -> AppResult<impl IntoResponse> {
    let actor = load_actor(&state.pool, params.actor_id).await?;

    let report = ReportRepo::find_by_id(&state.pool, report_id)
        .await?
        .filter(|report| can_view(&actor, report))
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id: report_id,
        }))?;

    Ok(Json(DataResponse { data: report }))
}
