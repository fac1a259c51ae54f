//! Handlers for the `/dispatches` resource.
//!
//! Lifecycle transitions delegate to the guarded single-statement updates in
//! [`DispatchRepo`]; a `None` from the repository means the guard did not
//! hold, and these handlers translate that into the precise domain error by
//! re-reading the row.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use bantay_core::error::CoreError;
use bantay_core::roles::ROLE_PATROL_OFFICER;
use bantay_core::types::DbId;
use bantay_db::models::dispatch::{
    CreateDispatch, DispatchListQuery, DispatchWithTimers, PatrolDispatch,
};
use bantay_db::models::user::User;
use bantay_db::repositories::{DispatchRepo, ReportRepo, UserRepo};
use bantay_events::bus::{
    DispatchEvent, DISPATCH_ACCEPTED, DISPATCH_ARRIVED, DISPATCH_CANCELLED, DISPATCH_COMPLETED,
    DISPATCH_CREATED, DISPATCH_DECLINED, DISPATCH_EN_ROUTE,
};

use crate::error::{is_active_dispatch_violation, AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Body for transitions performed by the responding officer.
#[derive(Debug, Deserialize)]
pub struct OfficerAction {
    pub officer_id: DbId,
}

/// Body for `POST /dispatches/{id}/decline`.
#[derive(Debug, Deserialize)]
pub struct DeclineRequest {
    pub officer_id: DbId,
    pub reason: Option<String>,
}

/// Body for `POST /dispatches/{id}/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub officer_id: DbId,
    pub is_valid: bool,
    pub validation_notes: Option<String>,
}

/// Body for `POST /dispatches/{id}/cancel`.
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub cancelled_by: Option<DbId>,
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a dispatch by ID or fail with 404.
async fn find_dispatch(pool: &sqlx::PgPool, dispatch_id: DbId) -> AppResult<PatrolDispatch> {
    DispatchRepo::find_by_id(pool, dispatch_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Dispatch",
            id: dispatch_id,
        }))
}

/// Verify the acting user is a patrol officer of the given station.
///
/// `action` is used in the error message (e.g. "accept", "decline").
async fn require_station_officer(
    pool: &sqlx::PgPool,
    officer_id: DbId,
    station_id: DbId,
    action: &str,
) -> AppResult<User> {
    let officer = UserRepo::find_by_id(pool, officer_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: officer_id,
        }))?;

    if officer.role != ROLE_PATROL_OFFICER {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Only patrol officers can {action} dispatches"
        ))));
    }
    if officer.station_id != Some(station_id) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Cannot {action} a dispatch for another station"
        ))));
    }

    Ok(officer)
}

/// Explain a failed claim (accept/decline) by re-reading the row.
///
/// The claim guard fails either because another officer holds the dispatch
/// or because it already left the claimable states.
async fn claim_conflict(pool: &sqlx::PgPool, dispatch_id: DbId, officer_id: DbId) -> AppError {
    match DispatchRepo::find_by_id(pool, dispatch_id).await {
        Ok(Some(dispatch)) => {
            let held_by_other = dispatch
                .patrol_officer_id
                .is_some_and(|id| id != officer_id);
            let terminal = dispatch.status().map(|s| s.is_terminal()).unwrap_or(false);

            if held_by_other && !terminal {
                AppError::Core(CoreError::AlreadyAccepted)
            } else {
                AppError::Core(CoreError::InvalidTransition(format!(
                    "Dispatch is in status '{}'",
                    status_name(&dispatch)
                )))
            }
        }
        Ok(None) => AppError::Core(CoreError::NotFound {
            entity: "Dispatch",
            id: dispatch_id,
        }),
        Err(e) => AppError::Database(e),
    }
}

/// Explain a failed post-claim transition by re-reading the row.
async fn transition_conflict(
    pool: &sqlx::PgPool,
    dispatch_id: DbId,
    officer_id: Option<DbId>,
    action: &str,
) -> AppError {
    match DispatchRepo::find_by_id(pool, dispatch_id).await {
        Ok(Some(dispatch)) => {
            if let Some(officer_id) = officer_id {
                if dispatch.patrol_officer_id != Some(officer_id) {
                    return AppError::Core(CoreError::Forbidden(format!(
                        "Only the responding officer can {action} this dispatch"
                    )));
                }
            }
            AppError::Core(CoreError::InvalidTransition(format!(
                "Cannot {action} a dispatch in status '{}'",
                status_name(&dispatch)
            )))
        }
        Ok(None) => AppError::Core(CoreError::NotFound {
            entity: "Dispatch",
            id: dispatch_id,
        }),
        Err(e) => AppError::Database(e),
    }
}

fn status_name(dispatch: &PatrolDispatch) -> &'static str {
    dispatch.status().map(|s| s.as_str()).unwrap_or("unknown")
}

fn with_timers(dispatch: PatrolDispatch) -> DispatchWithTimers {
    DispatchWithTimers::at(dispatch, Utc::now())
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/dispatches
///
/// Create a dispatch for a report. Requires the report to exist and to have
/// an assigned station; refuses when an active dispatch already exists.
/// With `officer_id` the dispatch is targeted and starts in `assigned`;
/// without it, it is broadcast and starts in `pending`. Returns 201.
pub async fn create_dispatch(
    State(state): State<AppState>,
    Json(input): Json<CreateDispatch>,
) -> AppResult<impl IntoResponse> {
    let report = ReportRepo::find_by_id(&state.pool, input.report_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id: input.report_id,
        }))?;

    let station_id = report.assigned_station_id.ok_or(AppError::Core(
        CoreError::Validation("Report has no assigned station".into()),
    ))?;

    if DispatchRepo::find_active_for_report(&state.pool, input.report_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::ActiveDispatchExists));
    }

    if let Some(officer_id) = input.officer_id {
        require_station_officer(&state.pool, officer_id, station_id, "receive").await?;
    }

    // The pre-check above races with concurrent creates; the partial unique
    // index settles the winner and we translate the loser's violation.
    let dispatch = DispatchRepo::create(&state.pool, station_id, &input)
        .await
        .map_err(|e| {
            if is_active_dispatch_violation(&e) {
                AppError::Core(CoreError::ActiveDispatchExists)
            } else {
                AppError::Database(e)
            }
        })?;

    let mut event = DispatchEvent::new(
        DISPATCH_CREATED,
        dispatch.dispatch_id,
        dispatch.report_id,
    )
    .with_payload(serde_json::json!({ "station_id": station_id }));
    if let Some(actor) = input.dispatched_by {
        event = event.with_actor(actor);
    }
    state.event_bus.publish(event);

    tracing::info!(
        dispatch_id = dispatch.dispatch_id,
        report_id = dispatch.report_id,
        station_id,
        officer_id = ?input.officer_id,
        "Dispatch created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: with_timers(dispatch),
        }),
    ))
}

// ---------------------------------------------------------------------------
// List / Get
// ---------------------------------------------------------------------------

/// GET /api/v1/dispatches
///
/// List dispatches, newest first, with optional `station_id` and
/// `officer_id` filters. `active=true` returns in-flight dispatches,
/// `active=false` the terminal history. Each row carries live
/// `time_remaining` and `is_overdue` timers.
pub async fn list_dispatches(
    State(state): State<AppState>,
    Query(params): Query<DispatchListQuery>,
) -> AppResult<impl IntoResponse> {
    let dispatches = DispatchRepo::list(&state.pool, &params).await?;
    let now = Utc::now();
    let data: Vec<DispatchWithTimers> = dispatches
        .into_iter()
        .map(|d| DispatchWithTimers::at(d, now))
        .collect();

    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/dispatches/{id}
///
/// Get a single dispatch with live SLA timers.
pub async fn get_dispatch(
    State(state): State<AppState>,
    Path(dispatch_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let dispatch = find_dispatch(&state.pool, dispatch_id).await?;
    Ok(Json(DataResponse {
        data: with_timers(dispatch),
    }))
}

// ---------------------------------------------------------------------------
// Accept
// ---------------------------------------------------------------------------

/// POST /api/v1/dispatches/{id}/accept
///
/// Atomically claim the dispatch for the acting officer. Exactly one of N
/// concurrent accepts succeeds; losers get 409. Sets `accepted_at` and the
/// measured `acceptance_time`.
pub async fn accept_dispatch(
    State(state): State<AppState>,
    Path(dispatch_id): Path<DbId>,
    Json(input): Json<OfficerAction>,
) -> AppResult<impl IntoResponse> {
    let dispatch = find_dispatch(&state.pool, dispatch_id).await?;
    require_station_officer(&state.pool, input.officer_id, dispatch.station_id, "accept").await?;

    let Some(updated) = DispatchRepo::accept(&state.pool, dispatch_id, input.officer_id).await?
    else {
        return Err(claim_conflict(&state.pool, dispatch_id, input.officer_id).await);
    };

    state.event_bus.publish(
        DispatchEvent::new(DISPATCH_ACCEPTED, updated.dispatch_id, updated.report_id)
            .with_actor(input.officer_id)
            .with_payload(serde_json::json!({ "acceptance_time": updated.acceptance_time })),
    );

    tracing::info!(
        dispatch_id,
        officer_id = input.officer_id,
        acceptance_time = ?updated.acceptance_time,
        "Dispatch accepted",
    );

    Ok(Json(DataResponse {
        data: with_timers(updated),
    }))
}

// ---------------------------------------------------------------------------
// Decline
// ---------------------------------------------------------------------------

/// POST /api/v1/dispatches/{id}/decline
///
/// Decline a still-claimable dispatch. Terminal for this dispatch; the
/// report becomes dispatchable again.
pub async fn decline_dispatch(
    State(state): State<AppState>,
    Path(dispatch_id): Path<DbId>,
    Json(input): Json<DeclineRequest>,
) -> AppResult<impl IntoResponse> {
    let dispatch = find_dispatch(&state.pool, dispatch_id).await?;
    require_station_officer(&state.pool, input.officer_id, dispatch.station_id, "decline").await?;

    let Some(updated) = DispatchRepo::decline(
        &state.pool,
        dispatch_id,
        input.officer_id,
        input.reason.as_deref(),
    )
    .await?
    else {
        return Err(claim_conflict(&state.pool, dispatch_id, input.officer_id).await);
    };

    state.event_bus.publish(
        DispatchEvent::new(DISPATCH_DECLINED, updated.dispatch_id, updated.report_id)
            .with_actor(input.officer_id),
    );

    tracing::info!(dispatch_id, officer_id = input.officer_id, "Dispatch declined");

    Ok(Json(DataResponse {
        data: with_timers(updated),
    }))
}

// ---------------------------------------------------------------------------
// En route
// ---------------------------------------------------------------------------

/// POST /api/v1/dispatches/{id}/en-route
///
/// The responding officer departed for the scene.
pub async fn mark_en_route(
    State(state): State<AppState>,
    Path(dispatch_id): Path<DbId>,
    Json(input): Json<OfficerAction>,
) -> AppResult<impl IntoResponse> {
    let Some(updated) =
        DispatchRepo::mark_en_route(&state.pool, dispatch_id, input.officer_id).await?
    else {
        return Err(transition_conflict(
            &state.pool,
            dispatch_id,
            Some(input.officer_id),
            "depart for",
        )
        .await);
    };

    state.event_bus.publish(
        DispatchEvent::new(DISPATCH_EN_ROUTE, updated.dispatch_id, updated.report_id)
            .with_actor(input.officer_id),
    );

    tracing::info!(dispatch_id, officer_id = input.officer_id, "Dispatch en route");

    Ok(Json(DataResponse {
        data: with_timers(updated),
    }))
}

// ---------------------------------------------------------------------------
// Arrived
// ---------------------------------------------------------------------------

/// POST /api/v1/dispatches/{id}/arrived
///
/// The responding officer is on scene. Settles the three-minute rule:
/// `response_time`, `within_sla`, and `sla_time_secs` are written once and
/// never recomputed.
pub async fn mark_arrived(
    State(state): State<AppState>,
    Path(dispatch_id): Path<DbId>,
    Json(input): Json<OfficerAction>,
) -> AppResult<impl IntoResponse> {
    let Some(updated) =
        DispatchRepo::mark_arrived(&state.pool, dispatch_id, input.officer_id).await?
    else {
        return Err(transition_conflict(
            &state.pool,
            dispatch_id,
            Some(input.officer_id),
            "mark arrival on",
        )
        .await);
    };

    state.event_bus.publish(
        DispatchEvent::new(DISPATCH_ARRIVED, updated.dispatch_id, updated.report_id)
            .with_actor(input.officer_id)
            .with_payload(serde_json::json!({
                "response_time": updated.response_time,
                "within_sla": updated.within_sla,
            })),
    );

    tracing::info!(
        dispatch_id,
        officer_id = input.officer_id,
        response_time = ?updated.response_time,
        within_sla = ?updated.within_sla,
        "Dispatch arrived on scene",
    );

    Ok(Json(DataResponse {
        data: with_timers(updated),
    }))
}

// ---------------------------------------------------------------------------
// Verify
// ---------------------------------------------------------------------------

/// POST /api/v1/dispatches/{id}/verify
///
/// Record the officer's field verdict and complete the dispatch. Terminal.
/// The verdict is projected onto the report by the status projector.
pub async fn verify_dispatch(
    State(state): State<AppState>,
    Path(dispatch_id): Path<DbId>,
    Json(input): Json<VerifyRequest>,
) -> AppResult<impl IntoResponse> {
    let Some(updated) = DispatchRepo::verify(
        &state.pool,
        dispatch_id,
        input.officer_id,
        input.is_valid,
        input.validation_notes.as_deref(),
    )
    .await?
    else {
        return Err(transition_conflict(
            &state.pool,
            dispatch_id,
            Some(input.officer_id),
            "verify",
        )
        .await);
    };

    state.event_bus.publish(
        DispatchEvent::new(DISPATCH_COMPLETED, updated.dispatch_id, updated.report_id)
            .with_actor(input.officer_id)
            .with_payload(serde_json::json!({ "is_valid": input.is_valid })),
    );

    tracing::info!(
        dispatch_id,
        officer_id = input.officer_id,
        is_valid = input.is_valid,
        "Dispatch completed with field verdict",
    );

    Ok(Json(DataResponse {
        data: with_timers(updated),
    }))
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

/// POST /api/v1/dispatches/{id}/cancel
///
/// Cancel the dispatch from any active status. Terminal; no SLA fields are
/// computed.
pub async fn cancel_dispatch(
    State(state): State<AppState>,
    Path(dispatch_id): Path<DbId>,
    Json(input): Json<CancelRequest>,
) -> AppResult<impl IntoResponse> {
    let Some(updated) = DispatchRepo::cancel(
        &state.pool,
        dispatch_id,
        input.cancelled_by,
        input.reason.as_deref(),
    )
    .await?
    else {
        return Err(transition_conflict(&state.pool, dispatch_id, None, "cancel").await);
    };

    let mut event =
        DispatchEvent::new(DISPATCH_CANCELLED, updated.dispatch_id, updated.report_id);
    if let Some(actor) = input.cancelled_by {
        event = event.with_actor(actor);
    }
    state.event_bus.publish(event);

    tracing::info!(dispatch_id, cancelled_by = ?input.cancelled_by, "Dispatch cancelled");

    Ok(Json(DataResponse {
        data: with_timers(updated),
    }))
}
