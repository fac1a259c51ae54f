//! Repository for the `patrol_dispatches` table.
//!
//! Every lifecycle transition is one conditional `UPDATE ... WHERE <guard>
//! RETURNING` statement. A `None` result means the guard did not hold (the
//! row was in another state, or another officer won the claim) and nothing
//! was written; callers translate that into the appropriate domain error.
//! The single-active-dispatch-per-report invariant is enforced by the
//! `uq_patrol_dispatches_active_report` partial unique index, so two
//! concurrent creates cannot both slip past the pre-check.

use sqlx::PgPool;

use bantay_core::sla::RESPONSE_SLA_SECS;
use bantay_core::status::{DispatchStatus, ACTIVE_STATUSES, TERMINAL_STATUSES};
use bantay_core::types::DbId;

use crate::models::dispatch::{CreateDispatch, DispatchListQuery, PatrolDispatch};

/// Column list for `patrol_dispatches` queries.
const COLUMNS: &str = "\
    dispatch_id, report_id, station_id, patrol_officer_id, status_id, \
    dispatched_at, accepted_at, declined_at, en_route_at, arrived_at, \
    completed_at, cancelled_at, validated_at, \
    acceptance_time, response_time, completion_time, \
    within_sla, sla_time_secs, is_valid, validation_notes, \
    dispatched_by, declined_by, cancelled_by, \
    decline_reason, cancellation_reason, notes, \
    created_at, updated_at";

/// Maximum page size for dispatch listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for dispatch listing.
const DEFAULT_LIMIT: i64 = 50;

/// `$n` placeholder list for `count` status ids, starting at `$from`.
fn status_placeholders(from: usize, count: usize) -> String {
    (from..from + count)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn active_status_placeholders(from: usize) -> String {
    status_placeholders(from, ACTIVE_STATUSES.len())
}

/// Bind a slice of status ids onto a query, in slice order.
macro_rules! bind_statuses {
    ($query:expr, $statuses:expr) => {{
        let mut q = $query;
        for status in $statuses {
            q = q.bind(status.id());
        }
        q
    }};
}

/// Provides creation, transitions, and queries for patrol dispatches.
pub struct DispatchRepo;

impl DispatchRepo {
    /// Create a dispatch for a report.
    ///
    /// Targeted (officer pre-selected) dispatches start in `assigned`;
    /// broadcast dispatches start in `pending`. `dispatched_at` is set to
    /// the insert time; every other timestamp stays NULL until its
    /// transition. Callers check for an existing active dispatch first; the
    /// partial unique index turns the remaining race window into a unique
    /// violation instead of a second active dispatch.
    pub async fn create(
        pool: &PgPool,
        station_id: DbId,
        input: &CreateDispatch,
    ) -> Result<PatrolDispatch, sqlx::Error> {
        let initial_status = if input.officer_id.is_some() {
            DispatchStatus::Assigned
        } else {
            DispatchStatus::Pending
        };
        let query = format!(
            "INSERT INTO patrol_dispatches \
                 (report_id, station_id, patrol_officer_id, status_id, dispatched_by, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PatrolDispatch>(&query)
            .bind(input.report_id)
            .bind(station_id)
            .bind(input.officer_id)
            .bind(initial_status.id())
            .bind(input.dispatched_by)
            .bind(input.notes.as_deref())
            .fetch_one(pool)
            .await
    }

    /// Atomically claim a dispatch for an officer.
    ///
    /// Succeeds only while the status is still pending/assigned AND the
    /// officer slot is unclaimed (or pre-targeted to this same officer).
    /// Exactly one of N concurrent attempts can match the guard; the rest
    /// observe `None` with no partial writes. Sets `accepted_at` and the
    /// measured `acceptance_time` in the same statement.
    pub async fn accept(
        pool: &PgPool,
        dispatch_id: DbId,
        officer_id: DbId,
    ) -> Result<Option<PatrolDispatch>, sqlx::Error> {
        let query = format!(
            "UPDATE patrol_dispatches \
             SET patrol_officer_id = $2, \
                 status_id = $3, \
                 accepted_at = NOW(), \
                 acceptance_time = EXTRACT(EPOCH FROM NOW() - dispatched_at)::INTEGER, \
                 updated_at = NOW() \
             WHERE dispatch_id = $1 \
               AND status_id IN ($4, $5) \
               AND (patrol_officer_id IS NULL OR patrol_officer_id = $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PatrolDispatch>(&query)
            .bind(dispatch_id)
            .bind(officer_id)
            .bind(DispatchStatus::Accepted.id())
            .bind(DispatchStatus::Pending.id())
            .bind(DispatchStatus::Assigned.id())
            .fetch_optional(pool)
            .await
    }

    /// Decline a pending or assigned dispatch. Terminal.
    pub async fn decline(
        pool: &PgPool,
        dispatch_id: DbId,
        officer_id: DbId,
        reason: Option<&str>,
    ) -> Result<Option<PatrolDispatch>, sqlx::Error> {
        let query = format!(
            "UPDATE patrol_dispatches \
             SET status_id = $3, \
                 declined_at = NOW(), \
                 declined_by = $2, \
                 decline_reason = $4, \
                 updated_at = NOW() \
             WHERE dispatch_id = $1 \
               AND status_id IN ($5, $6) \
               AND (patrol_officer_id IS NULL OR patrol_officer_id = $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PatrolDispatch>(&query)
            .bind(dispatch_id)
            .bind(officer_id)
            .bind(DispatchStatus::Declined.id())
            .bind(reason)
            .bind(DispatchStatus::Pending.id())
            .bind(DispatchStatus::Assigned.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark the accepting officer as travelling to the scene.
    pub async fn mark_en_route(
        pool: &PgPool,
        dispatch_id: DbId,
        officer_id: DbId,
    ) -> Result<Option<PatrolDispatch>, sqlx::Error> {
        let query = format!(
            "UPDATE patrol_dispatches \
             SET status_id = $3, \
                 en_route_at = NOW(), \
                 updated_at = NOW() \
             WHERE dispatch_id = $1 \
               AND patrol_officer_id = $2 \
               AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PatrolDispatch>(&query)
            .bind(dispatch_id)
            .bind(officer_id)
            .bind(DispatchStatus::EnRoute.id())
            .bind(DispatchStatus::Accepted.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark arrival on scene and settle the three-minute rule.
    ///
    /// `response_time`, the SLA verdict, and its measured value are computed
    /// in the same guarded statement, so a duplicate client request can never
    /// rewrite them.
    pub async fn mark_arrived(
        pool: &PgPool,
        dispatch_id: DbId,
        officer_id: DbId,
    ) -> Result<Option<PatrolDispatch>, sqlx::Error> {
        let query = format!(
            "UPDATE patrol_dispatches \
             SET status_id = $3, \
                 arrived_at = NOW(), \
                 response_time = EXTRACT(EPOCH FROM NOW() - dispatched_at)::INTEGER, \
                 sla_time_secs = EXTRACT(EPOCH FROM NOW() - dispatched_at)::INTEGER, \
                 within_sla = EXTRACT(EPOCH FROM NOW() - dispatched_at)::INTEGER <= $5, \
                 updated_at = NOW() \
             WHERE dispatch_id = $1 \
               AND patrol_officer_id = $2 \
               AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PatrolDispatch>(&query)
            .bind(dispatch_id)
            .bind(officer_id)
            .bind(DispatchStatus::Arrived.id())
            .bind(DispatchStatus::EnRoute.id())
            .bind(RESPONSE_SLA_SECS as i32)
            .fetch_optional(pool)
            .await
    }

    /// Record the officer's field verdict and complete the dispatch. Terminal.
    pub async fn verify(
        pool: &PgPool,
        dispatch_id: DbId,
        officer_id: DbId,
        is_valid: bool,
        validation_notes: Option<&str>,
    ) -> Result<Option<PatrolDispatch>, sqlx::Error> {
        let query = format!(
            "UPDATE patrol_dispatches \
             SET status_id = $3, \
                 completed_at = NOW(), \
                 validated_at = NOW(), \
                 completion_time = EXTRACT(EPOCH FROM NOW() - arrived_at)::INTEGER, \
                 is_valid = $5, \
                 validation_notes = $6, \
                 updated_at = NOW() \
             WHERE dispatch_id = $1 \
               AND patrol_officer_id = $2 \
               AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PatrolDispatch>(&query)
            .bind(dispatch_id)
            .bind(officer_id)
            .bind(DispatchStatus::Completed.id())
            .bind(DispatchStatus::Arrived.id())
            .bind(is_valid)
            .bind(validation_notes)
            .fetch_optional(pool)
            .await
    }

    /// Cancel a dispatch from any active status. Terminal; computes no SLA
    /// fields.
    pub async fn cancel(
        pool: &PgPool,
        dispatch_id: DbId,
        cancelled_by: Option<DbId>,
        reason: Option<&str>,
    ) -> Result<Option<PatrolDispatch>, sqlx::Error> {
        let placeholders = active_status_placeholders(5);
        let query = format!(
            "UPDATE patrol_dispatches \
             SET status_id = $2, \
                 cancelled_at = NOW(), \
                 cancelled_by = $3, \
                 cancellation_reason = $4, \
                 updated_at = NOW() \
             WHERE dispatch_id = $1 \
               AND status_id IN ({placeholders}) \
             RETURNING {COLUMNS}"
        );
        let q = sqlx::query_as::<_, PatrolDispatch>(&query)
            .bind(dispatch_id)
            .bind(DispatchStatus::Cancelled.id())
            .bind(cancelled_by)
            .bind(reason);
        bind_statuses!(q, ACTIVE_STATUSES)
            .fetch_optional(pool)
            .await
    }

    /// Find a dispatch by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        dispatch_id: DbId,
    ) -> Result<Option<PatrolDispatch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM patrol_dispatches WHERE dispatch_id = $1");
        sqlx::query_as::<_, PatrolDispatch>(&query)
            .bind(dispatch_id)
            .fetch_optional(pool)
            .await
    }

    /// The report's active dispatch, if any (at most one by invariant).
    pub async fn find_active_for_report(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Option<PatrolDispatch>, sqlx::Error> {
        let placeholders = active_status_placeholders(2);
        let query = format!(
            "SELECT {COLUMNS} FROM patrol_dispatches \
             WHERE report_id = $1 AND status_id IN ({placeholders})"
        );
        let q = sqlx::query_as::<_, PatrolDispatch>(&query).bind(report_id);
        bind_statuses!(q, ACTIVE_STATUSES)
            .fetch_optional(pool)
            .await
    }

    /// List dispatches with optional station/officer filters and pagination,
    /// newest first. `active = true` restricts to in-flight rows,
    /// `active = false` to terminal rows (dispatch history), absent means
    /// everything.
    pub async fn list(
        pool: &PgPool,
        params: &DispatchListQuery,
    ) -> Result<Vec<PatrolDispatch>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if params.station_id.is_some() {
            conditions.push(format!("station_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.officer_id.is_some() {
            conditions.push(format!("patrol_officer_id = ${bind_idx}"));
            bind_idx += 1;
        }
        match params.active {
            Some(true) => {
                let placeholders =
                    status_placeholders(bind_idx as usize, ACTIVE_STATUSES.len());
                conditions.push(format!("status_id IN ({placeholders})"));
                bind_idx += ACTIVE_STATUSES.len() as u32;
            }
            Some(false) => {
                let placeholders =
                    status_placeholders(bind_idx as usize, TERMINAL_STATUSES.len());
                conditions.push(format!("status_id IN ({placeholders})"));
                bind_idx += TERMINAL_STATUSES.len() as u32;
            }
            None => {}
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM patrol_dispatches \
             {where_clause} \
             ORDER BY dispatched_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, PatrolDispatch>(&query);

        if let Some(sid) = params.station_id {
            q = q.bind(sid);
        }
        if let Some(oid) = params.officer_id {
            q = q.bind(oid);
        }
        match params.active {
            Some(true) => q = bind_statuses!(q, ACTIVE_STATUSES),
            Some(false) => q = bind_statuses!(q, TERMINAL_STATUSES),
            None => {}
        }

        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }
}
