//! Patrol dispatch entity models and DTOs.

use bantay_core::sla;
use bantay_core::status::{DispatchStatus, StatusId};
use bantay_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `patrol_dispatches` table.
///
/// Rows are never deleted; terminal dispatches remain as an audit trail.
/// Every timestamp is written exactly once by its transition.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PatrolDispatch {
    pub dispatch_id: DbId,
    pub report_id: DbId,
    pub station_id: DbId,
    /// NULL until accepted (broadcast) or pre-set at creation (targeted).
    /// Once the accept transition confirms it, it never changes.
    pub patrol_officer_id: Option<DbId>,
    pub status_id: StatusId,
    pub dispatched_at: Timestamp,
    pub accepted_at: Option<Timestamp>,
    pub declined_at: Option<Timestamp>,
    pub en_route_at: Option<Timestamp>,
    pub arrived_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub validated_at: Option<Timestamp>,
    /// Dispatch-to-accept, whole seconds.
    pub acceptance_time: Option<i32>,
    /// Dispatch-to-arrival, whole seconds.
    pub response_time: Option<i32>,
    /// Arrival-to-completion, whole seconds.
    pub completion_time: Option<i32>,
    /// Three-minute-rule verdict, settled at arrival.
    pub within_sla: Option<bool>,
    /// Measured value the verdict was computed from.
    pub sla_time_secs: Option<i32>,
    /// Officer's field verdict: valid or invalid report.
    pub is_valid: Option<bool>,
    pub validation_notes: Option<String>,
    pub dispatched_by: Option<DbId>,
    pub declined_by: Option<DbId>,
    pub cancelled_by: Option<DbId>,
    pub decline_reason: Option<String>,
    pub cancellation_reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PatrolDispatch {
    /// Decode the raw status id. `None` only if the row predates the current
    /// lookup table, which the schema forbids.
    pub fn status(&self) -> Option<DispatchStatus> {
        DispatchStatus::from_id(self.status_id)
    }

    /// Seconds left on the three-minute clock as of `now` (negative when
    /// blown, clamped to 0 once arrived/completed).
    pub fn time_remaining(&self, now: Timestamp) -> i64 {
        match self.status() {
            Some(status) => sla::time_remaining(self.dispatched_at, now, status),
            None => 0,
        }
    }

    /// Whether the dispatch has blown the SLA and arrival is still expected.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        match self.status() {
            Some(status) => sla::is_overdue(self.dispatched_at, now, status),
            None => false,
        }
    }
}

/// DTO for `POST /api/v1/dispatches`.
#[derive(Debug, Deserialize)]
pub struct CreateDispatch {
    pub report_id: DbId,
    /// Targeted dispatch: pre-select an officer and start in `assigned`.
    /// Omitted: broadcast to the station's officers, start in `pending`.
    pub officer_id: Option<DbId>,
    /// Admin who triggered the dispatch.
    pub dispatched_by: Option<DbId>,
    pub notes: Option<String>,
}

/// Query parameters for `GET /api/v1/dispatches`.
#[derive(Debug, Deserialize)]
pub struct DispatchListQuery {
    pub station_id: Option<DbId>,
    pub officer_id: Option<DbId>,
    /// When `true`, only dispatches in the active status set.
    pub active: Option<bool>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Dispatch row enriched with the on-read SLA timers.
#[derive(Debug, Serialize)]
pub struct DispatchWithTimers {
    #[serde(flatten)]
    pub dispatch: PatrolDispatch,
    pub time_remaining: i64,
    pub is_overdue: bool,
}

impl DispatchWithTimers {
    /// Compute the derived timers as of `now`.
    pub fn at(dispatch: PatrolDispatch, now: Timestamp) -> Self {
        let time_remaining = dispatch.time_remaining(now);
        let is_overdue = dispatch.is_overdue(now);
        Self {
            dispatch,
            time_remaining,
            is_overdue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn dispatch(status: DispatchStatus, dispatched_at: Timestamp) -> PatrolDispatch {
        PatrolDispatch {
            dispatch_id: 1,
            report_id: 1,
            station_id: 1,
            patrol_officer_id: None,
            status_id: status.id(),
            dispatched_at,
            accepted_at: None,
            declined_at: None,
            en_route_at: None,
            arrived_at: None,
            completed_at: None,
            cancelled_at: None,
            validated_at: None,
            acceptance_time: None,
            response_time: None,
            completion_time: None,
            within_sla: None,
            sla_time_secs: None,
            is_valid: None,
            validation_notes: None,
            dispatched_by: None,
            declined_by: None,
            cancelled_by: None,
            decline_reason: None,
            cancellation_reason: None,
            notes: None,
            created_at: dispatched_at,
            updated_at: dispatched_at,
        }
    }

    #[test]
    fn timers_reflect_elapsed_time() {
        let dispatched = Utc::now();
        let d = dispatch(DispatchStatus::Pending, dispatched);

        let now = dispatched + Duration::seconds(60);
        assert_eq!(d.time_remaining(now), 120);
        assert!(!d.is_overdue(now));

        let late = dispatched + Duration::seconds(240);
        assert_eq!(d.time_remaining(late), -60);
        assert!(d.is_overdue(late));
    }

    #[test]
    fn arrived_dispatch_is_settled() {
        let dispatched = Utc::now();
        let d = dispatch(DispatchStatus::Arrived, dispatched);
        let late = dispatched + Duration::seconds(600);

        assert_eq!(d.time_remaining(late), 0);
        assert!(!d.is_overdue(late));
    }

    #[test]
    fn with_timers_serializes_flattened() {
        let dispatched = Utc::now();
        let view = DispatchWithTimers::at(dispatch(DispatchStatus::Pending, dispatched), dispatched);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["dispatch_id"], 1);
        assert_eq!(json["time_remaining"], 180);
        assert_eq!(json["is_overdue"], false);
    }
}
