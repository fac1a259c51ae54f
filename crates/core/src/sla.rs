//! Three-minute-rule timing math.
//!
//! The SLA clock starts at `dispatched_at` and settles when the officer
//! arrives on scene. `time_remaining` and `is_overdue` are derived on read
//! from wall-clock time; only the measured response time and the pass/fail
//! flag are persisted (at the arrival transition).

use crate::status::DispatchStatus;
use crate::types::Timestamp;

/// Dispatch-to-arrival budget in seconds (the "three-minute rule").
pub const RESPONSE_SLA_SECS: i64 = 180;

/// Non-negative whole seconds between two instants.
pub fn seconds_between(from: Timestamp, to: Timestamp) -> i64 {
    (to - from).num_seconds().max(0)
}

/// Whether a measured response time meets the three-minute rule.
pub fn within_sla(response_time_secs: i64) -> bool {
    response_time_secs <= RESPONSE_SLA_SECS
}

/// Seconds left on the SLA clock. Negative once the budget is exceeded;
/// clamped to 0 once the officer has arrived or completed (the clock is
/// settled, nothing is remaining or owed).
pub fn time_remaining(dispatched_at: Timestamp, now: Timestamp, status: DispatchStatus) -> i64 {
    if matches!(status, DispatchStatus::Arrived | DispatchStatus::Completed) {
        return 0;
    }
    RESPONSE_SLA_SECS - (now - dispatched_at).num_seconds()
}

/// Whether the dispatch has blown the SLA and is still expected to arrive.
///
/// Terminal and settled statuses are never overdue: a declined or cancelled
/// dispatch owes no arrival, and an arrived one already has its verdict in
/// `within_sla`.
pub fn is_overdue(dispatched_at: Timestamp, now: Timestamp, status: DispatchStatus) -> bool {
    let exempt = matches!(
        status,
        DispatchStatus::Arrived
            | DispatchStatus::Completed
            | DispatchStatus::Cancelled
            | DispatchStatus::Declined
    );
    !exempt && time_remaining(dispatched_at, now, status) < 0
}
