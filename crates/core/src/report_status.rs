//! Report status constants and validation.
//!
//! Report status is free-running text mutated by the status projector in
//! reaction to dispatch transitions; these are the values this system writes.

/// Newly submitted, not yet dispatched.
pub const STATUS_PENDING: &str = "pending";

/// A patrol dispatch has been created for the report.
pub const STATUS_DISPATCHED: &str = "dispatched";

/// An officer accepted the dispatch and is investigating.
pub const STATUS_INVESTIGATING: &str = "investigating";

/// Field verification found the report valid.
pub const STATUS_VERIFIED: &str = "verified";

/// Field verification found the report invalid.
pub const STATUS_INVALID: &str = "invalid";

/// All status values this core may write to a report.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_DISPATCHED,
    STATUS_INVESTIGATING,
    STATUS_VERIFIED,
    STATUS_INVALID,
];

/// Validate that a report status string is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid report status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))
    }
}

/// Status to project onto the report once the officer's verdict is in.
pub fn verdict_status(is_valid: bool) -> &'static str {
    if is_valid {
        STATUS_VERIFIED
    } else {
        STATUS_INVALID
    }
}
