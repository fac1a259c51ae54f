//! Report status projection.
//!
//! [`ReportStatusProjector`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and mirrors dispatch lifecycle transitions onto the
//! parent report's `status` column. It runs as a long-lived background task
//! and shuts down gracefully when the bus sender is dropped.

use tokio::sync::broadcast;

use bantay_core::report_status::{verdict_status, STATUS_DISPATCHED, STATUS_INVESTIGATING};
use bantay_db::repositories::ReportRepo;
use bantay_db::DbPool;

use crate::bus::{DispatchEvent, DISPATCH_ACCEPTED, DISPATCH_COMPLETED, DISPATCH_CREATED};

/// The report write a single dispatch event projects to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStatusChange {
    /// Set the report's status string.
    Status(&'static str),
    /// Record the field verdict: status plus the validity flag.
    Verdict { status: &'static str, is_valid: bool },
}

/// Map a dispatch event to the report status change it implies.
///
/// Only three transitions touch the report: creation marks it dispatched,
/// acceptance marks it under investigation, and completion records the
/// officer's verdict. Declines, cancellations, and movement updates leave
/// the report status alone so a follow-up dispatch can pick it up.
pub fn project(event: &DispatchEvent) -> Option<ReportStatusChange> {
    match event.event_type.as_str() {
        DISPATCH_CREATED => Some(ReportStatusChange::Status(STATUS_DISPATCHED)),
        DISPATCH_ACCEPTED => Some(ReportStatusChange::Status(STATUS_INVESTIGATING)),
        DISPATCH_COMPLETED => {
            let is_valid = event.payload.get("is_valid").and_then(|v| v.as_bool())?;
            Some(ReportStatusChange::Verdict {
                status: verdict_status(is_valid),
                is_valid,
            })
        }
        _ => None,
    }
}

/// Background service that projects dispatch events onto reports.
pub struct ReportStatusProjector;

impl ReportStatusProjector {
    /// Run the projection loop.
    ///
    /// Subscribes to the event bus via the provided `receiver` and applies
    /// every projected change. The loop exits when the channel is closed
    /// (i.e. the [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<DispatchEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::apply(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            report_id = event.report_id,
                            "Failed to project report status"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Status projector lagged, some report statuses may be stale"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, status projector shutting down");
                    break;
                }
            }
        }
    }

    /// Apply the projection for a single event, if it has one.
    async fn apply(pool: &DbPool, event: &DispatchEvent) -> Result<(), sqlx::Error> {
        match project(event) {
            Some(ReportStatusChange::Status(status)) => {
                ReportRepo::set_status(pool, event.report_id, status).await
            }
            Some(ReportStatusChange::Verdict { status, is_valid }) => {
                ReportRepo::set_verdict(pool, event.report_id, status, is_valid).await
            }
            None => Ok(()),
        }
    }
}
