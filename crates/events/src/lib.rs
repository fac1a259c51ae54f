//! Bantay dispatch event infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DispatchEvent`]: the canonical dispatch lifecycle event envelope.
//! - [`ReportStatusProjector`]: background service that mirrors dispatch
//!   transitions onto the parent report's status.

pub mod bus;
pub mod projector;

pub use bus::{DispatchEvent, EventBus};
pub use projector::ReportStatusProjector;
