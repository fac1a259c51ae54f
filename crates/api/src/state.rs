use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bantay_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Event bus for publishing dispatch lifecycle events.
    pub event_bus: Arc<bantay_events::EventBus>,
}
