pub mod dispatches;
pub mod health;
pub mod reports;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /reports                              list visible reports (?actor_id=)
/// /reports/{id}                         get report (?actor_id=)
/// /reports/{id}/assign-station          run the assignment engine (POST)
///
/// /dispatches                           list (?station_id, officer_id, active), create
/// /dispatches/{id}                      get dispatch with live timers
/// /dispatches/{id}/accept               claim the dispatch (POST)
/// /dispatches/{id}/decline              decline the dispatch (POST)
/// /dispatches/{id}/en-route             officer departed (POST)
/// /dispatches/{id}/arrived              officer on scene, SLA settles (POST)
/// /dispatches/{id}/verify               field verdict, completes (POST)
/// /dispatches/{id}/cancel               cancel from any active status (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/reports", reports::router())
        .nest("/dispatches", dispatches::router())
}
