use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// Mount report routes (nested under `/api/v1/reports`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reports::list_reports))
        .route("/{id}", get(reports::get_report))
        .route("/{id}/assign-station", post(reports::assign_station))
}
