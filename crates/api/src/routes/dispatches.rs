use axum::routing::{get, post};
use axum::Router;

use crate::handlers::dispatches;
use crate::state::AppState;

/// Mount dispatch routes (nested under `/api/v1/dispatches`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(dispatches::list_dispatches).post(dispatches::create_dispatch),
        )
        .route("/{id}", get(dispatches::get_dispatch))
        .route("/{id}/accept", post(dispatches::accept_dispatch))
        .route("/{id}/decline", post(dispatches::decline_dispatch))
        .route("/{id}/en-route", post(dispatches::mark_en_route))
        .route("/{id}/arrived", post(dispatches::mark_arrived))
        .route("/{id}/verify", post(dispatches::verify_dispatch))
        .route("/{id}/cancel", post(dispatches::cancel_dispatch))
}
