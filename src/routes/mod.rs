pub mod auth;
pub mod catalog;
pub mod exercises;
pub mod reports;
pub mod users;

use axum::Router;

use crate::AppState;

/// Flat route table matching the paths the mobile client calls.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(catalog::router())
        .merge(exercises::router())
        .merge(reports::router())
        .with_state(state)
}
