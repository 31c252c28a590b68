use axum::{routing::get, Router};

pub mod auth;
pub mod system;
pub mod time_events;
pub mod users;
pub mod vacations;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .nest("/users", users::router())
        .nest("/time-events", time_events::router())
        .nest("/vacations", vacations::router())
}
