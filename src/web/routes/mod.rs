//! Contains all the routes that this application can handle.

mod home;
mod join_waitlist;

use axum::{
    http::StatusCode,
    routing::{any, get},
    Router,
};

use crate::AppState;
use home::home;
use join_waitlist::join_waitlist;

pub const JOIN_WAITLIST_PATH: &str = "/join-waitlist";

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All the routes of the server.
/// The signup endpoint is reachable both at the root and under "/api".
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route(JOIN_WAITLIST_PATH, any(join_waitlist))
        .nest("/api", api_routes())
        .with_state(app_state)
        .route("/health-check", get(health_check))
}

/// API - Routes nested under "/api" path
fn api_routes() -> Router<AppState> {
    Router::new().route(JOIN_WAITLIST_PATH, any(join_waitlist))
}
