// App state for Axum server
use axum::http::HeaderName;
use rating_service_engine::VoteEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: VoteEngine,
    /// Header the gateway puts the authenticated user id in.
    pub caller_id_header: HeaderName,
}
