// Server module - HTTP server setup and routing
pub mod auth;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use rating_service_shared::types::TargetType;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

use self::state::AppState;

/// Vote routes shared by posts and comments; the target type is supplied by
/// the `Extension` layered on each nested copy.
fn target_routes(target_type: TargetType) -> Router<AppState> {
    Router::new()
        .route(
            "/:id/like",
            post(handlers::cast_vote).delete(handlers::retract_vote),
        )
        .route("/:id/likes", get(handlers::list_voters))
        .route("/:id/rating", get(handlers::target_rating))
        .layer(Extension(target_type))
}

/// Create the Axum application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .nest("/posts", target_routes(TargetType::Post))
        .nest("/comments", target_routes(TargetType::Comment))
        .route("/users/:id/rating", get(handlers::user_rating))
        .route("/admin/ratings/reconcile", post(handlers::reconcile_ratings))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server on the specified address until Ctrl-C is received
pub async fn run_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    info!("Server listening on {}", addr);
    info!("- Post votes: http://{}/posts/{{id}}/like", addr);
    info!("- Comment votes: http://{}/comments/{{id}}/like", addr);
    info!("- Health endpoint: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
