// HTTP request handlers
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use rating_service_engine::{CastOutcome, RetractOutcome};
use rating_service_shared::types::{
    ReconcileReport, Target, TargetId, TargetType, UserId, VoteKey, VoteKind, Voter,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::server::auth::CallerId;
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Body of a cast request: `{"type": "like"}` or `{"type": "dislike"}`.
#[derive(Debug, Deserialize)]
pub struct CastRequest {
    #[serde(rename = "type")]
    pub kind: VoteKind,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RatingResponse {
    pub rating: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserRatingResponse {
    pub user_id: UserId,
    pub rating: i64,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Rating service is running")
}

/// Casts the caller's vote. Answers `201 Created` for a new vote and
/// `200 OK` when an existing vote was replaced.
pub async fn cast_vote(
    State(state): State<AppState>,
    Extension(target_type): Extension<TargetType>,
    caller: CallerId,
    id: Result<Path<TargetId>, PathRejection>,
    body: Result<Json<CastRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CastOutcome>), ApiError> {
    let Path(id) = id?;
    let Json(request) = body?;
    let key = VoteKey::new(Target { target_type, id }, caller.0);

    let outcome = state.engine.cast(key, request.kind).await?;
    let status = if outcome.previous_kind.is_none() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

/// Removes the caller's vote.
pub async fn retract_vote(
    State(state): State<AppState>,
    Extension(target_type): Extension<TargetType>,
    caller: CallerId,
    id: Result<Path<TargetId>, PathRejection>,
) -> Result<Json<RetractOutcome>, ApiError> {
    let Path(id) = id?;
    let key = VoteKey::new(Target { target_type, id }, caller.0);
    let outcome = state.engine.retract(key).await?;
    Ok(Json(outcome))
}

pub async fn list_voters(
    State(state): State<AppState>,
    Extension(target_type): Extension<TargetType>,
    id: Result<Path<TargetId>, PathRejection>,
) -> Result<Json<Vec<Voter>>, ApiError> {
    let Path(id) = id?;
    let voters = state.engine.voters_of(Target { target_type, id }).await?;
    Ok(Json(voters))
}

pub async fn target_rating(
    State(state): State<AppState>,
    Extension(target_type): Extension<TargetType>,
    id: Result<Path<TargetId>, PathRejection>,
) -> Result<Json<RatingResponse>, ApiError> {
    let Path(id) = id?;
    let rating = state.engine.rating_of(Target { target_type, id }).await?;
    Ok(Json(RatingResponse { rating }))
}

pub async fn user_rating(
    State(state): State<AppState>,
    user_id: Result<Path<UserId>, PathRejection>,
) -> Result<Json<UserRatingResponse>, ApiError> {
    let Path(user_id) = user_id?;
    let rating = state.engine.author_rating_of(user_id).await?;
    Ok(Json(UserRatingResponse { user_id, rating }))
}

/// Recomputes every rating from the stored votes. Role checks for this
/// route are left to the gateway; only an identified caller is required.
pub async fn reconcile_ratings(
    State(state): State<AppState>,
    caller: CallerId,
) -> Result<Json<ReconcileReport>, ApiError> {
    info!(caller = caller.0, "Rating reconciliation requested");
    let report = state.engine.reconcile().await?;
    Ok(Json(report))
}
