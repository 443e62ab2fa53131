// Caller identity extraction
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rating_service_engine::VoteError;
use rating_service_shared::types::UserId;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// The authenticated user making the request.
///
/// Authentication happens upstream; the gateway forwards the verified user
/// id in the configured header. A missing, empty or non-numeric value is
/// rejected with `401 Unauthorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub UserId);

#[axum::async_trait]
impl FromRequestParts<AppState> for CallerId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(&state.caller_id_header)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<UserId>().ok())
            .map(CallerId)
            .ok_or(ApiError::Vote(VoteError::Unauthorized))
    }
}
