// Error responses
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rating_service_engine::VoteError;

/// Everything a handler can fail with, rendered as
/// `{"status": "error", "message": ...}`.
#[derive(Debug)]
pub enum ApiError {
    Vote(VoteError),
    BadRequest(String),
}

impl From<VoteError> for ApiError {
    fn from(err: VoteError) -> Self {
        ApiError::Vote(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Vote(err) => match err {
                VoteError::TargetNotFound(_)
                | VoteError::VoteNotFound(_)
                | VoteError::UserNotFound(_) => StatusCode::NOT_FOUND,
                VoteError::DuplicateVote(_) | VoteError::Conflict(_) => StatusCode::CONFLICT,
                VoteError::Unauthorized => StatusCode::UNAUTHORIZED,
                VoteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(message) => message,
            // storage details stay in the logs
            ApiError::Vote(VoteError::Internal(_)) => "Internal server error".to_string(),
            ApiError::Vote(err) => err.to_string(),
        };

        (
            status,
            Json(serde_json::json!({
                "status": "error",
                "message": message
            })),
        )
            .into_response()
    }
}
