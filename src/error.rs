use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Every failure a handler can report. All variants are terminal; there is
/// no retry path.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Email already exists")]
    DuplicateEmail,

    /// One message for unknown email and wrong password, so callers cannot
    /// probe which addresses are registered.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User is blocked")]
    AccountBlocked,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::DuplicateEmail => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::AccountBlocked => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
            return (status, "Internal server error".to_string()).into_response();
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_contract() {
        assert_eq!(ApiError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::AccountBlocked.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::NotFound("User not found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidOrExpiredToken.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::BadRequest("No user IDs provided.".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn credential_errors_share_one_message() {
        // Unknown email and wrong password must be indistinguishable.
        assert_eq!(
            ApiError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let resp = ApiError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
