use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum VaxError {
    #[error("random source under-delivered salt bytes")]
    Randomness,

    #[error("username or email already registered")]
    DuplicateIdentity,

    #[error("no such user")]
    NotFound,

    #[error("password mismatch")]
    InvalidCredentials,

    #[error("unknown vaccine id: {0}")]
    UnknownVaccine(i64),

    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("storage error: {0}")]
    Storage(#[source] SqlxError),
}

impl From<SqlxError> for VaxError {
    fn from(e: SqlxError) -> Self {
        match e {
            SqlxError::RowNotFound => VaxError::NotFound,
            SqlxError::Database(ref db) if db.is_unique_violation() => VaxError::DuplicateIdentity,
            other => VaxError::Storage(other),
        }
    }
}

impl IntoResponse for VaxError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            // NotFound and InvalidCredentials are indistinguishable on the
            // wire so callers cannot enumerate usernames.
            VaxError::NotFound | VaxError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "invalid username or password".to_string(),
                },
            ),
            VaxError::DuplicateIdentity => (
                StatusCode::CONFLICT,
                ApiErrorBody {
                    code: "DUPLICATE_IDENTITY".to_string(),
                    message: "username or email already registered".to_string(),
                },
            ),
            VaxError::UnknownVaccine(id) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiErrorBody {
                    code: "UNKNOWN_VACCINE".to_string(),
                    message: format!("no vaccine with id {id}"),
                },
            ),
            VaxError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "INVALID_INPUT".to_string(),
                    message: msg.to_string(),
                },
            ),
            // Generic body only: the underlying error text never reaches the
            // client.
            VaxError::Randomness | VaxError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "an internal server error occurred".to_string(),
                },
            ),
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
