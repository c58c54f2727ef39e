use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use crate::db::models::{NewUser, UserPatch};
use crate::middleware::auth::BasicCreds;
use crate::{VaxError, router::VaxState};

/// POST /users -> register a new account.
pub async fn register(
    State(state): State<VaxState>,
    Json(payload): Json<NewUser>,
) -> Result<impl IntoResponse, VaxError> {
    if payload.username.trim().is_empty() {
        return Err(VaxError::InvalidInput("username must not be empty"));
    }
    if payload.email.trim().is_empty() {
        return Err(VaxError::InvalidInput("email must not be empty"));
    }
    if payload.password.is_empty() {
        return Err(VaxError::InvalidInput("password must not be empty"));
    }

    let user = state.storage.create_user(payload).await?;
    info!(username = %user.username, "account registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users -> canonical account data for the authenticated caller.
pub async fn query(
    State(state): State<VaxState>,
    creds: BasicCreds,
) -> Result<impl IntoResponse, VaxError> {
    let user = state
        .storage
        .authenticate(creds.username(), creds.password())
        .await?;
    Ok(Json(user))
}

/// PUT /users -> partial update of the authenticated account.
pub async fn update(
    State(state): State<VaxState>,
    creds: BasicCreds,
    Json(patch): Json<UserPatch>,
) -> Result<impl IntoResponse, VaxError> {
    // Present-but-empty is rejected rather than treated as "unchanged".
    if matches!(patch.name.as_deref(), Some("")) {
        return Err(VaxError::InvalidInput("name must not be empty"));
    }
    if matches!(patch.birth.as_deref(), Some("")) {
        return Err(VaxError::InvalidInput("birth must not be empty"));
    }
    if matches!(patch.email.as_deref(), Some("")) {
        return Err(VaxError::InvalidInput("email must not be empty"));
    }
    if matches!(patch.new_password.as_deref(), Some("")) {
        return Err(VaxError::InvalidInput("new password must not be empty"));
    }

    let user = state
        .storage
        .update_user(creds.username(), creds.password(), patch)
        .await?;
    info!(username = %user.username, "account updated");
    Ok(Json(user))
}

/// DELETE /users -> remove the authenticated account and its dose records.
pub async fn remove(
    State(state): State<VaxState>,
    creds: BasicCreds,
) -> Result<impl IntoResponse, VaxError> {
    state
        .storage
        .delete_user(creds.username(), creds.password())
        .await?;
    info!(username = %creds.username(), "account deleted");
    Ok(StatusCode::NO_CONTENT)
}
