use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::db::models::NewDose;
use crate::middleware::auth::BasicCreds;
use crate::{VaxError, router::VaxState};

/// GET /doses -> dose records owned by the authenticated caller.
pub async fn list(
    State(state): State<VaxState>,
    creds: BasicCreds,
) -> Result<impl IntoResponse, VaxError> {
    let doses = state
        .storage
        .list_doses(creds.username(), creds.password())
        .await?;
    Ok(Json(doses))
}

/// POST /doses -> append a dose record for the authenticated caller.
pub async fn register(
    State(state): State<VaxState>,
    creds: BasicCreds,
    Json(payload): Json<NewDose>,
) -> Result<impl IntoResponse, VaxError> {
    if payload.date_taken.trim().is_empty() {
        return Err(VaxError::InvalidInput("date_taken must not be empty"));
    }

    let dose = state
        .storage
        .register_dose(creds.username(), creds.password(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(dose)))
}
