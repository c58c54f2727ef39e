use axum::{Json, extract::State, response::IntoResponse};

use crate::{VaxError, router::VaxState};

/// GET /vaccines -> the full catalog, ordered by id. No auth required.
pub async fn list(State(state): State<VaxState>) -> Result<impl IntoResponse, VaxError> {
    let vaccines = state.storage.list_vaccines().await?;
    Ok(Json(vaccines))
}
