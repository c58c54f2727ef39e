use axum::{
    Router,
    routing::{get, post},
};

use crate::db::VaxStorage;
use crate::handlers::{doses, users, vaccines};

#[derive(Clone)]
pub struct VaxState {
    pub storage: VaxStorage,
}

impl VaxState {
    pub fn new(storage: VaxStorage) -> Self {
        Self { storage }
    }
}

/// Build the API router. Identity is carried as HTTP Basic credentials on
/// every authenticated route; there are no sessions.
pub fn vax_router(state: VaxState) -> Router {
    Router::new()
        .route(
            "/users",
            post(users::register)
                .get(users::query)
                .put(users::update)
                .delete(users::remove),
        )
        .route("/vaccines", get(vaccines::list))
        .route("/doses", get(doses::list).post(doses::register))
        .with_state(state)
}
