use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Canonical account representation as returned to callers. Credential
/// material never leaves the store, so there is no password field at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub birth: String,
    pub email: String,
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub birth: String,
    pub email: String,
    pub password: String,
}

/// Partial account update. `None` means "leave unchanged"; a present field
/// overwrites. A present-but-empty string is rejected at the handler, so
/// "clear this field" and "leave unchanged" stay distinguishable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub birth: Option<String>,
    pub email: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Vaccine {
    pub vac_id: i64,
    pub name: String,
    pub num_doses: i64,
    pub obs: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Dose {
    pub dose_id: i64,
    pub user_id: i64,
    pub vac_id: i64,
    pub date_taken: String,
}

/// Dose registration payload; the owning account is resolved from the
/// request's credentials, never from the body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDose {
    pub vac_id: i64,
    pub date_taken: String,
}
