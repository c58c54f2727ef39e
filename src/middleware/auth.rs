use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Basic};

use crate::error::VaxError;

/// Basic credentials carried on every authenticated request.
///
/// A missing or malformed Authorization header is rejected with the same 401
/// body as a failed password check, so every authentication failure is
/// uniform on the wire. No `Debug` impl: the password must never reach log
/// output through formatting.
#[derive(Clone)]
pub struct BasicCreds(Basic);

impl BasicCreds {
    pub fn username(&self) -> &str {
        self.0.username()
    }

    pub fn password(&self) -> &str {
        self.0.password()
    }
}

impl<S> FromRequestParts<S> for BasicCreds
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state).await {
            Ok(TypedHeader(Authorization(basic))) => Ok(Self(basic)),
            Err(_) => Err(VaxError::InvalidCredentials.into_response()),
        }
    }
}
