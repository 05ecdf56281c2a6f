use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::{debug, warn};

use super::cookie::SESSION_COOKIE;
use super::token::{SessionKeys, SessionUser, TokenRejection};

pub const LOGIN_PATH: &str = "/auth/login";

/// Identity resolved from the session cookie.
///
/// Every failure mode (absent, malformed, tampered, expired) rejects the same
/// way, a redirect to the login page, so the response never distinguishes
/// them. The tagged cause is only logged.
pub struct CurrentUser(pub SessionUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            debug!("no session cookie");
            return Err(Redirect::to(LOGIN_PATH).into_response());
        };

        match keys.verify(cookie.value()) {
            Ok(claims) => Ok(CurrentUser(claims.user)),
            Err(TokenRejection::Expired) => {
                debug!("session token expired");
                Err(Redirect::to(LOGIN_PATH).into_response())
            }
            Err(rejection) => {
                warn!(?rejection, "session token rejected");
                Err(Redirect::to(LOGIN_PATH).into_response())
            }
        }
    }
}
