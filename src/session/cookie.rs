//! Cookie binding for the session token.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::OffsetDateTime;

pub const SESSION_COOKIE: &str = "session";

/// Binds a signed token to the client. The cookie expires together with the
/// token; `secure` is set only under a production configuration so local
/// plain-HTTP development still works.
pub fn session_cookie(token: String, expires_at: OffsetDateTime, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie.set_path("/");
    cookie.set_expires(expires_at);
    cookie
}

pub fn attach_session(
    jar: CookieJar,
    token: String,
    expires_at: OffsetDateTime,
    secure: bool,
) -> CookieJar {
    jar.add(session_cookie(token, expires_at, secure))
}

/// Removes the session cookie. Safe to call with no session present.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    jar.remove(cookie)
}
