use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
        password,
    },
    error::{ApiError, ApiResult},
    session::{cookie, CurrentUser, SessionKeys, SessionUser},
    state::AppState,
    store::{StoreError, User},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn issue_session(
    jar: CookieJar,
    keys: &SessionKeys,
    user: SessionUser,
    secure: bool,
) -> ApiResult<CookieJar> {
    let (token, expires_at) = keys.sign(user).map_err(ApiError::Internal)?;
    Ok(cookie::attach_session(jar, token, expires_at, secure))
}

fn public(user: &User) -> PublicUser {
    PublicUser {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
    }
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let name = payload.name.trim().to_string();
    // emails are matched exactly as stored; no lowercasing
    let email = payload.email.trim().to_string();

    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("All fields are required".into()));
    }
    if !is_valid_email(&email) {
        warn!("invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    let password_hash = password::hash_password(&payload.password).map_err(ApiError::Internal)?;

    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        password_hash,
        created_at: OffsetDateTime::now_utc(),
    };

    // the store enforces uniqueness under its own lock, so check-then-insert
    // cannot race
    match state.users.insert(user.clone()).await {
        Ok(()) => {}
        Err(StoreError::DuplicateEmail) => {
            warn!("email already registered");
            return Err(ApiError::Conflict("User already exists with this email".into()));
        }
        Err(e) => {
            error!(error = %e, "insert user failed");
            return Err(ApiError::Internal(anyhow::anyhow!("user insert failed")));
        }
    }

    let keys = SessionKeys::from_ref(&state);
    let session_user = SessionUser {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
    };
    let jar = issue_session(jar, &keys, session_user, state.config.session.cookie_secure)?;

    info!(user_id = %user.id, "user signed up");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse { user: public(&user) }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let email = payload.email.trim().to_string();

    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".into()));
    }

    let user = match state.users.find_by_email(&email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            // burn a verification so unknown email costs the same as a
            // wrong password
            password::burn_verification(&payload.password);
            warn!("login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::Internal(anyhow::anyhow!("user lookup failed")));
        }
    };

    if !password::verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = SessionKeys::from_ref(&state);
    let session_user = SessionUser {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
    };
    let jar = issue_session(jar, &keys, session_user, state.config.session.cookie_secure)?;

    info!(user_id = %user.id, "user logged in");
    Ok((StatusCode::OK, jar, Json(AuthResponse { user: public(&user) })))
}

/// Clears the session unconditionally; logging out without a session is not
/// an error. The token itself stays valid until its embedded expiry.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (cookie::clear_session(jar), Redirect::to("/"))
}

#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser {
        id: user.id,
        name: user.name,
        email: user.email,
    })
}
