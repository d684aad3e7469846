use axum::{
    extract::{FromRef, State},
    http::{header, HeaderMap, HeaderValue},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::dto::{
        AuthResponse, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest,
        MessageResponse, RegisterRequest, ResetPasswordRequest,
    },
    auth::jwt::JwtKeys,
    auth::password::{hash_password, verify_password},
    auth::reset,
    error::ApiError,
    state::AppState,
    users::dto::UserDto,
    users::repo_types::User,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/logout", post(logout))
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = normalize_email(&payload.email);

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }

    // Pre-check for the friendly error; the unique index still backstops
    // concurrent registrations.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(&payload.password)?;
    let user = User::insert(&state.db, &payload.name, &payload.email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(MessageResponse {
        message: "Registration successful".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = normalize_email(&payload.email);

    // Unknown email and wrong password take the same exit.
    let mut user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    if user.is_blocked {
        warn!(user_id = %user.id, "login attempt on blocked account");
        return Err(ApiError::AccountBlocked);
    }

    let now = OffsetDateTime::now_utc();
    User::touch_last_login(&state.db, user.id, now).await?;
    user.last_login = Some(now);

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: UserDto::from(user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, ApiError> {
    payload.email = normalize_email(&payload.email);

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::NotFound("User not found."))?;

    // A new token replaces any outstanding one for this user.
    if user.reset_token_active(OffsetDateTime::now_utc()) {
        info!(user_id = %user.id, "replacing outstanding reset token");
    }
    let fresh = reset::issue(state.config.reset.ttl_minutes);
    User::set_reset_token(&state.db, user.id, &fresh.token, fresh.expires_at).await?;

    info!(user_id = %user.id, "reset token issued");
    Ok(Json(ForgotPasswordResponse {
        message: "A password reset link has been created.".into(),
        token: fresh.token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.new_password.len() < 8 {
        return Err(ApiError::BadRequest("Password too short".into()));
    }

    let hash = hash_password(&payload.new_password)?;

    // Token match, expiry check, hash replacement and token clearing happen
    // in one guarded UPDATE, so a token is consumable exactly once.
    let consumed = User::reset_password(&state.db, &payload.token, &hash).await?;
    if !consumed {
        warn!("reset attempted with invalid or expired token");
        return Err(ApiError::InvalidOrExpiredToken);
    }

    info!("password reset");
    Ok(Json(MessageResponse {
        message: "Password successfully reset".into(),
    }))
}

/// Stateless logout: the bearer token itself stays valid until it expires,
/// this only clears the session cookie.
#[instrument]
pub async fn logout() -> (HeaderMap, Json<MessageResponse>) {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("token=; Max-Age=0; Path=/; HttpOnly; Secure; SameSite=Strict"),
    );
    (
        headers,
        Json(MessageResponse {
            message: "Logout successful. Token deleted.".into(),
        }),
    )
}
