use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::handlers::{is_valid_email, normalize_email},
    auth::jwt::AuthUser,
    auth::password::hash_password,
    auth::MessageResponse,
    error::ApiError,
    state::AppState,
    users::dto::{BulkUserIds, UpsertUserRequest, UserDto},
    users::repo_types::User,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user))
        .route("/users/delete", post(delete_users))
        .route("/users/block", post(block_users))
        .route("/users/unblock", post(unblock_users))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDto>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(UserDto::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Json(mut payload): Json<UpsertUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    payload.email = normalize_email(&payload.email);
    validate_upsert(&payload)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(&payload.password)?;
    let user = User::insert(&state.db, &payload.name, &payload.email, &hash).await?;

    info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// PUT is a full replace: name and email are overwritten and the password is
/// re-hashed unconditionally.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpsertUserRequest>,
) -> Result<Json<UserDto>, ApiError> {
    payload.email = normalize_email(&payload.email);
    validate_upsert(&payload)?;

    let hash = hash_password(&payload.password)?;
    let user = User::update_profile(&state.db, id, &payload.name, &payload.email, &hash)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(UserDto::from(user)))
}

#[instrument(skip(state))]
pub async fn delete_users(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Json(payload): Json<BulkUserIds>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.user_ids.is_empty() {
        return Err(ApiError::BadRequest("No user IDs provided.".into()));
    }

    let deleted = User::delete_many(&state.db, &payload.user_ids).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("No matching users found."));
    }

    info!(deleted, "users deleted");
    Ok(Json(MessageResponse {
        message: "Selected users have been deleted.".into(),
    }))
}

#[instrument(skip(state))]
pub async fn block_users(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Json(payload): Json<BulkUserIds>,
) -> Result<Json<MessageResponse>, ApiError> {
    // Unmatched ids are skipped without error, by contract.
    let blocked = User::set_blocked(&state.db, &payload.user_ids, true).await?;
    info!(blocked, "users blocked");
    Ok(Json(MessageResponse {
        message: "Selected users have been blocked.".into(),
    }))
}

#[instrument(skip(state))]
pub async fn unblock_users(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Json(payload): Json<BulkUserIds>,
) -> Result<Json<MessageResponse>, ApiError> {
    let unblocked = User::set_blocked(&state.db, &payload.user_ids, false).await?;
    info!(unblocked, "users unblocked");
    Ok(Json(MessageResponse {
        message: "Selected users have been unblocked.".into(),
    }))
}

fn validate_upsert(payload: &UpsertUserRequest) -> Result<(), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".into()));
    }
    if !is_valid_email(&payload.email) {
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::BadRequest("Password too short".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str) -> UpsertUserRequest {
        UpsertUserRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn upsert_requires_name_email_and_password() {
        assert!(validate_upsert(&request("Jo", "jo@example.com", "longenough")).is_ok());
        assert!(validate_upsert(&request("  ", "jo@example.com", "longenough")).is_err());
        assert!(validate_upsert(&request("Jo", "not-an-email", "longenough")).is_err());
        assert!(validate_upsert(&request("Jo", "jo@example.com", "short")).is_err());
    }
}
