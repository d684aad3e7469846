use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::User;

/// Public part of a user returned to clients. No hash, no reset token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub registered_at: OffsetDateTime,
    pub status: String,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        let status = if u.is_blocked { "blocked" } else { "active" };
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            last_login: u.last_login,
            registered_at: u.registration_date,
            status: status.into(),
        }
    }
}

/// Body for POST /users and PUT /users/:id. Full replace, no partial patch:
/// the password is always re-hashed.
#[derive(Debug, Deserialize)]
pub struct UpsertUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body for the bulk delete/block/unblock endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUserIds {
    pub user_ids: Vec<Uuid>,
}
