use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::users::repo_types::User;

const USER_COLUMNS: &str = "id, name, email, password_hash, is_blocked, \
     last_login, registration_date, reset_token, reset_token_expiry";

fn map_insert_error(e: sqlx::Error) -> ApiError {
    match &e {
        // The unique index on email is the authority for duplicate detection;
        // the application-level pre-check only shapes the common path.
        sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::DuplicateEmail,
        _ => ApiError::Database(e),
    }
}

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password and default state.
    pub async fn insert(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
        .map_err(map_insert_error)?;
        Ok(user)
    }

    /// Full replace of name, email and password hash. Returns `None` when the
    /// id does not exist.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = $2, email = $3, password_hash = $4 \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(db)
        .await
        .map_err(map_insert_error)?;
        Ok(user)
    }

    pub async fn touch_last_login(
        db: &PgPool,
        id: Uuid,
        when: OffsetDateTime,
    ) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(when)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Store a fresh reset token pair, overwriting any prior one. One active
    /// token per user.
    pub async fn set_reset_token(
        db: &PgPool,
        id: Uuid,
        token: &str,
        expiry: OffsetDateTime,
    ) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET reset_token = $2, reset_token_expiry = $3 WHERE id = $1")
            .bind(id)
            .bind(token)
            .bind(expiry)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Consume a reset token: replace the hash and clear the pair in one
    /// statement. The expiry guard lives in SQL, so an expired token and a
    /// nonexistent one are the same thing (zero rows). Returns whether a row
    /// was updated.
    pub async fn reset_password(
        db: &PgPool,
        token: &str,
        new_hash: &str,
    ) -> Result<bool, ApiError> {
        let result = sqlx::query(
            "UPDATE users \
             SET password_hash = $2, reset_token = NULL, reset_token_expiry = NULL \
             WHERE reset_token = $1 AND reset_token_expiry > now()",
        )
        .bind(token)
        .bind(new_hash)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Block or unblock every matching id. Ids with no row are silently
    /// skipped. Returns the number of rows touched.
    pub async fn set_blocked(db: &PgPool, ids: &[Uuid], blocked: bool) -> Result<u64, ApiError> {
        let result = sqlx::query("UPDATE users SET is_blocked = $2 WHERE id = ANY($1)")
            .bind(ids)
            .bind(blocked)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Hard delete of every matching id. Returns the number of rows removed.
    pub async fn delete_many(db: &PgPool, ids: &[Uuid]) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(ids)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_all(db: &PgPool) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY registration_date"
        ))
        .fetch_all(db)
        .await?;
        Ok(users)
    }
}
