use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
///
/// Carries the password hash and any outstanding reset token, so it must
/// never be returned to callers directly. Use [`crate::users::dto::UserDto`]
/// for anything that leaves the process.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_blocked: bool,
    pub last_login: Option<OffsetDateTime>,
    pub registration_date: OffsetDateTime,
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<OffsetDateTime>,
}

impl User {
    /// An outstanding reset token only counts while its expiry is in the
    /// future. Expired or half-set pairs are the same as no token.
    pub fn reset_token_active(&self, now: OffsetDateTime) -> bool {
        match (&self.reset_token, self.reset_token_expiry) {
            (Some(_), Some(expiry)) => expiry > now,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn user_with_reset(
        token: Option<&str>,
        expiry: Option<OffsetDateTime>,
    ) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Jo Doe".into(),
            email: "jo@example.com".into(),
            password_hash: "hash".into(),
            is_blocked: false,
            last_login: None,
            registration_date: OffsetDateTime::now_utc(),
            reset_token: token.map(str::to_string),
            reset_token_expiry: expiry,
        }
    }

    #[test]
    fn live_token_is_active() {
        let now = OffsetDateTime::now_utc();
        let u = user_with_reset(Some("tok"), Some(now + Duration::minutes(30)));
        assert!(u.reset_token_active(now));
    }

    #[test]
    fn expired_token_counts_as_absent() {
        let now = OffsetDateTime::now_utc();
        let u = user_with_reset(Some("tok"), Some(now - Duration::seconds(1)));
        assert!(!u.reset_token_active(now));
    }

    #[test]
    fn missing_pair_is_inactive() {
        let now = OffsetDateTime::now_utc();
        assert!(!user_with_reset(None, None).reset_token_active(now));
        assert!(!user_with_reset(Some("tok"), None).reset_token_active(now));
    }
}
