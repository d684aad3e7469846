use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// A freshly issued password-reset token and its expiry.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

/// Issue a new reset token valid for `ttl_minutes` from now.
///
/// The value is a v4 UUID drawn from the OS CSPRNG, so it is globally unique
/// and unguessable. Storing it on the user row overwrites any prior token:
/// one active token per user.
pub fn issue(ttl_minutes: i64) -> ResetToken {
    ResetToken {
        token: Uuid::new_v4().to_string(),
        expires_at: OffsetDateTime::now_utc() + Duration::minutes(ttl_minutes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_across_issuances() {
        let a = issue(30);
        let b = issue(30);
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn token_is_a_full_entropy_uuid() {
        let t = issue(30);
        let parsed = Uuid::parse_str(&t.token).expect("token should be a uuid");
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn expiry_is_ttl_minutes_from_now() {
        let before = OffsetDateTime::now_utc();
        let t = issue(30);
        let after = OffsetDateTime::now_utc();
        assert!(t.expires_at >= before + Duration::minutes(30));
        assert!(t.expires_at <= after + Duration::minutes(30));
    }
}
