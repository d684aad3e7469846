use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, StatusCode},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

/// JWT payload for a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,     // user ID
    pub email: String, // user email
    pub iat: usize,    // issued at (unix timestamp)
    pub exp: usize,    // expires at (unix timestamp)
    pub iss: String,   // issuer
    pub aud: String,   // audience
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    /// Sign a session token carrying the user's id and email. HMAC (HS256),
    /// bounded lifetime. There is no revocation list: once issued, a token
    /// stays valid until `exp` even if the account is blocked or deleted.
    pub fn sign(&self, user_id: Uuid, email: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Verify signature, issuer, audience and expiry.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// The session token travels either as a bearer header or as the HTTP-only
/// `token` cookie set by the frontend.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
        {
            return Some(token.to_string());
        }
    }

    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|c| c.strip_prefix("token="))
                .map(str::to_string)
        })
}

/// Extracts and validates the session token, returning the caller's user ID.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let token = extract_token(&parts.headers).ok_or((
            StatusCode::UNAUTHORIZED,
            "Missing bearer token or token cookie".to_string(),
        ))?;

        let claims = match keys.verify(&token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired token");
                return Err((
                    StatusCode::UNAUTHORIZED,
                    "Invalid or expired token".to_string(),
                ));
            }
        };

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, "jo@example.com").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "jo@example.com");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[tokio::test]
    async fn expiry_matches_configured_ttl() {
        let keys = make_keys();
        let token = keys.sign(Uuid::new_v4(), "jo@example.com").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        // fake() config uses a 5 minute TTL
        assert_eq!(claims.exp - claims.iat, 5 * 60);
    }

    #[tokio::test]
    async fn verify_rejects_foreign_issuer_and_audience() {
        let keys = make_keys();
        let mut foreign = make_keys();
        foreign.issuer = "someone-else".into();
        foreign.audience = "their-users".into();
        let token = foreign.sign(Uuid::new_v4(), "jo@example.com").expect("sign");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_tampered_signature() {
        let keys = make_keys();
        let token = keys.sign(Uuid::new_v4(), "jo@example.com").expect("sign");
        let mut forged = token.clone();
        forged.pop();
        forged.push(if token.ends_with('x') { 'y' } else { 'x' });
        assert!(keys.verify(&forged).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_expired_token() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "jo@example.com".into(),
            iat: (now - TimeDuration::hours(3)).unix_timestamp() as usize,
            exp: (now - TimeDuration::hours(2)).unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn token_is_read_from_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn token_is_read_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def.ghi; lang=en"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        headers.insert(header::COOKIE, HeaderValue::from_static("token=from-cookie"));
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn missing_credentials_yield_none() {
        assert!(extract_token(&HeaderMap::new()).is_none());
    }
}
