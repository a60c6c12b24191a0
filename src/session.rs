//! Session tokens
//!
//! Admin sessions are HS256 JWTs carried in an HttpOnly cookie. The token
//! only holds a reference to the user (`sub`); the middleware re-fetches
//! the full record from storage on every request, so a token for a user
//! that no longer resolves is worthless.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::errors::Result;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sg_session";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Internal user id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
}

impl SessionService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.session.secret, config.session.ttl_secs)
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_secs as i64)).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let data = decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() {
        let service = SessionService::new("test-secret", 3600);
        let token = service.issue("user-1").unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let issuer = SessionService::new("secret-a", 3600);
        let verifier = SessionService::new("secret-b", 3600);
        let token = issuer.issue("user-1").unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let service = SessionService::new("test-secret", 3600);
        assert!(service.verify("not-a-token").is_err());
    }
}
