use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Access tokens are short-lived; there is no refresh mechanism, clients
/// re-authenticate after expiry.
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 5;
pub const RESET_TOKEN_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

pub fn sign_token(user_id: Uuid, secret: &str) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + Duration::minutes(ACCESS_TOKEN_TTL_MINUTES)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Anyhow(anyhow::anyhow!("could not sign token: {}", e)))
}

/// Validates signature and expiry. Every failure collapses into the same
/// unauthenticated error; callers cannot distinguish a forged token from an
/// expired one.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| Error::Unauthenticated("Invalid or expired token. Please log in again.".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn fresh_token_is_accepted() {
        let user_id = Uuid::new_v4();
        let token = sign_token(user_id, SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(
            claims.exp - claims.iat,
            ACCESS_TOKEN_TTL_MINUTES * 60,
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: now - 600,
            exp: now - 300,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let err = verify_token(&token, SECRET).unwrap_err();
        assert!(matches!(err, Error::Unauthenticated(_)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_token(Uuid::new_v4(), SECRET).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = sign_token(Uuid::new_v4(), SECRET).unwrap();
        let mut tampered = token.clone();
        tampered.truncate(token.len() - 2);
        assert!(verify_token(&tampered, SECRET).is_err());
        assert!(verify_token("definitely.not.a-jwt", SECRET).is_err());
    }
}
