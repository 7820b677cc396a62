use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;

/// Token claims issued by the external identity provider. `sub` is the
/// opaque user id; profile fields ride along so the local user row can be
/// materialized on first sight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<i64>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: String, email: String, org_id: Option<i64>) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub,
            org_id,
            email,
            first_name: None,
            last_name: None,
            image_url: None,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        let now = Utc::now();
        Claims {
            sub: "user_2abc".to_string(),
            org_id: Some(1),
            email: "ada@example.com".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            image_url: None,
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        }
    }

    #[test]
    fn token_round_trips() {
        let token = generate_jwt(&claims(), "test-secret").unwrap();
        let decoded = validate_jwt(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, "user_2abc");
        assert_eq!(decoded.org_id, Some(1));
        assert_eq!(decoded.email, "ada@example.com");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_jwt(&claims(), "test-secret").unwrap();
        assert!(matches!(
            validate_jwt(&token, "other-secret"),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            generate_jwt(&claims(), ""),
            Err(JwtError::InvalidSecret)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut expired = claims();
        expired.exp = (Utc::now() - Duration::hours(2)).timestamp();
        expired.iat = (Utc::now() - Duration::hours(3)).timestamp();
        let token = generate_jwt(&expired, "test-secret").unwrap();
        assert!(validate_jwt(&token, "test-secret").is_err());
    }
}
