//! JWT implementation of the `TokenVerifier` port.
//!
//! Tokens are issued by the external identity service; this side only
//! validates signature, expiry, and issuer, and extracts the principal.

use async_trait::async_trait;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bartr_core::ports::{AuthError, Principal, TokenVerifier};

/// JWT verifier configuration.
#[derive(Debug, Clone)]
pub struct JwtVerifierConfig {
    pub secret: String,
    pub issuer: String,
}

impl Default for JwtVerifierConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            issuer: "bartr-identity".to_string(),
        }
    }
}

/// Claims the identity service puts in its tokens.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    #[serde(default)]
    email: Option<String>,
    exp: i64,
    iss: String,
}

pub struct JwtTokenVerifier {
    config: JwtVerifierConfig,
    decoding_key: DecodingKey,
}

impl JwtTokenVerifier {
    pub fn new(config: JwtVerifierConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            decoding_key,
        }
    }

    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-in-production".to_string());

        if secret == "change-me-in-production" {
            tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
        }

        let config = JwtVerifierConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "bartr-identity".to_string()),
        };
        Self::new(config)
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        let user_id = Uuid::parse_str(&token_data.claims.sub)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(Principal {
            user_id,
            email: token_data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn test_config() -> JwtVerifierConfig {
        JwtVerifierConfig {
            secret: "test-secret-key".to_string(),
            issuer: "test-issuer".to_string(),
        }
    }

    fn mint(config: &JwtVerifierConfig, sub: &str, exp: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            email: Some("trader@example.com".to_string()),
            exp,
            iss: config.issuer.clone(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn verifies_a_valid_token() {
        let config = test_config();
        let verifier = JwtTokenVerifier::new(config.clone());
        let user_id = Uuid::new_v4();
        let exp = (chrono::Utc::now() + chrono::TimeDelta::hours(1)).timestamp();

        let principal = verifier
            .verify(&mint(&config, &user_id.to_string(), exp))
            .await
            .unwrap();

        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.email.as_deref(), Some("trader@example.com"));
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let verifier = JwtTokenVerifier::new(test_config());
        let result = verifier.verify("not-a-token").await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn rejects_expired_tokens() {
        let config = test_config();
        let verifier = JwtTokenVerifier::new(config.clone());
        let exp = (chrono::Utc::now() - chrono::TimeDelta::hours(1)).timestamp();

        let result = verifier
            .verify(&mint(&config, &Uuid::new_v4().to_string(), exp))
            .await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn rejects_wrong_issuer() {
        let verifier = JwtTokenVerifier::new(test_config());
        let other = JwtVerifierConfig {
            secret: "test-secret-key".to_string(),
            issuer: "someone-else".to_string(),
        };
        let exp = (chrono::Utc::now() + chrono::TimeDelta::hours(1)).timestamp();

        let result = verifier
            .verify(&mint(&other, &Uuid::new_v4().to_string(), exp))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }
}
