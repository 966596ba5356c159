use thiserror::Error;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Algorithm, Validation};
use std::env;
use tracing::{debug, error, info};
use chrono::{Duration, Utc};
use crate::auth::Claims;

/// Issuer used when `JWT_ISSUER` is not set
pub const DEFAULT_ISSUER: &str = "copd-monitor-api";

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),
}

fn jwt_secret() -> Result<String, SecurityError> {
    env::var("JWT_SECRET").map_err(|e| {
        error!("JWT_SECRET environment variable not found: {}", e);
        SecurityError::ConfigError("JWT_SECRET environment variable not found".to_string())
    })
}

fn jwt_issuer() -> String {
    env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string())
}

/// Lifetime of issued tokens, from `ACCESS_TOKEN_EXPIRATION_MINUTES` (default 60)
fn expiration() -> Duration {
    let minutes = env::var("ACCESS_TOKEN_EXPIRATION_MINUTES")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(60);
    Duration::minutes(minutes)
}

/// Generate a new access token for a user
pub fn generate_token(user_id: &str) -> Result<String, SecurityError> {
    let secret = jwt_secret()?;

    let now = Utc::now();
    let expires_at = now + expiration();

    let claims = Claims {
        sub: user_id.to_string(),
        iss: jwt_issuer(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    ).map_err(|e| {
        error!("Failed to encode JWT token: {}", e);
        SecurityError::TokenValidation(e.to_string())
    })?;

    // Never log the token itself
    info!("Generated access token for user {}", user_id);
    debug!("Token expiration: {}", expires_at);

    Ok(token)
}

/// Validate a JWT token and return the decoded claims
pub fn validate_token(token: &str) -> Result<Claims, SecurityError> {
    let secret = jwt_secret()?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_issuer(&[jwt_issuer()]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => SecurityError::InvalidIssuer,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => SecurityError::TokenValidation("Invalid signature".to_string()),
            _ => SecurityError::TokenValidation(e.to_string()),
        }
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_env() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_only");
        std::env::set_var("JWT_ISSUER", "test-issuer");
    }

    #[test]
    fn test_generate_and_validate_token() {
        setup_test_env();

        let token = generate_token("patient-123").unwrap();
        assert!(!token.is_empty());

        let claims = validate_token(&token).unwrap();
        assert_eq!(claims.sub, "patient-123");
        assert_eq!(claims.iss, "test-issuer");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_expiration() {
        setup_test_env();

        // Well past the default leeway
        let claims = Claims {
            sub: "patient-456".to_string(),
            iss: "test-issuer".to_string(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_only".as_bytes()),
        ).unwrap();

        match validate_token(&token) {
            Err(SecurityError::TokenExpired) => {}
            other => panic!("Expected TokenExpired but got: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        setup_test_env();

        let claims = Claims {
            sub: "patient-789".to_string(),
            iss: "someone-else".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_only".as_bytes()),
        ).unwrap();

        assert!(matches!(validate_token(&token), Err(SecurityError::InvalidIssuer)));
    }

    #[test]
    fn test_invalid_token() {
        setup_test_env();

        match validate_token("invalid.token.format") {
            Err(SecurityError::InvalidToken) | Err(SecurityError::TokenValidation(_)) => {}
            other => panic!("Expected InvalidToken or TokenValidation error, got {:?}", other),
        }
    }
}
