//! Authentication for the COPD Monitor API
//!
//! Bearer JWTs identify the user; the `sub` claim is the user id every
//! document path is built from.

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

#[cfg(feature = "with-axum")]
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};
#[cfg(feature = "with-axum")]
use tracing::{debug, warn};

// JWT handling
pub mod token;

/// User id attached to requests when auth is bypassed in development
pub const DEV_USER_ID: &str = "dev-user";

/// Authentication claims for JSON Web Tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// The caller of an authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AuthenticatedUser {
    pub user_id: String,
}

#[cfg(feature = "with-axum")]
fn unauthorized() -> Response {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .body(Body::empty())
        .unwrap_or_default()
}

/// Whether `BYPASS_AUTH` is honoured; only in debug builds
pub fn auth_bypass_enabled() -> bool {
    cfg!(debug_assertions) && std::env::var("BYPASS_AUTH").is_ok()
}

/// Authentication middleware for protected routes.
///
/// Inserts an [`AuthenticatedUser`] into the request extensions or answers 401.
#[cfg(feature = "with-axum")]
pub async fn auth_middleware(mut req: Request<Body>, next: Next) -> Response {
    if auth_bypass_enabled() {
        debug!("Auth bypass enabled in development mode");
        req.extensions_mut().insert(AuthenticatedUser {
            user_id: DEV_USER_ID.to_string(),
        });
        return next.run(req).await;
    }

    let request_path = req.uri().path().to_string();

    let auth_header = match req.headers().get(header::AUTHORIZATION).map(|v| v.to_str()) {
        Some(Ok(value)) => value,
        Some(Err(_)) => {
            warn!("Invalid Authorization header format on {}", request_path);
            return unauthorized();
        }
        None => {
            debug!("Missing Authorization header on {}", request_path);
            return unauthorized();
        }
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(token) => token,
        None => {
            warn!("Authorization header does not contain Bearer token");
            return unauthorized();
        }
    };

    match token::validate_token(token) {
        Ok(claims) => {
            debug!("Token validated for user {} on {}", claims.sub, request_path);
            req.extensions_mut().insert(AuthenticatedUser {
                user_id: claims.sub.clone(),
            });
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(token::SecurityError::TokenExpired) => {
            warn!("Expired token on {}", request_path);
            unauthorized()
        }
        Err(e) => {
            warn!("Token validation failed on {}: {}", request_path, e);
            unauthorized()
        }
    }
}
