//! Single-admin authentication.
//!
//! The application has exactly one principal: the shared admin password is
//! checked at login and a short-lived HS256 token is issued for the fixed
//! `admin` subject. Mutating endpoints require the [`AdminUser`] extractor,
//! which validates the bearer token from the `Authorization` header.

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const ADMIN_SUBJECT: &str = "admin";

/// Claim structure for admin session tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Wrong password")]
    WrongPassword,

    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Authentication token expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Authentication service unavailable")]
    ServiceUnavailable,
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::WrongPassword
            | Self::MissingToken
            | Self::InvalidToken
            | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::TokenCreation(_) | Self::ServiceUnavailable => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = crate::errors::ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub admin_password: String,
    pub jwt_secret: String,
    pub token_lifetime: Duration,
}

/// Issues and validates admin session tokens
#[derive(Clone, Debug)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Checks the shared admin password and issues a token on success.
    pub fn authenticate(&self, password: &str) -> Result<TokenResponse, AuthError> {
        if !constant_time_eq(password.as_bytes(), self.config.admin_password.as_bytes()) {
            return Err(AuthError::WrongPassword);
        }
        self.issue_token()
    }

    fn issue_token(&self) -> Result<TokenResponse, AuthError> {
        let now = Utc::now();
        let expires_in = self.config.token_lifetime.as_secs() as i64;
        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + expires_in,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            expires_in,
        })
    }

    /// Validates a token and extracts its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        if claims.sub != ADMIN_SUBJECT {
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

/// Length-independent byte comparison so login timing does not leak how much
/// of the password prefix matched.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// The authenticated admin principal, extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub subject: String,
}

#[async_trait]
impl<S> axum::extract::FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // The service is injected into request extensions by middleware at
        // router construction time.
        let auth = parts
            .extensions
            .get::<Arc<AuthService>>()
            .cloned()
            .ok_or(AuthError::ServiceUnavailable)?;

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(AuthError::MissingToken)?;

        let claims = auth.validate_token(token)?;
        Ok(AdminUser {
            subject: claims.sub,
        })
    }
}

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Authentication routes
pub fn auth_routes() -> axum::Router<Arc<AuthService>> {
    axum::Router::new()
        .route("/login", axum::routing::post(login_handler))
        .layer(DefaultBodyLimit::max(1024 * 16))
}

/// Login handler
async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let tokens = auth_service.authenticate(&credentials.password)?;
    info!("Admin logged in");
    Ok(Json(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn service() -> AuthService {
        AuthService::new(AuthConfig {
            admin_password: "hunter2".into(),
            jwt_secret: "test_signing_secret_with_enough_length".into(),
            token_lifetime: Duration::from_secs(3600),
        })
    }

    #[test]
    fn login_round_trip() {
        let auth = service();
        let tokens = auth.authenticate("hunter2").unwrap();
        assert_eq!(tokens.token_type, "bearer");
        assert_eq!(tokens.expires_in, 3600);

        let claims = auth.validate_token(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, "admin");
    }

    #[test]
    fn wrong_password_rejected() {
        let auth = service();
        assert_matches!(auth.authenticate("guess"), Err(AuthError::WrongPassword));
        assert_matches!(auth.authenticate(""), Err(AuthError::WrongPassword));
    }

    #[test]
    fn garbage_token_rejected() {
        let auth = service();
        assert_matches!(
            auth.validate_token("not-a-jwt"),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn token_from_other_secret_rejected() {
        let auth = service();
        let other = AuthService::new(AuthConfig {
            admin_password: "hunter2".into(),
            jwt_secret: "a_completely_different_signing_secret".into(),
            token_lifetime: Duration::from_secs(3600),
        });
        let tokens = other.authenticate("hunter2").unwrap();
        assert_matches!(
            auth.validate_token(&tokens.access_token),
            Err(AuthError::InvalidToken)
        );
    }
}
