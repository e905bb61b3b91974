//! Restaurant owner JWT authentication for the management API

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

use crate::state::AppState;

/// JWT claims for an owner session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantClaims {
    /// Restaurant ID
    pub sub: String,
    /// Identity provider principal
    pub principal: String,
    pub email: String,
    /// Token id, used for sign-out revocation
    pub jti: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated restaurant owner extracted from JWT
#[derive(Debug, Clone)]
pub struct TenantIdentity {
    pub tenant_id: String,
    pub principal_id: String,
    pub email: String,
    pub jti: String,
    pub exp: usize,
}

impl From<TenantClaims> for TenantIdentity {
    fn from(claims: TenantClaims) -> Self {
        Self {
            tenant_id: claims.sub,
            principal_id: claims.principal,
            email: claims.email,
            jti: claims.jti,
            exp: claims.exp,
        }
    }
}

pub const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a session token for a restaurant owner
pub fn create_token(
    tenant_id: &str,
    principal_id: &str,
    email: &str,
    secret: &str,
) -> Result<(String, TenantClaims), jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = TenantClaims {
        sub: tenant_id.to_string(),
        principal: principal_id.to_string(),
        email: email.to_string(),
        jti: uuid::Uuid::new_v4().simple().to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, claims))
}

/// Decode and validate signature + expiry
pub fn verify_token(token: &str, secret: &str) -> Result<TenantClaims, AppError> {
    jsonwebtoken::decode::<TenantClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid session token"),
        }
    })
}

/// Extract the bearer token from an `Authorization` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that verifies the owner JWT from the Authorization header
pub async fn tenant_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let backend = state.backend()?;

    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(AppError::not_authenticated)?;

    let identity = backend.auth.authenticate(token)?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_token_roundtrip() {
        let (token, claims) = create_token("r1", "p1", "owner@acme.test", "secret").unwrap();
        let decoded = verify_token(&token, "secret").unwrap();
        assert_eq!(decoded.sub, "r1");
        assert_eq!(decoded.principal, "p1");
        assert_eq!(decoded.jti, claims.jti);

        let err = verify_token(&token, "other-secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
        assert_eq!(
            verify_token("garbage", "secret").unwrap_err().code,
            ErrorCode::TokenInvalid
        );
    }

    #[test]
    fn test_expired_token() {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = TenantClaims {
            sub: "r1".into(),
            principal: "p1".into(),
            email: "owner@acme.test".into(),
            jti: "j".into(),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert_eq!(
            verify_token(&token, "secret").unwrap_err().code,
            ErrorCode::TokenExpired
        );
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
    }
}
