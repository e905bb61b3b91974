//! Sign-up / sign-in orchestration
//!
//! validate → identity provider → tenant directory → login tracking → session token

use std::sync::Arc;

use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::Restaurant;
use shared::validation::{validate_email, validate_password, validate_restaurant_name};

use crate::auth::sessions::SessionRevocations;
use crate::auth::tenant_auth::{TenantIdentity, create_token, verify_token};
use crate::error::ServiceResult;
use crate::identity::{AuthErrorKind, IdentityProvider, Principal};
use crate::services::tenants::TenantService;

/// Sign-in accepts anything the provider might, down to this length
const MIN_SIGN_IN_PASSWORD_LEN: usize = 6;

/// Issued session
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    /// Unix seconds
    pub expires_at: usize,
    pub email: String,
    pub restaurant: Restaurant,
    /// A restaurant was created by this call
    pub is_new_restaurant: bool,
}

#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    tenants: TenantService,
    sessions: SessionRevocations,
    jwt_secret: Arc<str>,
}

impl AuthService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        tenants: TenantService,
        sessions: SessionRevocations,
        jwt_secret: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            identity,
            tenants,
            sessions,
            jwt_secret: jwt_secret.into(),
        }
    }

    pub fn sessions(&self) -> &SessionRevocations {
        &self.sessions
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        restaurant_name: &str,
    ) -> ServiceResult<AuthSession> {
        let email = validate_email(email)?;
        validate_password(password)?;
        let name = validate_restaurant_name(restaurant_name)?;

        let principal = self
            .identity
            .sign_up(&email, password, &name)
            .await
            .map_err(AppError::from)?;
        let (restaurant, created) = self
            .tenants
            .ensure_for_principal(&principal, Some(&name))
            .await?;
        self.tenants.track_login(&principal, Some(&restaurant.name)).await;
        tracing::info!(tenant_id = %restaurant.id, "Owner signed up");
        self.issue(&principal, restaurant, created)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<AuthSession> {
        let email = validate_email(email)?;
        if password.chars().count() < MIN_SIGN_IN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "Password must be at least {MIN_SIGN_IN_PASSWORD_LEN} characters"
            ))
            .with_detail("field", "password")
            .into());
        }

        let principal = self.identity.sign_in(&email, password).await.map_err(AppError::from)?;
        // Sign-up may have stopped between the provider and the directory
        let (restaurant, created) = self.tenants.ensure_for_principal(&principal, None).await?;
        self.tenants.track_login(&principal, Some(&restaurant.name)).await;
        self.issue(&principal, restaurant, created)
    }

    /// Exchange a Google ID token; first sign-in creates the restaurant.
    pub async fn sign_in_with_google(&self, id_token: &str) -> ServiceResult<AuthSession> {
        let id_token = id_token.trim();
        if id_token.is_empty() {
            return Err(AppError::new(ErrorCode::RequiredField)
                .with_detail("field", "id_token")
                .into());
        }

        let principal = self.identity.sign_in_with_google(id_token).await.map_err(AppError::from)?;
        let (restaurant, created) = self.tenants.ensure_for_principal(&principal, None).await?;
        self.tenants.track_login(&principal, Some(&restaurant.name)).await;
        if created {
            tracing::info!(tenant_id = %restaurant.id, "Owner signed up with Google");
        }
        self.issue(&principal, restaurant, created)
    }

    /// Revoke the session. The provider-side sign-out is best-effort.
    pub async fn sign_out(&self, identity: &TenantIdentity) {
        self.sessions.revoke(&identity.jti, identity.exp);
        if let Err(e) = self.identity.sign_out(&identity.principal_id).await {
            tracing::warn!(
                principal = %identity.principal_id,
                error = %e,
                "Provider sign-out failed"
            );
        }
    }

    /// Unknown addresses succeed silently so the endpoint does not reveal accounts.
    pub async fn reset_password(&self, email: &str) -> ServiceResult<()> {
        let email = validate_email(email)?;
        match self.identity.reset_password(&email).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind == AuthErrorKind::InvalidCredentials => {
                tracing::debug!(error = %e, "Password reset for unknown account");
                Ok(())
            }
            Err(e) => Err(AppError::from(e).into()),
        }
    }

    /// Verify a session token and reject revoked ones.
    pub fn authenticate(&self, token: &str) -> Result<TenantIdentity, AppError> {
        let claims = verify_token(token, &self.jwt_secret)?;
        if self.sessions.is_revoked(&claims.jti) {
            return Err(AppError::invalid_token("Session has been signed out"));
        }
        Ok(claims.into())
    }

    fn issue(
        &self,
        principal: &Principal,
        restaurant: Restaurant,
        is_new_restaurant: bool,
    ) -> ServiceResult<AuthSession> {
        let (token, claims) =
            create_token(&restaurant.id, &principal.id, &principal.email, &self.jwt_secret)
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to sign session token");
                    AppError::backend_failure()
                })?;
        Ok(AuthSession {
            token,
            expires_at: claims.exp,
            email: principal.email.clone(),
            restaurant,
            is_new_restaurant,
        })
    }
}
