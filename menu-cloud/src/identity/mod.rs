//! Identity Gateway
//!
//! Email/password and Google sign-in are delegated to an external identity
//! provider. Provider-specific failure codes are folded into the closed
//! [`AuthErrorKind`] set; the raw code stays inside [`AuthError`] for logs.

pub mod hosted;
pub mod memory;

pub use hosted::HostedIdentity;
pub use memory::MemoryIdentity;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use std::fmt;
use thiserror::Error;

/// Authenticated identity returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    /// First sign-in through a federated provider
    pub is_new_user: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    InvalidCredentials,
    AccountExists,
    TooManyAttempts,
    NetworkFailure,
    PopupCancelled,
    Unknown,
}

impl AuthErrorKind {
    pub fn error_code(self) -> ErrorCode {
        match self {
            AuthErrorKind::InvalidCredentials => ErrorCode::InvalidCredentials,
            AuthErrorKind::AccountExists => ErrorCode::AccountExists,
            AuthErrorKind::TooManyAttempts => ErrorCode::TooManyAttempts,
            AuthErrorKind::NetworkFailure => ErrorCode::AuthNetworkFailure,
            AuthErrorKind::PopupCancelled => ErrorCode::SignInCancelled,
            AuthErrorKind::Unknown => ErrorCode::AuthUnknown,
        }
    }

    /// Fold a provider error code into a kind.
    ///
    /// Accepts both REST codes (`EMAIL_EXISTS`, `INVALID_PASSWORD : ...`)
    /// and SDK-style codes (`auth/email-already-in-use`).
    pub fn from_provider_code(code: &str) -> Self {
        // REST messages may carry a description after " : "
        let code = code.split_whitespace().next().unwrap_or("");
        match code {
            "EMAIL_EXISTS"
            | "auth/email-already-in-use"
            | "auth/account-exists-with-different-credential" => AuthErrorKind::AccountExists,

            "INVALID_PASSWORD"
            | "EMAIL_NOT_FOUND"
            | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_EMAIL"
            | "INVALID_IDP_RESPONSE"
            | "USER_DISABLED"
            | "auth/wrong-password"
            | "auth/user-not-found"
            | "auth/invalid-credential"
            | "auth/user-disabled" => AuthErrorKind::InvalidCredentials,

            "TOO_MANY_ATTEMPTS_TRY_LATER" | "auth/too-many-requests" => {
                AuthErrorKind::TooManyAttempts
            }

            "auth/network-request-failed" => AuthErrorKind::NetworkFailure,

            "auth/popup-closed-by-user"
            | "auth/cancelled-popup-request"
            | "auth/popup-blocked" => AuthErrorKind::PopupCancelled,

            _ => AuthErrorKind::Unknown,
        }
    }
}

/// Normalised provider failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{:?}{}", .kind, code_suffix(.provider_code))]
pub struct AuthError {
    pub kind: AuthErrorKind,
    /// Raw provider code, for diagnostics only
    pub provider_code: Option<String>,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind) -> Self {
        Self {
            kind,
            provider_code: None,
        }
    }

    pub fn from_provider(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            kind: AuthErrorKind::from_provider_code(&code),
            provider_code: Some(code),
        }
    }

    pub fn network(cause: impl fmt::Display) -> Self {
        Self {
            kind: AuthErrorKind::NetworkFailure,
            provider_code: Some(cause.to_string()),
        }
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(" ({c})"))
        .unwrap_or_default()
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        if let Some(code) = &e.provider_code {
            tracing::info!(
                kind = ?e.kind,
                provider_code = %code,
                "Identity provider rejected request"
            );
        }
        AppError::new(e.kind.error_code())
    }
}

/// External identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Create an account and attach `display_name` to it.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Principal, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError>;

    /// Exchange a Google ID token obtained by the client.
    async fn sign_in_with_google(&self, id_token: &str) -> Result<Principal, AuthError>;

    async fn sign_out(&self, principal_id: &str) -> Result<(), AuthError>;

    async fn reset_password(&self, email: &str) -> Result<(), AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_codes_fold_into_closed_set() {
        use AuthErrorKind::*;
        let cases = [
            ("EMAIL_EXISTS", AccountExists),
            ("INVALID_LOGIN_CREDENTIALS", InvalidCredentials),
            ("EMAIL_NOT_FOUND", InvalidCredentials),
            ("TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled", TooManyAttempts),
            ("auth/popup-closed-by-user", PopupCancelled),
            ("auth/network-request-failed", NetworkFailure),
            ("OPERATION_NOT_ALLOWED", Unknown),
            ("", Unknown),
        ];
        for (code, expected) in cases {
            assert_eq!(AuthErrorKind::from_provider_code(code), expected, "{code}");
        }
    }

    #[test]
    fn provider_code_never_reaches_the_user() {
        let app: AppError = AuthError::from_provider("INVALID_PASSWORD").into();
        assert_eq!(app.code, ErrorCode::InvalidCredentials);
        assert!(!app.message.contains("INVALID_PASSWORD"));
        assert!(app.details.is_none());
    }

    #[test]
    fn display_keeps_provider_code_for_logs() {
        let err = AuthError::from_provider("EMAIL_EXISTS");
        assert_eq!(err.to_string(), "AccountExists (EMAIL_EXISTS)");
        assert_eq!(AuthError::new(AuthErrorKind::Unknown).to_string(), "Unknown");
    }
}
