//! In-process identity provider
//!
//! Passwords are argon2-hashed. Google sign-in accepts ID tokens that were
//! registered up front with [`MemoryIdentity::with_google_account`].

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, Mutex};

use super::{AuthError, AuthErrorKind, IdentityProvider, Principal};
use crate::util::{hash_password, verify_password};

struct Account {
    id: String,
    email: String,
    password_hash: Option<String>,
    display_name: Option<String>,
}

struct GoogleAccount {
    email: String,
    display_name: Option<String>,
}

#[derive(Clone, Default)]
pub struct MemoryIdentity {
    /// email → account
    accounts: Arc<DashMap<String, Account>>,
    /// id token → google profile
    google_tokens: Arc<DashMap<String, GoogleAccount>>,
    reset_requests: Arc<Mutex<Vec<String>>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_google_account(
        self,
        id_token: impl Into<String>,
        email: impl Into<String>,
        display_name: Option<&str>,
    ) -> Self {
        self.google_tokens.insert(
            id_token.into(),
            GoogleAccount {
                email: email.into(),
                display_name: display_name.map(str::to_string),
            },
        );
        self
    }

    /// Emails a reset was requested for, oldest first
    pub fn reset_requests(&self) -> Vec<String> {
        self.reset_requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn principal(account: &Account, is_new_user: bool) -> Principal {
        Principal {
            id: account.id.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            is_new_user,
        }
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Principal, AuthError> {
        let hash = hash_password(password).map_err(|e| AuthError {
            kind: AuthErrorKind::Unknown,
            provider_code: Some(e.to_string()),
        })?;

        match self.accounts.entry(email.to_string()) {
            Entry::Occupied(_) => Err(AuthError::from_provider("EMAIL_EXISTS")),
            Entry::Vacant(slot) => {
                let account = slot.insert(Account {
                    id: shared::util::new_record_id(),
                    email: email.to_string(),
                    password_hash: Some(hash),
                    display_name: Some(display_name.to_string()),
                });
                Ok(Self::principal(&account, true))
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let account = self
            .accounts
            .get(email)
            .ok_or_else(|| AuthError::from_provider("EMAIL_NOT_FOUND"))?;
        let matches = account
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(password, hash));
        if !matches {
            return Err(AuthError::from_provider("INVALID_PASSWORD"));
        }
        Ok(Self::principal(&account, false))
    }

    async fn sign_in_with_google(&self, id_token: &str) -> Result<Principal, AuthError> {
        let google = self
            .google_tokens
            .get(id_token)
            .ok_or_else(|| AuthError::from_provider("INVALID_IDP_RESPONSE"))?;

        match self.accounts.entry(google.email.clone()) {
            Entry::Occupied(existing) => Ok(Self::principal(existing.get(), false)),
            Entry::Vacant(slot) => {
                let account = slot.insert(Account {
                    id: shared::util::new_record_id(),
                    email: google.email.clone(),
                    password_hash: None,
                    display_name: google.display_name.clone(),
                });
                Ok(Self::principal(&account, true))
            }
        }
    }

    async fn sign_out(&self, _principal_id: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        if !self.accounts.contains_key(email) {
            return Err(AuthError::from_provider("EMAIL_NOT_FOUND"));
        }
        if let Ok(mut requests) = self.reset_requests.lock() {
            requests.push(email.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let identity = MemoryIdentity::new();
        let created = identity
            .sign_up("chef@acme.com", "Secret123", "Acme")
            .await
            .unwrap();
        assert!(created.is_new_user);
        assert_eq!(created.display_name.as_deref(), Some("Acme"));

        let again = identity.sign_in("chef@acme.com", "Secret123").await.unwrap();
        assert_eq!(again.id, created.id);
        assert!(!again.is_new_user);

        let wrong = identity.sign_in("chef@acme.com", "nope").await.unwrap_err();
        assert_eq!(wrong.kind, AuthErrorKind::InvalidCredentials);
    }

    #[tokio::test]
    async fn duplicate_email_is_account_exists() {
        let identity = MemoryIdentity::new();
        identity.sign_up("a@b.com", "Secret123", "A").await.unwrap();
        let err = identity.sign_up("a@b.com", "Other123", "B").await.unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::AccountExists);
    }

    #[tokio::test]
    async fn google_first_sign_in_creates_account() {
        let identity =
            MemoryIdentity::new().with_google_account("tok", "g@gmail.com", Some("Gina"));
        let first = identity.sign_in_with_google("tok").await.unwrap();
        assert!(first.is_new_user);
        let second = identity.sign_in_with_google("tok").await.unwrap();
        assert_eq!(first.id, second.id);
        assert!(!second.is_new_user);

        // federated accounts have no password
        let err = identity.sign_in("g@gmail.com", "anything").await.unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::InvalidCredentials);
    }

    #[tokio::test]
    async fn reset_is_recorded() {
        let identity = MemoryIdentity::new();
        identity.sign_up("a@b.com", "Secret123", "A").await.unwrap();
        identity.reset_password("a@b.com").await.unwrap();
        assert_eq!(identity.reset_requests(), ["a@b.com"]);
        assert!(identity.reset_password("x@y.com").await.is_err());
    }
}
