//! Hosted identity toolkit via REST API (no SDK dependency)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{AuthError, AuthErrorKind, IdentityProvider, Principal};

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Clone)]
pub struct HostedIdentity {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    project_id: String,
}

/// Subset of the account payload shared by every endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    is_new_user: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl HostedIdentity {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, project_id)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            project_id: project_id.into(),
        }
    }

    async fn call(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, AuthError> {
        let url = format!("{}/accounts:{method}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(AuthError::network)?;

        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        match resp.json::<ErrorEnvelope>().await {
            Ok(envelope) => Err(AuthError::from_provider(envelope.error.message)),
            Err(_) => Err(AuthError {
                kind: AuthErrorKind::Unknown,
                provider_code: Some(format!("HTTP {status}")),
            }),
        }
    }

    async fn account(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<AccountResponse, AuthError> {
        self.call(method, body)
            .await?
            .json::<AccountResponse>()
            .await
            .map_err(|e| AuthError {
                kind: AuthErrorKind::Unknown,
                provider_code: Some(format!("malformed {method} response: {e}")),
            })
    }
}

fn principal(account: AccountResponse, fallback_email: &str) -> Principal {
    Principal {
        id: account.local_id,
        email: account
            .email
            .unwrap_or_else(|| fallback_email.to_string()),
        display_name: account.display_name.filter(|n| !n.trim().is_empty()),
        is_new_user: account.is_new_user,
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentity {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Principal, AuthError> {
        let account = self
            .account(
                "signUp",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;

        // Display name is a second call; the account already exists at this point
        if let Some(id_token) = &account.id_token
            && let Err(e) = self
                .call(
                    "update",
                    json!({
                        "idToken": id_token,
                        "displayName": display_name,
                        "returnSecureToken": false,
                    }),
                )
                .await
        {
            tracing::warn!(error = %e, "Failed to set display name after sign-up");
        }

        let mut principal = principal(account, email);
        principal.display_name = Some(display_name.to_string());
        principal.is_new_user = true;
        Ok(principal)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let account = self
            .account(
                "signInWithPassword",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        Ok(principal(account, email))
    }

    async fn sign_in_with_google(&self, id_token: &str) -> Result<Principal, AuthError> {
        let request_uri = format!("https://{}.firebaseapp.com/__/auth/handler", self.project_id);
        let account = self
            .account(
                "signInWithIdp",
                json!({
                    "postBody": format!("id_token={id_token}&providerId=google.com"),
                    "requestUri": request_uri,
                    "returnSecureToken": true,
                    "returnIdpCredential": true,
                }),
            )
            .await?;
        if account.email.is_none() {
            return Err(AuthError {
                kind: AuthErrorKind::InvalidCredentials,
                provider_code: Some("google account without email".into()),
            });
        }
        Ok(principal(account, ""))
    }

    async fn sign_out(&self, _principal_id: &str) -> Result<(), AuthError> {
        // Provider tokens are never handed to clients; the session JWT is revoked locally
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        self.call(
            "sendOobCode",
            json!({ "requestType": "PASSWORD_RESET", "email": email }),
        )
        .await?;
        Ok(())
    }
}
