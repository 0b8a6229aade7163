//! Identity Toolkit REST client.
//!
//! Keeps the signed-in user in memory and mirrors it to the key-value store
//! under [`CREDENTIAL_KEY`] so a later process can pick it up again.

use super::{Credential, IdentityProvider, ProviderCredential, SignInMethod};
use crate::error::{AuthError, AuthErrorCode};
use crate::observer::{lock, Observers, Subscription};
use crate::storage::KeyValueStore;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Durable key holding the serialized current user
pub const CREDENTIAL_KEY: &str = "identityCredential";

/// Tokens expiring within this many seconds are refreshed before use
const REFRESH_SKEW_SECS: i64 = 60;

/// Redirect URI sent with IdP exchanges; the service only checks it is well formed
const IDP_REQUEST_URI: &str = "http://localhost";

#[derive(Debug, Clone)]
pub struct FirebaseSettings {
    pub api_key: String,
    pub auth_endpoint: String,
    pub token_endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest {
    post_body: String,
    request_uri: &'static str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

pub struct FirebaseAuth {
    settings: FirebaseSettings,
    http: reqwest::Client,
    storage: Arc<dyn KeyValueStore>,
    current: Mutex<Option<Credential>>,
    observers: Arc<Observers<Option<Credential>>>,
}

impl FirebaseAuth {
    pub fn new(
        settings: FirebaseSettings,
        http: reqwest::Client,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            settings,
            http,
            storage,
            current: Mutex::new(None),
            observers: Observers::new(),
        }
    }

    /// Reload the user saved by an earlier process. Unreadable entries are
    /// logged and ignored.
    pub async fn restore(&self) -> Option<Credential> {
        let stored = match self.storage.get(CREDENTIAL_KEY).await {
            Ok(stored) => stored?,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load stored identity credential");
                return None;
            }
        };

        match serde_json::from_str::<Credential>(&stored) {
            Ok(credential) => {
                self.set_current(Some(credential.clone()));
                Some(credential)
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable identity credential");
                None
            }
        }
    }

    fn url(&self, base: &str, method: &str) -> String {
        format!(
            "{}/{}?key={}",
            base.trim_end_matches('/'),
            method,
            self.settings.api_key
        )
    }

    async fn post_account<B: Serialize + ?Sized>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<SignInResponse, AuthError> {
        let url = self.url(&self.settings.auth_endpoint, method);
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let json: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(parse_error(&json, status.as_u16()));
        }
        serde_json::from_value(json).map_err(|e| {
            AuthError::new(
                AuthErrorCode::Unknown("auth/internal-error".to_string()),
                format!("Unexpected identity response: {}", e),
            )
        })
    }

    async fn complete_sign_in(
        &self,
        response: SignInResponse,
        method: SignInMethod,
    ) -> Result<Credential, AuthError> {
        let credential = Credential {
            uid: response.local_id,
            email: response.email,
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: expiry_from(&response.expires_in)?,
            method,
        };
        self.persist(&credential).await;
        self.set_current(Some(credential.clone()));
        tracing::info!(uid = %credential.uid, method = %method, "identity provider sign-in");
        Ok(credential)
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential, AuthError> {
        let url = self.url(&self.settings.token_endpoint, "token");
        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", credential.refresh_token.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();
        let json: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(parse_error(&json, status.as_u16()));
        }
        let refreshed: RefreshResponse = serde_json::from_value(json).map_err(|e| {
            AuthError::new(
                AuthErrorCode::Unknown("auth/internal-error".to_string()),
                format!("Unexpected token response: {}", e),
            )
        })?;

        Ok(Credential {
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: expiry_from(&refreshed.expires_in)?,
            ..credential.clone()
        })
    }

    async fn persist(&self, credential: &Credential) {
        let serialized = match serde_json::to_string(credential) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize identity credential");
                return;
            }
        };
        if let Err(e) = self.storage.set(CREDENTIAL_KEY, &serialized).await {
            tracing::warn!(error = %e, "failed to save identity credential");
        }
    }

    fn set_current(&self, credential: Option<Credential>) {
        self.observers.publish_with(|| {
            let mut current = lock(&self.current);
            if *current == credential {
                return None;
            }
            *current = credential.clone();
            Some((credential, ()))
        });
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, AuthError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response = self.post_account("accounts:signInWithPassword", &body).await?;
        self.complete_sign_in(response, SignInMethod::Password).await
    }

    async fn create_user_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, AuthError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response = self.post_account("accounts:signUp", &body).await?;
        self.complete_sign_in(response, SignInMethod::Password).await
    }

    async fn sign_in_with_provider_credential(
        &self,
        credential: &ProviderCredential,
    ) -> Result<Credential, AuthError> {
        let body = IdpRequest {
            post_body: credential.post_body(),
            request_uri: IDP_REQUEST_URI,
            return_idp_credential: true,
            return_secure_token: true,
        };
        let response = self.post_account("accounts:signInWithIdp", &body).await?;
        self.complete_sign_in(response, credential.method()).await
    }

    fn current_credential(&self) -> Option<Credential> {
        lock(&self.current).clone()
    }

    async fn get_token(&self, credential: &Credential) -> Result<String, AuthError> {
        if !credential.expires_within(REFRESH_SKEW_SECS) {
            return Ok(credential.id_token.clone());
        }

        tracing::debug!(uid = %credential.uid, "refreshing expired ID token");
        let refreshed = self.refresh(credential).await?;
        let is_current = lock(&self.current)
            .as_ref()
            .is_some_and(|current| current.uid == refreshed.uid);
        if is_current {
            self.persist(&refreshed).await;
            self.set_current(Some(refreshed.clone()));
        }
        Ok(refreshed.id_token)
    }

    fn subscribe_state_changed(
        &self,
        callback: Box<dyn Fn(Option<&Credential>) + Send + Sync>,
    ) -> Subscription {
        self.observers.subscribe(
            || self.current_credential(),
            move |credential: &Option<Credential>| callback(credential.as_ref()),
        )
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.storage.remove(CREDENTIAL_KEY).await.map_err(|e| {
            AuthError::new(
                AuthErrorCode::Unknown("auth/internal-error".to_string()),
                format!("Failed to clear stored credential: {}", e),
            )
        })?;
        self.set_current(None);
        tracing::info!("identity provider sign-out");
        Ok(())
    }
}

fn expiry_from(expires_in: &str) -> Result<chrono::DateTime<Utc>, AuthError> {
    let secs = expires_in.trim().parse::<i64>().map_err(|e| {
        AuthError::new(
            AuthErrorCode::Unknown("auth/internal-error".to_string()),
            format!("Unexpected token lifetime '{}': {}", expires_in, e),
        )
    })?;
    Ok(Utc::now() + chrono::Duration::seconds(secs))
}

/// Turn `{"error": {"code": 400, "message": "EMAIL_NOT_FOUND"}}` into an `AuthError`.
fn parse_error(json: &Value, status: u16) -> AuthError {
    let raw = json
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str());

    match raw {
        Some(raw) => AuthError::new(AuthErrorCode::parse(raw), raw),
        None => AuthError::new(
            AuthErrorCode::Unknown(format!("http/{}", status)),
            format!("Identity service returned status {}", status),
        ),
    }
}
