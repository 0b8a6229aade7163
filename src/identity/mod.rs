mod firebase;

pub use firebase::{FirebaseAuth, FirebaseSettings, CREDENTIAL_KEY};

use crate::error::AuthError;
use crate::observer::Subscription;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub method: SignInMethod,
}

impl Credential {
    /// True when the ID token expires within `skew_secs` seconds.
    pub fn expires_within(&self, skew_secs: i64) -> bool {
        Utc::now() + chrono::Duration::seconds(skew_secs) >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInMethod {
    Password,
    Google,
    Apple,
    Facebook,
}

impl SignInMethod {
    /// Provider id used by the identity service
    pub fn provider_id(&self) -> &'static str {
        match self {
            SignInMethod::Password => "password",
            SignInMethod::Google => "google.com",
            SignInMethod::Apple => "apple.com",
            SignInMethod::Facebook => "facebook.com",
        }
    }
}

impl fmt::Display for SignInMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignInMethod::Password => "Email",
            SignInMethod::Google => "Google",
            SignInMethod::Apple => "Apple",
            SignInMethod::Facebook => "Facebook",
        };
        f.write_str(name)
    }
}

/// Token obtained from a social sign-in SDK, exchanged for a provider credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCredential {
    Google { id_token: String },
    Apple { id_token: String, nonce: Option<String> },
    Facebook { access_token: String },
}

impl ProviderCredential {
    pub fn method(&self) -> SignInMethod {
        match self {
            ProviderCredential::Google { .. } => SignInMethod::Google,
            ProviderCredential::Apple { .. } => SignInMethod::Apple,
            ProviderCredential::Facebook { .. } => SignInMethod::Facebook,
        }
    }

    /// Form-encoded `postBody` for an IdP sign-in exchange
    pub fn post_body(&self) -> String {
        let provider_id = self.method().provider_id();
        let mut params = match self {
            ProviderCredential::Google { id_token } | ProviderCredential::Apple { id_token, .. } => {
                vec![("id_token", id_token.as_str()), ("providerId", provider_id)]
            }
            ProviderCredential::Facebook { access_token } => {
                vec![("access_token", access_token.as_str()), ("providerId", provider_id)]
            }
        };
        if let ProviderCredential::Apple {
            nonce: Some(nonce), ..
        } = self
        {
            params.push(("nonce", nonce.as_str()));
        }

        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish()
    }
}

/// Third-party identity service: issues credentials and bearer tokens.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Credential, AuthError>;

    async fn create_user_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, AuthError>;

    async fn sign_in_with_provider_credential(
        &self,
        credential: &ProviderCredential,
    ) -> Result<Credential, AuthError>;

    fn current_credential(&self) -> Option<Credential>;

    /// Bearer token for `credential`, refreshed if it is about to expire
    async fn get_token(&self, credential: &Credential) -> Result<String, AuthError>;

    /// Called with the current user now and whenever it changes
    fn subscribe_state_changed(
        &self,
        callback: Box<dyn Fn(Option<&Credential>) + Send + Sync>,
    ) -> Subscription;

    async fn sign_out(&self) -> Result<(), AuthError>;
}
