//! User-triggered authentication flows.
//!
//! Each flow talks to the identity provider, has the backend confirm the
//! resulting token, and only then records the session. The session store
//! itself never does network I/O.

use crate::api::{AccountBackend, Verification};
use crate::error::{Error, Result, VerificationError};
use crate::identity::{Credential, IdentityProvider, ProviderCredential, SignInMethod};
use crate::session::SessionStore;
use regex::Regex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Which flow produced an error; selects the alert title and fallback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    PasswordSignIn,
    SignUp,
    ProviderSignIn(SignInMethod),
    SignOut,
    Profile,
    Theme,
}

impl FlowKind {
    pub fn title(&self) -> String {
        match self {
            FlowKind::PasswordSignIn => "Sign In Error".to_string(),
            FlowKind::SignUp => "Sign Up Error".to_string(),
            FlowKind::ProviderSignIn(method) => format!("{} Sign-In Error", method),
            FlowKind::SignOut => "Logout Error".to_string(),
            FlowKind::Profile => "Profile Error".to_string(),
            FlowKind::Theme => "Theme Error".to_string(),
        }
    }

    pub fn fallback_message(&self) -> String {
        match self {
            FlowKind::PasswordSignIn => "Failed to sign in. Please try again.".to_string(),
            FlowKind::SignUp => "Failed to create account. Please try again.".to_string(),
            FlowKind::ProviderSignIn(method) => {
                format!("Failed to sign in with {}. Please try again.", method)
            }
            FlowKind::SignOut => "Failed to log out. Please try again.".to_string(),
            FlowKind::Profile => "Failed to fetch protected data".to_string(),
            FlowKind::Theme => "Failed to save theme preference.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: Option<String>,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(Error::Validation("All fields are required.".to_string()));
        }
        if self.password != self.confirm_password {
            return Err(Error::Validation("Passwords do not match.".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::Validation(format!(
                "Password must be at least {} characters long.",
                MIN_PASSWORD_LEN
            )));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(Error::Validation(
                "Please enter a valid email address.".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
        .is_match(email)
}

/// Clears the busy flag when a flow finishes, however it finishes
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct AuthFlow {
    session: Arc<SessionStore>,
    identity: Arc<dyn IdentityProvider>,
    backend: Arc<dyn AccountBackend>,
    busy: AtomicBool,
}

impl AuthFlow {
    pub fn new(
        session: Arc<SessionStore>,
        identity: Arc<dyn IdentityProvider>,
        backend: Arc<dyn AccountBackend>,
    ) -> Self {
        Self {
            session,
            identity,
            backend,
            busy: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// True while a flow is running; the matching controls should be disabled
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<BusyGuard<'_>> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(Error::Busy);
        }
        Ok(BusyGuard(&self.busy))
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Verification> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "Please enter both email and password.".to_string(),
            ));
        }

        let _busy = self.begin()?;
        let credential = self.identity.sign_in_with_password(email, password).await?;
        self.verify_and_store(&credential).await
    }

    /// Register the account with the backend, which creates the identity
    /// itself. The user signs in separately afterwards.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<Value> {
        request.validate()?;

        let _busy = self.begin()?;
        let response = self
            .backend
            .register(
                request.email.trim(),
                &request.password,
                request.display_name.as_deref(),
            )
            .await?;
        tracing::info!("account created");
        Ok(response)
    }

    pub async fn sign_in_with_provider(
        &self,
        provider_credential: &ProviderCredential,
    ) -> Result<Verification> {
        let _busy = self.begin()?;
        let credential = self
            .identity
            .sign_in_with_provider_credential(provider_credential)
            .await?;
        self.verify_and_store(&credential).await
    }

    /// Sign out of the identity provider, then forget the local session.
    pub async fn sign_out(&self) -> Result<()> {
        let _busy = self.begin()?;
        self.identity.sign_out().await?;
        self.session.sign_out().await?;
        tracing::info!("signed out");
        Ok(())
    }

    /// Fetch the signed-in user's profile from the protected endpoint
    pub async fn profile(&self) -> Result<Value> {
        let credential = self
            .identity
            .current_credential()
            .ok_or_else(|| Error::Other("No authenticated user found.".to_string()))?;
        let token = self.identity.get_token(&credential).await?;
        self.backend.fetch_profile(&token).await
    }

    async fn verify_and_store(&self, credential: &Credential) -> Result<Verification> {
        let token = self.identity.get_token(credential).await?;
        let verification = self.backend.verify(&token).await?;
        if !verification.accepted {
            // Leave no provider user behind that the backend refused
            if let Err(e) = self.identity.sign_out().await {
                tracing::warn!(error = %e, "failed to sign out rejected identity");
            }
            return Err(VerificationError {
                message: verification.message,
            }
            .into());
        }

        tracing::info!(uid = %credential.uid, method = %credential.method, "backend verified sign-in");
        self.session.sign_in(token).await?;
        Ok(verification)
    }
}
