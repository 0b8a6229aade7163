pub mod client;
pub mod models;

pub use client::{build_http_client, BackendClient};
pub use models::Verification;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Server-side confirmation of identity provider tokens
#[async_trait]
pub trait BackendVerifier: Send + Sync {
    /// A non-2xx answer is `accepted == false`, not an error. Errors are
    /// reserved for requests that never got an answer.
    async fn verify(&self, token: &str) -> Result<Verification>;
}

/// Backend operations used by the sign-up and profile flows
#[async_trait]
pub trait AccountBackend: BackendVerifier {
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Value>;

    async fn fetch_profile(&self, token: &str) -> Result<Value>;
}
