use super::models::{body_message, LoginRequest, SignupRequest, Verification};
use super::{AccountBackend, BackendVerifier};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

const VERIFY_FALLBACK: &str = "Login verification failed on backend";
const SIGNUP_FALLBACK: &str = "Signup failed";
const PROFILE_FALLBACK: &str = "Failed to fetch protected data";

/// Build the shared HTTP client with JSON defaults and a request timeout
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// Client for the application's own backend (`{base}/auth/...`)
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/{}", self.base_url, path)
    }
}

/// Read a response as JSON; empty or non-JSON bodies become `Value::Null`.
async fn read_body(response: reqwest::Response) -> Result<(u16, bool, Value)> {
    let status = response.status();
    let text = response.text().await?;
    let body = serde_json::from_str(&text).unwrap_or(Value::Null);
    Ok((status.as_u16(), status.is_success(), body))
}

#[async_trait]
impl BackendVerifier for BackendClient {
    async fn verify(&self, token: &str) -> Result<Verification> {
        let response = self
            .http
            .post(self.auth_url("login"))
            .json(&LoginRequest { id_token: token })
            .send()
            .await?;
        let (status, ok, body) = read_body(response).await?;

        if ok {
            tracing::debug!(status, "backend accepted token");
            Ok(Verification {
                accepted: true,
                message: body_message(&body).unwrap_or_else(|| "Login verified".to_string()),
                data: body,
            })
        } else {
            let message = body_message(&body).unwrap_or_else(|| VERIFY_FALLBACK.to_string());
            tracing::warn!(status, %message, "backend rejected token");
            Ok(Verification {
                accepted: false,
                message,
                data: body,
            })
        }
    }
}

#[async_trait]
impl AccountBackend for BackendClient {
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Value> {
        let response = self
            .http
            .post(self.auth_url("signup"))
            .json(&SignupRequest {
                email,
                password,
                display_name,
            })
            .send()
            .await?;
        let (status, ok, body) = read_body(response).await?;

        if !ok {
            let message = body_message(&body).unwrap_or_else(|| SIGNUP_FALLBACK.to_string());
            tracing::warn!(status, %message, "backend signup failed");
            return Err(Error::Api { status, message });
        }
        Ok(body)
    }

    async fn fetch_profile(&self, token: &str) -> Result<Value> {
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| Error::Other(format!("Invalid authorization header: {}", e)))?;
        let response = self
            .http
            .get(self.auth_url("me"))
            .header(AUTHORIZATION, bearer)
            .send()
            .await?;
        let (status, ok, body) = read_body(response).await?;

        if !ok {
            let message = body_message(&body).unwrap_or_else(|| PROFILE_FALLBACK.to_string());
            return Err(Error::Api { status, message });
        }
        Ok(body)
    }
}
