use super::defaults::{default_api_base_url, default_request_timeout};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: None,
        }
    }
}

impl ApiConfig {
    pub fn base_url_or_default(&self) -> String {
        self.base_url.clone().unwrap_or_else(default_api_base_url)
    }

    pub fn timeout_or_default(&self) -> u64 {
        self.timeout.unwrap_or_else(default_request_timeout)
    }
}
