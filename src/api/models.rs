use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub display_name: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub id_token: &'a str,
}

/// Outcome of asking the backend to accept a token
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub accepted: bool,
    pub message: String,
    /// Response body as returned by the backend
    pub data: Value,
}

/// Error body shape used by the backend's error handler
#[derive(Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

/// Pull `message` out of a response body, if there is one
pub fn body_message(body: &Value) -> Option<String> {
    serde_json::from_value::<ErrorBody>(body.clone())
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
}
