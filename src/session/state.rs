use serde::Serialize;
use std::fmt;

/// In-memory authentication state of this installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    /// Opaque bearer token; `None` means signed out
    pub token: Option<String>,
    /// True until the stored token has been read once
    pub is_loading: bool,
}

impl SessionState {
    pub fn loading() -> Self {
        Self {
            token: None,
            is_loading: true,
        }
    }

    pub fn status(&self) -> SessionStatus {
        match (self.is_loading, &self.token) {
            (true, _) => SessionStatus::Loading,
            (false, None) => SessionStatus::Unauthenticated,
            (false, Some(_)) => SessionStatus::Authenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::loading()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Loading,
    Unauthenticated,
    Authenticated,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Loading => write!(f, "loading"),
            SessionStatus::Unauthenticated => write!(f, "signed out"),
            SessionStatus::Authenticated => write!(f, "signed in"),
        }
    }
}

/// Shortened form of a token for logs and terminal output
pub fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    if prefix.len() < token.len() {
        format!("{}…", prefix)
    } else {
        "…".to_string()
    }
}
