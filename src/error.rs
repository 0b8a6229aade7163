use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of the durable key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt entry for key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid storage key: '{0}'")]
    InvalidKey(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a session store mutation. The in-memory state is untouched
/// whenever one of these is returned.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session token must not be empty")]
    EmptyToken,
    #[error("failed to persist session: {0}")]
    Persistence(#[from] StorageError),
}

/// Error codes reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidEmail,
    UserNotFound,
    WrongPassword,
    InvalidCredential,
    EmailAlreadyInUse,
    WeakPassword,
    UserDisabled,
    TooManyRequests,
    NetworkRequestFailed,
    AccountExistsWithDifferentCredential,
    OperationNotAllowed,
    SignInCancelled,
    PlayServicesNotAvailable,
    TokenExpired,
    NoCurrentUser,
    Unknown(String),
}

impl AuthErrorCode {
    /// Parses either an `auth/...` code or a raw REST error string such as
    /// `EMAIL_NOT_FOUND` or `WEAK_PASSWORD : Password should be ...`.
    pub fn parse(raw: &str) -> Self {
        let code = raw.split(" : ").next().unwrap_or(raw).trim();
        match code {
            "auth/invalid-email" | "INVALID_EMAIL" => Self::InvalidEmail,
            "auth/user-not-found" | "EMAIL_NOT_FOUND" => Self::UserNotFound,
            "auth/wrong-password" | "INVALID_PASSWORD" => Self::WrongPassword,
            "auth/invalid-credential" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => {
                Self::InvalidCredential
            }
            "auth/email-already-in-use" | "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
            "auth/weak-password" | "WEAK_PASSWORD" => Self::WeakPassword,
            "auth/user-disabled" | "USER_DISABLED" => Self::UserDisabled,
            "auth/too-many-requests" | "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyRequests,
            "auth/network-request-failed" => Self::NetworkRequestFailed,
            "auth/account-exists-with-different-credential" | "FEDERATED_USER_ID_ALREADY_LINKED" => {
                Self::AccountExistsWithDifferentCredential
            }
            "auth/operation-not-allowed" | "OPERATION_NOT_ALLOWED" => Self::OperationNotAllowed,
            "auth/cancelled-by-user" | "E_SIGN_IN_CANCELLED" => Self::SignInCancelled,
            "auth/play-services-not-available" => Self::PlayServicesNotAvailable,
            "auth/user-token-expired" | "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" => {
                Self::TokenExpired
            }
            "auth/no-current-user" => Self::NoCurrentUser,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidEmail => "auth/invalid-email",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::WeakPassword => "auth/weak-password",
            Self::UserDisabled => "auth/user-disabled",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::NetworkRequestFailed => "auth/network-request-failed",
            Self::AccountExistsWithDifferentCredential => {
                "auth/account-exists-with-different-credential"
            }
            Self::OperationNotAllowed => "auth/operation-not-allowed",
            Self::SignInCancelled => "auth/cancelled-by-user",
            Self::PlayServicesNotAvailable => "auth/play-services-not-available",
            Self::TokenExpired => "auth/user-token-expired",
            Self::NoCurrentUser => "auth/no-current-user",
            Self::Unknown(code) => code,
        }
    }

    /// Message shown to the user for known codes. `None` means the caller
    /// should fall back to its own generic message.
    pub fn user_message(&self) -> Option<&'static str> {
        let message = match self {
            Self::InvalidEmail => "That email address is invalid!",
            Self::UserNotFound | Self::WrongPassword | Self::InvalidCredential => {
                "Invalid email or password."
            }
            Self::EmailAlreadyInUse => "That email address is already in use!",
            Self::WeakPassword => "Password should be at least 6 characters.",
            Self::UserDisabled => "This account has been disabled.",
            Self::TooManyRequests => "Too many attempts. Please try again later.",
            Self::NetworkRequestFailed => "Network error. Please check your internet connection.",
            Self::AccountExistsWithDifferentCredential => {
                "An account with this email already exists using a different sign-in method."
            }
            Self::OperationNotAllowed => "This sign-in method is not enabled.",
            Self::SignInCancelled => "Sign-in was cancelled.",
            Self::PlayServicesNotAvailable => "Google Play Services not available or outdated.",
            Self::TokenExpired => "Your session has expired. Please log in again.",
            Self::NoCurrentUser => "No authenticated user found.",
            Self::Unknown(_) => return None,
        };
        Some(message)
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity provider rejected the request or could not be reached.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub message: String,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::new(AuthErrorCode::NetworkRequestFailed, err.to_string())
    }
}

/// Backend refused to accept a token.
#[derive(Debug, Clone, Error)]
#[error("verification failed: {message}")]
pub struct VerificationError {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Verification(#[from] VerificationError),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("{0}")]
    Validation(String),
    #[error("Another authentication request is already in progress")]
    Busy,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Text suitable for an alert. `fallback` is used when the failure carries
    /// nothing the user can act on.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Auth(err) => err
                .code
                .user_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
            Error::Verification(err) => err.message.clone(),
            Error::Api { message, .. } => message.clone(),
            Error::Validation(message) | Error::Other(message) => message.clone(),
            Error::Busy => "Please wait for the current request to finish.".to_string(),
            Error::Network(_) => "Network error. Please check your internet connection.".to_string(),
            Error::Session(SessionError::EmptyToken) => fallback.to_string(),
            Error::Session(SessionError::Persistence(_)) => {
                "Failed to save your session on this device. Please try again.".to_string()
            }
            Error::Storage(_) => fallback.to_string(),
            Error::Config(message) => format!("Configuration error: {message}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
