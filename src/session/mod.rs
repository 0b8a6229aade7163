mod state;
mod store;

pub use state::{redact, SessionState, SessionStatus};
pub use store::{SessionStore, TOKEN_KEY};
