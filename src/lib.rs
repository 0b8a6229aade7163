pub mod api;
pub mod app;
pub mod auth_flow;
pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod observer;
pub mod router;
pub mod session;
pub mod storage;
pub mod theme;
pub mod ui;

pub use app::App;
pub use error::{Error, Result};
pub use session::{SessionState, SessionStatus, SessionStore};
