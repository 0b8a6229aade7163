use super::state::{redact, SessionState, SessionStatus};
use crate::error::SessionError;
use crate::observer::{lock, Observers, Subscription};
use crate::storage::KeyValueStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Durable key holding the session token
pub const TOKEN_KEY: &str = "userToken";

/// Single source of truth for whether this installation is signed in.
///
/// `initialize`, `sign_in` and `sign_out` are serialized: each one finishes its
/// durable I/O and publishes the resulting state before the next one starts,
/// so the stored token and the in-memory token never disagree. Calls made
/// before `initialize` are applied in the order they acquire the store.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: Mutex<SessionState>,
    observers: Arc<Observers<SessionState>>,
    operation: tokio::sync::Mutex<()>,
    initialized: AtomicBool,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: Mutex::new(SessionState::loading()),
            observers: Observers::new(),
            operation: tokio::sync::Mutex::new(()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Load the stored token and leave the loading state.
    ///
    /// A failed read is logged and treated as signed out. Only the first call
    /// has any effect.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            tracing::debug!("session store already initialized");
            return;
        }

        let _op = self.operation.lock().await;
        let stored = match self.storage.get(TOKEN_KEY).await {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = %e, "failed to load user token from storage");
                None
            }
        };

        self.apply(|state| {
            // A sign-in that completed before the load already wrote this key,
            // so the stored value is authoritative either way.
            state.token = stored;
            state.is_loading = false;
        });
        tracing::debug!(status = %self.status(), "session loaded");
    }

    /// Persist `token`, then publish it.
    pub async fn sign_in(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }

        let _op = self.operation.lock().await;
        self.storage.set(TOKEN_KEY, &token).await.map_err(|e| {
            tracing::error!(error = %e, "failed to save user token");
            SessionError::Persistence(e)
        })?;

        tracing::debug!(token = %redact(&token), "session token stored");
        self.apply(|state| state.token = Some(token));
        Ok(())
    }

    /// Remove the stored token, then publish the signed-out state.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let _op = self.operation.lock().await;
        self.storage.remove(TOKEN_KEY).await.map_err(|e| {
            tracing::error!(error = %e, "failed to remove user token");
            SessionError::Persistence(e)
        })?;

        tracing::debug!("session token removed");
        self.apply(|state| state.token = None);
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        lock(&self.state).clone()
    }

    pub fn status(&self) -> SessionStatus {
        lock(&self.state).status()
    }

    pub fn token(&self) -> Option<String> {
        lock(&self.state).token.clone()
    }

    /// Call `listener` with the current state now and after every change.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        self.observers.subscribe(|| self.state(), listener)
    }

    /// Channel form of `subscribe` for async consumers. The receiver yields
    /// the current state first; it closes once the subscription is dropped.
    pub fn changes(&self) -> (UnboundedReceiver<SessionState>, Subscription) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe(move |state| {
            let _ = tx.send(state.clone());
        });
        (rx, subscription)
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    fn apply(&self, update: impl FnOnce(&mut SessionState)) {
        self.observers.publish_with(|| {
            let mut state = lock(&self.state);
            let before = state.clone();
            update(&mut state);
            if *state == before {
                return None;
            }
            Some((state.clone(), ()))
        });
    }
}
