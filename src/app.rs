//! Root context handed to every command: one session store per process,
//! built from explicit dependencies rather than globals.

use crate::api::{build_http_client, BackendClient};
use crate::auth_flow::AuthFlow;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::identity::FirebaseAuth;
use crate::router::{Screen, ScreenRouter};
use crate::session::SessionStore;
use crate::storage::{FilesystemStore, KeyValueStore, MemoryStore};
use crate::theme::ThemeStore;
use std::sync::Arc;

pub struct App {
    pub config: Config,
    pub storage: Arc<dyn KeyValueStore>,
    pub session: Arc<SessionStore>,
}

impl App {
    pub fn new(config: Config, storage: Arc<dyn KeyValueStore>) -> Self {
        let session = Arc::new(SessionStore::new(Arc::clone(&storage)));
        Self {
            config,
            storage,
            session,
        }
    }

    /// Build the app over the configured data directory, or over memory
    /// when `ephemeral` is set, and load the stored session.
    pub async fn start(config: Config, ephemeral: bool) -> Self {
        let storage: Arc<dyn KeyValueStore> = if ephemeral {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(FilesystemStore::new(config.data_dir.clone()))
        };
        let app = Self::new(config, storage);
        app.session.initialize().await;
        app
    }

    /// Screen the router presents for the current session
    pub fn current_screen(&self) -> Screen {
        let mut router = ScreenRouter::new();
        router.on_state(&self.session.state());
        router.current()
    }

    pub async fn auth_flow(&self) -> Result<AuthFlow> {
        let settings = self.config.firebase_settings().map_err(Error::Config)?;
        let http = build_http_client(self.config.request_timeout)?;

        let identity = FirebaseAuth::new(settings, http.clone(), Arc::clone(&self.storage));
        identity.restore().await;
        let backend = BackendClient::new(self.config.api_base_url.clone(), http);

        Ok(AuthFlow::new(
            Arc::clone(&self.session),
            Arc::new(identity),
            Arc::new(backend),
        ))
    }

    pub async fn theme(&self) -> ThemeStore {
        ThemeStore::load(Arc::clone(&self.storage), self.config.color_scheme).await
    }
}
