use std::sync::Arc;

use murmur_chat::SystemClock;
use murmur_storage::MemoryStorage;
use murmur_transport::{CannedResponder, ChatBackend, ChatTransport, create_transport};
use snafu::ResultExt;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::error::{AppResult, BackendSnafu};
use crate::session::SessionRegistry;

pub struct AppState {
    pub config: AppConfig,
    pub tokens: TokenService,
    /// Serves `/api/*`; also the chat transport when no remote API base is configured.
    pub backend: Arc<ChatBackend>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: AppConfig) -> AppResult<Arc<Self>> {
        let backend = Arc::new(ChatBackend::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(CannedResponder),
        ));
        let transport = create_transport(config.api_base.as_deref(), Arc::clone(&backend))
            .context(BackendSnafu {
                stage: "create-transport",
            })?;

        Ok(Self::with_parts(config, backend, transport))
    }

    pub fn with_parts(
        config: AppConfig,
        backend: Arc<ChatBackend>,
        transport: Arc<dyn ChatTransport>,
    ) -> Arc<Self> {
        let sessions =
            SessionRegistry::new(transport, Arc::new(SystemClock), config.reveal_cadence());

        Arc::new(Self {
            tokens: TokenService::from_config(&config),
            config,
            backend,
            sessions,
        })
    }
}
