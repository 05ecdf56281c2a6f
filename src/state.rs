use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::memory::MemoryStore;
use crate::store::{TaskStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = Arc::new(MemoryStore::new());
        Ok(Self::from_parts(config, store.clone(), store))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Self {
        Self {
            config,
            users,
            tasks,
        }
    }

    /// State backed by a fresh in-memory store, for tests.
    pub fn fake() -> Self {
        use crate::config::SessionConfig;

        let config = Arc::new(AppConfig {
            session: SessionConfig {
                secret: "test-secret".into(),
                ttl_days: 7,
                cookie_secure: false,
            },
        });
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(config, store.clone(), store)
    }
}
