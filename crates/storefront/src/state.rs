//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::AccountStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration and the account
/// store used by the account handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    accounts: Arc<dyn AccountStore>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, accounts }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the account store.
    #[must_use]
    pub fn accounts(&self) -> &dyn AccountStore {
        self.inner.accounts.as_ref()
    }
}
