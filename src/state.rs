use std::sync::Arc;

use crate::auth::{TokenError, TokenService};
use crate::config::AppConfig;
use crate::database::Stores;
use crate::services::{LogNotifier, Notifier};

/// Shared router state; cheap to clone per request
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub tokens: TokenService,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(stores: Stores, config: &AppConfig) -> Result<Self, TokenError> {
        let tokens = TokenService::new(
            stores.tokens.clone(),
            &config.security.jwt_secret,
            config.security.token_expiry_hours,
        )?;

        Ok(Self {
            stores,
            tokens,
            notifier: Arc::new(LogNotifier),
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}
