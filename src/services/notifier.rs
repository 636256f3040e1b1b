use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::database::models::User;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Outbound channel for account notifications (email, queue, ...)
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn welcome(&self, user: &User) -> Result<(), NotifyError>;
}

/// Default notifier: records the notification in the log instead of
/// delivering it
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn welcome(&self, user: &User) -> Result<(), NotifyError> {
        tracing::info!(user_id = user.id, email = %user.email, "Welcome notification queued");
        Ok(())
    }
}

/// Fire-and-forget: the caller never waits on delivery and a failure is
/// only logged
pub fn dispatch_welcome(notifier: Arc<dyn Notifier>, user: User) {
    tokio::spawn(async move {
        if let Err(e) = notifier.welcome(&user).await {
            tracing::warn!(user_id = user.id, "Welcome notification failed: {}", e);
        }
    });
}
