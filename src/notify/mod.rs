pub mod telegram;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::errors::RestockError;

pub use telegram::TelegramNotifier;

/// Out-of-band milestone delivery. Implementations must tolerate concurrent
/// calls from independent agents.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sent as soon as stock becomes available.
    async fn notify_stock_found(&self, label: &str, url: &str) -> Result<(), RestockError>;

    /// Sent right before the final payment submission.
    async fn notify_final_details(&self) -> Result<(), RestockError>;
}

/// Optional-capability wrapper around a shared notifier. Absence is a no-op
/// and delivery failures never abort the agent that raised them.
#[derive(Clone, Default)]
pub struct Milestones {
    notifier: Option<Arc<dyn Notifier>>,
}

impl Milestones {
    pub fn new(notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self { notifier }
    }

    pub fn none() -> Self {
        Self { notifier: None }
    }

    pub async fn stock_found(&self, label: &str, url: &str) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.notify_stock_found(label, url).await {
                warn!(label, error = %e, "Stock-found notification failed");
            }
        }
    }

    pub async fn final_details(&self) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.notify_final_details().await {
                warn!(error = %e, "Final-details notification failed");
            }
        }
    }
}
