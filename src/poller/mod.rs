use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::browser::PageSession;
use crate::errors::RestockError;

/// Backoff policy for the availability loop. The delay between attempts is
/// drawn uniformly from [min_delay, max_delay) so concurrent agents never
/// settle into a synchronized refresh cadence.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Pause after a refresh so late-loading page content can land.
    pub settle: Duration,
    /// Upper bound on predicate evaluations; `None` polls indefinitely.
    pub max_attempts: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs_f64(7.5),
            max_delay: Duration::from_secs_f64(18.2),
            settle: Duration::from_secs(2),
            max_attempts: None,
        }
    }
}

impl PollConfig {
    pub fn jitter(&self) -> Duration {
        let min = self.min_delay.as_secs_f64();
        let max = self.max_delay.as_secs_f64();
        if max <= min {
            return self.min_delay;
        }
        Duration::from_secs_f64(rand::thread_rng().gen_range(min..max))
    }
}

/// How a poll loop ended when the predicate itself never errored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEnd {
    Available,
    Cancelled,
    AttemptsExhausted { attempts: u32 },
}

/// Evaluate `check` against the session until it reports stock, the caller
/// cancels, or the attempt budget runs out. Every failed attempt triggers a
/// page refresh before the next evaluation.
///
/// A predicate that cannot be evaluated at all (its target element is gone)
/// is not "unavailable": it is escalated as a structural mismatch and the
/// loop terminates, since retrying a changed page will not help.
pub async fn poll_until_available<F, Fut>(
    session: &dyn PageSession,
    mut check: F,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<PollEnd, RestockError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, RestockError>>,
{
    let mut attempts: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Ok(PollEnd::Cancelled);
        }

        attempts += 1;
        match check().await {
            Ok(true) => {
                info!(attempts, "Stock available");
                return Ok(PollEnd::Available);
            }
            Ok(false) => {
                debug!(attempt = attempts, "Not yet available");
            }
            Err(RestockError::ElementNotFound(what)) => {
                return Err(RestockError::StructuralMismatch(format!(
                    "availability target missing: {}",
                    what
                )));
            }
            Err(e) => return Err(e),
        }

        if let Some(max) = config.max_attempts {
            if attempts >= max {
                return Ok(PollEnd::AttemptsExhausted { attempts });
            }
        }

        let delay = config.jitter();
        debug!(delay_ms = delay.as_millis() as u64, "Backing off before refresh");
        tokio::select! {
            _ = cancel.cancelled() => return Ok(PollEnd::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }

        session.refresh().await?;
        tokio::time::sleep(config.settle).await;
    }
}
