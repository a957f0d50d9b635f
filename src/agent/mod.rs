use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::audit::Artifacts;
use crate::browser::PageSession;
use crate::checkout::run_checkout;
use crate::errors::RestockError;
use crate::models::{AgentOutcome, AgentStatus, CustomerProfile, Target};
use crate::notify::Milestones;
use crate::poller::{poll_until_available, PollConfig, PollEnd};
use crate::sites::SiteDefinition;

/// One independent run of stock-polling plus checkout against a single
/// target. The agent exclusively owns its browser session; the only shared
/// collaborators are the read-only profile and the notifier.
pub struct SiteAgent {
    target: Target,
    definition: SiteDefinition,
    session: Box<dyn PageSession>,
    profile: Arc<CustomerProfile>,
    milestones: Milestones,
    artifacts: Artifacts,
    poll: PollConfig,
    cancel: CancellationToken,
}

impl SiteAgent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        target: Target,
        definition: SiteDefinition,
        session: Box<dyn PageSession>,
        profile: Arc<CustomerProfile>,
        milestones: Milestones,
        artifacts: Artifacts,
        poll: PollConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            target,
            definition,
            session,
            profile,
            milestones,
            artifacts,
            poll,
            cancel,
        }
    }

    pub fn site(&self) -> &str {
        &self.target.site
    }

    /// Run to a terminal outcome. Every failure is folded into the outcome;
    /// nothing escapes to the caller.
    pub async fn run(self) -> AgentOutcome {
        let started_at = Utc::now();
        info!(site = %self.target.site, url = %self.target.url, "Agent starting");

        let status = self.execute().await;
        match &status {
            AgentStatus::Completed => info!(site = %self.target.site, "Agent completed"),
            other => warn!(site = %self.target.site, status = %other, "Agent did not complete"),
        }
        AgentOutcome::new(&self.target.site, status, started_at)
    }

    async fn execute(&self) -> AgentStatus {
        let session = self.session.as_ref();

        if let Err(e) = session.open(&self.target.url).await {
            return AgentStatus::FailedAtStep {
                step: "open".to_string(),
                reason: e.to_string(),
            };
        }
        self.dismiss_interstitial().await;

        let check = || self.definition.is_available(session);
        match poll_until_available(session, check, &self.poll, &self.cancel).await {
            Ok(PollEnd::Available) => {}
            Ok(PollEnd::Cancelled) => return AgentStatus::Cancelled,
            Ok(PollEnd::AttemptsExhausted { attempts }) => {
                return AgentStatus::AvailabilityNeverFound {
                    reason: format!("no stock after {} checks", attempts),
                }
            }
            Err(e) => {
                return AgentStatus::AvailabilityNeverFound {
                    reason: e.to_string(),
                }
            }
        }

        self.milestones
            .stock_found(&self.target.label, &self.target.url)
            .await;
        self.artifacts.capture(session, "stock_found").await;

        if self.cancel.is_cancelled() {
            return AgentStatus::Cancelled;
        }

        if let Err(e) = self.definition.add_to_cart(session).await {
            return AgentStatus::FailedAtStep {
                step: "add-to-cart".to_string(),
                reason: e.to_string(),
            };
        }

        match self.definition.confirm_cart(session).await {
            Ok(true) => {}
            Ok(false) => {
                return AgentStatus::FailedAtStep {
                    step: "cart-confirm".to_string(),
                    reason: "cart confirmation content missing".to_string(),
                }
            }
            Err(e) => {
                return AgentStatus::FailedAtStep {
                    step: "cart-confirm".to_string(),
                    reason: e.to_string(),
                }
            }
        }

        match run_checkout(
            session,
            &self.profile,
            &self.definition.steps,
            &self.milestones,
            &self.artifacts,
            &self.cancel,
        )
        .await
        {
            Ok(trail) => {
                info!(site = %self.target.site, steps = trail.len(), "Checkout completed");
                AgentStatus::Completed
            }
            Err(RestockError::Cancelled(_)) => AgentStatus::Cancelled,
            Err(RestockError::Step { step, reason }) => {
                AgentStatus::FailedAtStep { step, reason }
            }
            Err(e) => AgentStatus::FailedAtStep {
                step: "checkout".to_string(),
                reason: e.to_string(),
            },
        }
    }

    /// Cookie banners come and go; a missing one is normal, anything else is
    /// logged and ignored.
    async fn dismiss_interstitial(&self) {
        let Some(banner) = &self.definition.cookie_banner else {
            return;
        };
        match self.session.click_on(banner).await {
            Ok(()) => info!(site = %self.target.site, "Cookie banner dismissed"),
            Err(e) if e.classify().checkpoint_recoverable => {
                info!(site = %self.target.site, "No cookie banner, proceeding");
            }
            Err(e) => {
                warn!(site = %self.target.site, error = %e, "Interstitial dismissal failed, proceeding");
            }
        }
    }
}
