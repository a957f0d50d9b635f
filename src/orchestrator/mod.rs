use std::collections::HashMap;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::agent::SiteAgent;
use crate::models::{AgentOutcome, AgentStatus};

/// Runs a set of agents concurrently and collects their terminal outcomes.
///
/// One tokio task per agent; a failure (or panic) in one task is converted
/// into that agent's outcome and never touches its siblings. `run_all`
/// blocks until every agent is terminal.
pub struct Orchestrator {
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
        }
    }

    /// Token handed to agents; cancelling it winds every agent down at its
    /// next check point.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn run_all(&self, agents: Vec<SiteAgent>) -> HashMap<String, AgentOutcome> {
        info!(agents = agents.len(), "Orchestrator starting");

        let mut sites = Vec::with_capacity(agents.len());
        let mut handles = Vec::with_capacity(agents.len());
        for agent in agents {
            sites.push(agent.site().to_string());
            handles.push(tokio::spawn(agent.run()));
        }

        let results = futures::future::join_all(handles).await;

        let mut outcomes = HashMap::new();
        for (site, result) in sites.into_iter().zip(results) {
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Agent task died outside its own error handling.
                    error!(site = %site, error = %e, "Agent task panicked");
                    AgentOutcome::new(
                        &site,
                        AgentStatus::FailedAtStep {
                            step: "agent-task".to_string(),
                            reason: format!("task aborted: {}", e),
                        },
                        Utc::now(),
                    )
                }
            };
            outcomes.insert(site, outcome);
        }

        info!(
            completed = outcomes.values().filter(|o| o.is_completed()).count(),
            total = outcomes.len(),
            "Orchestrator finished"
        );
        outcomes
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}
