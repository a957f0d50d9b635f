use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One product page to watch. Created at orchestration setup, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub site: String,
    pub url: String,
    /// Short product label used in notifications, e.g. "ps5".
    pub label: String,
}

impl Target {
    pub fn new(site: &str, url: &str, label: &str) -> Self {
        Self {
            site: site.to_string(),
            url: url.to_string(),
            label: label.to_string(),
        }
    }
}

/// What a single checkout step reports back to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    /// The step did not apply to this run (e.g. already authenticated).
    Skipped,
}

/// A step's name paired with how it ended, kept for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step: String,
    pub outcome: String,
}

/// Terminal status of one agent run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum AgentStatus {
    Completed,
    FailedAtStep { step: String, reason: String },
    AvailabilityNeverFound { reason: String },
    Cancelled,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::FailedAtStep { step, reason } => {
                write!(f, "failed at '{}': {}", step, reason)
            }
            Self::AvailabilityNeverFound { reason } => {
                write!(f, "availability never found: {}", reason)
            }
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The final, immutable result of one agent's run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOutcome {
    pub site: String,
    #[serde(flatten)]
    pub status: AgentStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl AgentOutcome {
    pub fn new(site: &str, status: AgentStatus, started_at: DateTime<Utc>) -> Self {
        Self {
            site: site.to_string(),
            status,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == AgentStatus::Completed
    }
}
