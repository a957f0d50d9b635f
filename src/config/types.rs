use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{CustomerProfile, Target};
use crate::poller::PollConfig;
use crate::sites::{SiteKind, SiteOptions};

/// Full run configuration, usually loaded from `restock.yaml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    pub profile: CustomerProfile,
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
    pub targets: Vec<TargetConfig>,
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("./artifacts")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    #[serde(default = "default_min_delay")]
    pub min_delay_secs: f64,
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: f64,
    #[serde(default = "default_settle")]
    pub settle_secs: f64,
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

fn default_min_delay() -> f64 {
    7.5
}

fn default_max_delay() -> f64 {
    18.2
}

fn default_settle() -> f64 {
    2.0
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: default_min_delay(),
            max_delay_secs: default_max_delay(),
            settle_secs: default_settle(),
            max_attempts: None,
        }
    }
}

impl PollingConfig {
    pub fn to_poll_config(&self) -> PollConfig {
        PollConfig {
            min_delay: Duration::from_secs_f64(self.min_delay_secs),
            max_delay: Duration::from_secs_f64(self.max_delay_secs),
            settle: Duration::from_secs_f64(self.settle_secs),
            max_attempts: self.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    pub site: SiteKind,
    pub url: String,
    /// Short product label used in notifications.
    pub label: String,
    #[serde(default)]
    pub headless: bool,
    #[serde(default)]
    pub preorder_is_available: bool,
}

impl TargetConfig {
    pub fn to_target(&self) -> Target {
        Target::new(self.site.as_str(), &self.url, &self.label)
    }

    pub fn site_options(&self) -> SiteOptions {
        SiteOptions {
            preorder_is_available: self.preorder_is_available,
        }
    }
}
