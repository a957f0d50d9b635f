use std::collections::HashSet;
use std::path::Path;

use crate::checkout::split_expiry;
use crate::errors::RestockError;

use super::types::RunConfig;

/// Load and validate a run configuration.
pub async fn parse_config(path: &Path) -> Result<RunConfig, RestockError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        RestockError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    let config: RunConfig = serde_yaml::from_str(&raw)?;
    validate(&config)?;
    Ok(config)
}

/// Reject configurations an agent could only fail on at runtime. Everything
/// a site's steps will need must be present before any agent starts.
pub fn validate(config: &RunConfig) -> Result<(), RestockError> {
    if config.targets.is_empty() {
        return Err(RestockError::Config("no targets configured".into()));
    }

    let polling = &config.polling;
    if polling.min_delay_secs <= 0.0 || polling.max_delay_secs < polling.min_delay_secs {
        return Err(RestockError::Config(format!(
            "polling bounds {}s..{}s are not a valid interval",
            polling.min_delay_secs, polling.max_delay_secs
        )));
    }
    if polling.max_attempts == Some(0) {
        return Err(RestockError::Config("max_attempts must be at least 1".into()));
    }

    // The expiry is typed and split during payment steps; malformed input
    // must surface here, not halfway through a checkout.
    split_expiry(&config.profile.payment.expiry)?;

    if config.profile.payment.card_number.trim().is_empty() {
        return Err(RestockError::Config("payment card number is empty".into()));
    }

    let mut seen = HashSet::new();
    for target in &config.targets {
        if !target.url.starts_with("http://") && !target.url.starts_with("https://") {
            return Err(RestockError::Config(format!(
                "target url `{}` is not an absolute http(s) url",
                target.url
            )));
        }
        if target.label.trim().is_empty() {
            return Err(RestockError::Config(format!(
                "target `{}` has an empty label",
                target.url
            )));
        }
        if !seen.insert(target.site) {
            // Outcomes are keyed by site id, so one agent per site.
            return Err(RestockError::Config(format!(
                "site `{}` is configured more than once",
                target.site
            )));
        }
        if target.site.requires_login() && config.profile.login.is_none() {
            return Err(RestockError::Config(format!(
                "site `{}` requires login details",
                target.site
            )));
        }
    }

    Ok(())
}
