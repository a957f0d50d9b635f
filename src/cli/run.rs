use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use console::style;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agent::SiteAgent;
use crate::audit::Artifacts;
use crate::browser::CdpSession;
use crate::config::{self, RunConfig, TargetConfig};
use crate::errors::RestockError;
use crate::models::{AgentOutcome, AgentStatus};
use crate::notify::{Milestones, Notifier, TelegramNotifier};
use crate::orchestrator::Orchestrator;

use super::commands::RunArgs;

pub async fn handle_run(args: RunArgs) -> Result<(), RestockError> {
    let path = PathBuf::from(&args.config);
    let config = config::parse_config(&path).await?;
    let targets = selected_targets(&config, args.sites.as_deref())?;

    let run_id = Uuid::new_v4().simple().to_string();
    let artifact_root = args
        .output
        .map(PathBuf::from)
        .unwrap_or_else(|| config.artifact_dir.clone())
        .join(format!("run-{}", &run_id[..8]));
    info!(run_id = %run_id, dir = %artifact_root.display(), "Run starting");

    let profile = Arc::new(config.profile.clone());
    let notifier: Option<Arc<dyn Notifier>> = config
        .telegram
        .as_ref()
        .map(|t| Arc::new(TelegramNotifier::new(&t.bot_token, t.chat_id)) as Arc<dyn Notifier>);
    let poll = config.polling.to_poll_config();

    let orchestrator = Orchestrator::new();
    let token = orchestrator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, winding agents down");
            token.cancel();
        }
    });

    let mut agents = Vec::with_capacity(targets.len());
    for target_config in &targets {
        let definition = target_config.site.definition(target_config.site_options());
        let headless = args.headless || target_config.headless;
        let session = CdpSession::launch(headless).await?;
        agents.push(SiteAgent::new(
            target_config.to_target(),
            definition,
            Box::new(session),
            profile.clone(),
            Milestones::new(notifier.clone()),
            Artifacts::new(artifact_root.join(target_config.site.as_str())),
            poll.clone(),
            orchestrator.cancel_token(),
        ));
    }

    let outcomes = orchestrator.run_all(agents).await;
    write_outcomes(&artifact_root, &outcomes).await?;
    print_summary(&outcomes);
    Ok(())
}

fn selected_targets(
    config: &RunConfig,
    filter: Option<&str>,
) -> Result<Vec<TargetConfig>, RestockError> {
    let Some(filter) = filter else {
        return Ok(config.targets.clone());
    };

    let wanted: Vec<&str> = filter.split(',').map(str::trim).collect();
    for name in &wanted {
        if !config.targets.iter().any(|t| t.site.as_str() == *name) {
            return Err(RestockError::Config(format!(
                "site `{}` is not in the configuration",
                name
            )));
        }
    }
    Ok(config
        .targets
        .iter()
        .filter(|t| wanted.contains(&t.site.as_str()))
        .cloned()
        .collect())
}

async fn write_outcomes(
    artifact_root: &Path,
    outcomes: &HashMap<String, AgentOutcome>,
) -> Result<(), RestockError> {
    tokio::fs::create_dir_all(artifact_root).await?;
    let json = serde_json::to_string_pretty(outcomes)?;
    let path = artifact_root.join("outcomes.json");
    tokio::fs::write(&path, json).await?;
    info!(path = %path.display(), "Outcomes written");
    Ok(())
}

fn print_summary(outcomes: &HashMap<String, AgentOutcome>) {
    let mut sites: Vec<_> = outcomes.keys().collect();
    sites.sort();

    println!();
    println!("{}", style("Run summary").bold());
    for site in sites {
        let outcome = &outcomes[site];
        match &outcome.status {
            AgentStatus::Completed => {
                println!("  {} {}", style("ok").green().bold(), site);
            }
            AgentStatus::Cancelled => {
                println!("  {} {} cancelled", style("--").yellow().bold(), site);
            }
            status => {
                println!("  {} {} {}", style("!!").red().bold(), site, status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PollingConfig;
    use crate::models::{ContactDetails, CustomerProfile, PaymentDetails};
    use crate::sites::SiteKind;

    fn config_with_two_targets() -> RunConfig {
        RunConfig {
            profile: CustomerProfile {
                contact: ContactDetails {
                    first_name: "Ada".into(),
                    last_name: "Lovelace".into(),
                    email: "ada@example.com".into(),
                    phone: "07000000000".into(),
                    post_code: "SW1A 1AA".into(),
                    street_number: "10".into(),
                    street_name: "Downing Street".into(),
                    county: "Greater London".into(),
                    town: "London".into(),
                    country: "UK".into(),
                },
                payment: PaymentDetails {
                    card_type: "VISA".into(),
                    card_number: "4111111111111111".into(),
                    name_on_card: "A LOVELACE".into(),
                    expiry: "0929".into(),
                    cvv: "123".into(),
                },
                login: None,
            },
            telegram: None,
            polling: PollingConfig::default(),
            artifact_dir: "./artifacts".into(),
            targets: vec![
                TargetConfig {
                    site: SiteKind::Game,
                    url: "https://www.game.co.uk/playstation-5".into(),
                    label: "ps5".into(),
                    headless: true,
                    preorder_is_available: false,
                },
                TargetConfig {
                    site: SiteKind::GameListing,
                    url: "https://www.game.co.uk/en/hardware".into(),
                    label: "console".into(),
                    headless: true,
                    preorder_is_available: false,
                },
            ],
        }
    }

    #[test]
    fn test_no_filter_selects_all() {
        let config = config_with_two_targets();
        let selected = selected_targets(&config, None).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_filter_selects_named_site() {
        let config = config_with_two_targets();
        let selected = selected_targets(&config, Some("game")).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].site, SiteKind::Game);
    }

    #[test]
    fn test_filter_unknown_site_is_config_error() {
        let config = config_with_two_targets();
        let err = selected_targets(&config, Some("argos")).unwrap_err();
        assert!(matches!(err, RestockError::Config(_)));
    }
}
