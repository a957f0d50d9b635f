use clap::Parser;
use tracing_subscriber::EnvFilter;

use restock::cli;
use restock::config;
use restock::errors::RestockError;
use restock::sites::{SiteKind, SiteOptions};

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    let result = match cli.command {
        cli::Commands::Run(args) => cli::run::handle_run(args).await,
        cli::Commands::Validate(args) => handle_validate(args).await,
        cli::Commands::Sites => {
            handle_sites();
            Ok(())
        }
    };

    match result {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            let exit_code = match &e {
                RestockError::Config(_) => 2,
                RestockError::Browser(_) => 3,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), RestockError> {
    let path = std::path::PathBuf::from(&args.config);
    let _config = config::parse_config(&path).await?;
    println!("Configuration is valid: {}", args.config);
    Ok(())
}

fn handle_sites() {
    for kind in SiteKind::all() {
        let definition = kind.definition(SiteOptions::default());
        println!(
            "{:<14} steps: {:<2} login: {}",
            kind.as_str(),
            definition.steps.len(),
            if definition.requires_login { "required" } else { "not required" }
        );
    }
}
