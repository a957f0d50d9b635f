use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "restock",
    version,
    about = "Stock availability watcher and automated checkout"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch every configured target and check out when stock appears
    Run(RunArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
    /// List built-in site flows
    Sites,
}

#[derive(Args, Clone)]
pub struct RunArgs {
    /// YAML configuration file
    #[arg(short, long, default_value = "restock.yaml")]
    pub config: String,

    /// Comma-separated site ids to run (default: all configured)
    #[arg(long)]
    pub sites: Option<String>,

    /// Force headless browsers regardless of per-target settings
    #[arg(long)]
    pub headless: bool,

    /// Override the artifact output directory
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// YAML configuration file
    #[arg(short, long, default_value = "restock.yaml")]
    pub config: String,
}
