use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod actionlog;
mod arm;
mod cmd;
mod config;
mod shell;
mod utils;
mod validate;

use cmd::{CheckArgs, GroupsArgs, LocationsArgs, ResourcesArgs, ShellArgs};
use config::{Overrides, Settings};

/// azrg - manage Azure resource groups from an interactive shell
///
/// Command layout:
///   azrg [shell]                    interactive loop (default)
///   azrg groups [--json]            list resource groups
///   azrg check <NAME> [--json]      name validity + existence
///   azrg locations [--json]         locations available to the subscription
///   azrg resources <GROUP> [--json] resources inside a group
///
/// Shell commands:
///   list groups | check existence | create | manage tags | list resources | delete | exit
///
/// Global flags / env:
///   -v / -vv          Increase verbosity (RUST_LOG overrides)
///   -q / --quiet      Errors only
///   -s / --subscription   Subscription id (or AZURE_SUBSCRIPTION_ID)
///   -c / --config     YAML config file (or AZRG_CONFIG; ./azrg.yaml if present)
///   --log-file        Action log path (or AZRG_LOG_FILE; default log_file.log)
///   --endpoint        Management endpoint (default https://management.azure.com)
///
/// Credentials (first that works):
///   AZURE_ACCESS_TOKEN, then AZURE_TENANT_ID + AZURE_CLIENT_ID + AZURE_CLIENT_SECRET,
///   then `az account get-access-token`.
///
/// Examples:
///   azrg -s 00000000-0000-0000-0000-000000000000
///   azrg groups --json
///   azrg check rg-web-prod-001
///   azrg resources rg-web-prod-001
#[derive(Parser, Debug)]
#[command(
    name = "azrg",
    version,
    author,
    about = "azrg - interactive shell for Azure resource groups",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error diagnostics
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Subscription id
    #[arg(short = 's', long, env = "AZURE_SUBSCRIPTION_ID", global = true, value_name = "ID")]
    subscription: Option<String>,

    /// YAML config file
    #[arg(short = 'c', long, env = "AZRG_CONFIG", global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Action log file
    #[arg(long, env = "AZRG_LOG_FILE", global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Management endpoint URL
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive resource group shell (default)
    Shell(ShellArgs),

    /// List resource groups
    Groups(GroupsArgs),

    /// Check whether a resource group name is valid and in use
    Check(CheckArgs),

    /// List locations available to the subscription
    Locations(LocationsArgs),

    /// List resources inside a resource group
    Resources(ResourcesArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let settings = Settings::load(&Overrides {
        subscription_id: cli.subscription,
        config: cli.config,
        log_file: cli.log_file,
        endpoint: cli.endpoint,
    })?;

    match cli.command.unwrap_or(Commands::Shell(ShellArgs::default())) {
        Commands::Shell(args) => cmd::execute_shell(args, &settings),
        Commands::Groups(args) => cmd::execute_groups(args, &settings),
        Commands::Check(args) => cmd::execute_check(args, &settings),
        Commands::Locations(args) => cmd::execute_locations(args, &settings),
        Commands::Resources(args) => cmd::execute_resources(args, &settings),
    }
}
