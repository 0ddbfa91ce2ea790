use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use nerkh::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for nerkh::AppCommand {
    fn from(cmd: Commands) -> nerkh::AppCommand {
        match cmd {
            Commands::Sync => nerkh::AppCommand::Sync,
            Commands::Show => nerkh::AppCommand::Show,
            Commands::Seed => nerkh::AppCommand::Seed,
            Commands::Serve => nerkh::AppCommand::Serve,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch the latest prices and merge them into the stored snapshots
    Sync,
    /// Display current prices next to the previous snapshot
    Show,
    /// Initialise empty snapshots from the last fetch
    Seed,
    /// Serve the snapshots over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => nerkh::cli::setup::setup(),
        Some(cmd) => nerkh::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
