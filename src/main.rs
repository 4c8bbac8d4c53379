use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use log_shipper::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = cli::Cli::parse();

    // The run command installs its own subscriber with the queue sink attached
    if !matches!(args.get_command(), cli::Commands::Run) {
        init_tracing();
    }

    // Dispatch to appropriate command handler
    match args.get_command() {
        cli::Commands::Run => {
            commands::run::execute(&args.config).await?;
        }
        cli::Commands::Flush => {
            commands::flush::execute(&args.config).await?;
        }
        cli::Commands::Status => {
            commands::status::execute(&args.config).await?;
        }
        cli::Commands::Restore => {
            commands::restore::execute(&args.config).await?;
        }
        cli::Commands::Emit { message, level } => {
            commands::emit::execute(&args.config, &message, &level).await?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
    }

    Ok(())
}
