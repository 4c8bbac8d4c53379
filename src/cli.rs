use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "log-shipper", version, about = "Durable log buffering and cold-storage shipping")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Buffer logs and flush them on the configured interval (default)
    Run,

    /// Run one flush cycle now
    Flush,

    /// Show main and pending queue sizes
    Status,

    /// Move entries stranded in the pending queue back to main
    Restore,

    /// Append one log entry to the main queue
    Emit {
        /// Message body
        message: String,

        /// Severity level name
        #[arg(short, long, default_value = "INFO")]
        level: String,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration (with secrets masked)
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Run if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_run() {
        let cli = Cli {
            config: PathBuf::from("config.toml"),
            command: None,
        };

        assert!(matches!(cli.get_command(), Commands::Run));
    }

    #[test]
    fn test_cli_parsing_emit() {
        let args = vec!["log-shipper", "emit", "disk almost full", "--level", "WARN"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Emit { message, level } => {
                assert_eq!(message, "disk almost full");
                assert_eq!(level, "WARN");
            }
            _ => panic!("Expected Emit command"),
        }
    }

    #[test]
    fn test_cli_parsing_global_config() {
        let args = vec!["log-shipper", "flush", "--config", "/etc/log-shipper.toml"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/log-shipper.toml"));
        assert!(matches!(cli.get_command(), Commands::Flush));
    }

    #[test]
    fn test_cli_parsing_config_show() {
        let args = vec!["log-shipper", "config", "show"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Config { action } => {
                assert!(matches!(action, ConfigCommands::Show));
            }
            _ => panic!("Expected Config command"),
        }
    }
}
