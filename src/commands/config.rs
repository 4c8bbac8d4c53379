use anyhow::Result;
use colored::Colorize;
use log_shipper::config::{self, Config};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the current configuration with secrets masked
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    // Serialize to TOML format
    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
///
/// Validates the configuration file
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!("Validating configuration file");

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Database: {}", cfg.store.database_path);
    println!("  Queues: {} → {}", cfg.queue.main_key, cfg.queue.pending_key);
    println!("  Flush Interval: {}s", cfg.flush.interval_seconds);
    println!("  Upload Attempts: {}", cfg.flush.max_attempts);
    println!(
        "  Shipping: {}",
        if cfg.logging.ship_logs {
            format!("enabled (level >= {})", cfg.logging.level)
        } else {
            "disabled".to_string()
        }
    );

    info!("Configuration validation successful");
    Ok(())
}

/// Sanitize secrets in configuration for safe display
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();

    sanitized.uploader.key_id = mask_secret(&sanitized.uploader.key_id);
    sanitized.uploader.application_key = mask_secret(&sanitized.uploader.application_key);

    sanitized
}

/// Mask a secret for safe display
///
/// Shows first 4 and last 4 characters with an ellipsis in between
/// Example: "K005abcdefghijkl" -> "K005...ijkl"
fn mask_secret(secret: &str) -> String {
    if secret.len() <= 11 || !secret.is_ascii() {
        // Too short to mask meaningfully
        return "***".to_string();
    }

    let prefix = &secret[..4];
    let suffix = &secret[secret.len() - 4..];

    format!("{}...{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("K005abcdefghijkl"), "K005...ijkl");
        assert_eq!(mask_secret("short"), "***");
        assert_eq!(mask_secret(""), "***");
    }

    #[test]
    fn test_sanitize_secrets() {
        let mut cfg = Config::default();
        cfg.uploader.key_id = "0051234567890abcdef".to_string();
        cfg.uploader.application_key = "K005-very-secret-application-key".to_string();
        cfg.uploader.bucket_id = "bucket-1".to_string();

        let sanitized = sanitize_secrets(&cfg);

        assert_eq!(sanitized.uploader.key_id, "0051...cdef");
        assert_eq!(sanitized.uploader.application_key, "K005...-key");
        assert_eq!(sanitized.uploader.bucket_id, "bucket-1");
    }
}
