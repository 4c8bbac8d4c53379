use crate::queue::{QueueKeys, DEFAULT_MAIN_KEY, DEFAULT_PENDING_KEY};
use crate::sink::entry::offset_from_hours;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub flush: FlushConfig,
    #[serde(default)]
    pub uploader: UploaderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Durable store connection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            max_connections: default_max_connections(),
            busy_timeout_seconds: default_busy_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    #[serde(default = "default_main_key")]
    pub main_key: String,
    #[serde(default = "default_pending_key")]
    pub pending_key: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            main_key: default_main_key(),
            pending_key: default_pending_key(),
        }
    }
}

impl QueueConfig {
    pub fn keys(&self) -> QueueKeys {
        QueueKeys::new(&self.main_key, &self.pending_key)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlushConfig {
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,

    /// Run one last cycle when the process shuts down
    #[serde(default = "default_true")]
    pub flush_on_shutdown: bool,

    /// Credential + upload attempts before rolling back (>= 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Deadline for each call to the storage collaborator
    #[serde(default = "default_call_timeout")]
    pub call_timeout_seconds: u64,
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            flush_on_shutdown: true,
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff(),
            call_timeout_seconds: default_call_timeout(),
        }
    }
}

impl FlushConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploaderConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub key_id: String,
    #[serde(default)]
    pub application_key: String,
    #[serde(default)]
    pub bucket_id: String,
    /// Application prefix in `logs/<prefix>_<timestamp>.log`
    #[serde(default = "default_object_prefix")]
    pub object_prefix: String,
    #[serde(default = "default_call_timeout")]
    pub timeout_seconds: u64,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            key_id: String::new(),
            application_key: String::new(),
            bucket_id: String::new(),
            object_prefix: default_object_prefix(),
            timeout_seconds: default_call_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Minimum severity buffered in the queue
    #[serde(default = "default_level")]
    pub level: String,
    /// Disable to keep console logging only (nothing is queued or shipped)
    #[serde(default = "default_true")]
    pub ship_logs: bool,
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            ship_logs: true,
            utc_offset_hours: default_utc_offset(),
        }
    }
}

impl LoggingConfig {
    pub fn min_level(&self) -> anyhow::Result<tracing::Level> {
        self.level
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid log level: {}", self.level))
    }

    pub fn offset(&self) -> anyhow::Result<FixedOffset> {
        if !(-14..=14).contains(&self.utc_offset_hours) {
            anyhow::bail!("utc_offset_hours must be within -14..=14, got {}", self.utc_offset_hours);
        }
        offset_from_hours(self.utc_offset_hours)
            .ok_or_else(|| anyhow::anyhow!("Invalid UTC offset: {}", self.utc_offset_hours))
    }
}

fn default_database_path() -> String {
    "./data/log_queue.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    30
}

fn default_main_key() -> String {
    DEFAULT_MAIN_KEY.to_string()
}

fn default_pending_key() -> String {
    DEFAULT_PENDING_KEY.to_string()
}

fn default_interval() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    2000
}

fn default_call_timeout() -> u64 {
    60
}

fn default_api_url() -> String {
    "https://api.backblazeb2.com".to_string()
}

fn default_object_prefix() -> String {
    "APP".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_utc_offset() -> i32 {
    9
}

/// Load configuration
///
/// Priority: `LOG_SHIPPER__SECTION__KEY` environment > config file > built-in defaults.
/// A missing config file is not an error.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("LOG_SHIPPER").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.queue.main_key.is_empty() || cfg.queue.pending_key.is_empty() {
        anyhow::bail!("Queue key names cannot be empty");
    }

    if cfg.queue.main_key == cfg.queue.pending_key {
        anyhow::bail!(
            "Main and pending queue keys must differ (both are '{}')",
            cfg.queue.main_key
        );
    }

    if cfg.store.database_path.is_empty() {
        anyhow::bail!("store.database_path cannot be empty");
    }

    if cfg.store.max_connections == 0 {
        anyhow::bail!("store.max_connections must be at least 1");
    }

    if cfg.flush.interval_seconds == 0 {
        anyhow::bail!("flush.interval_seconds must be greater than 0");
    }

    if cfg.flush.max_attempts == 0 {
        anyhow::bail!("flush.max_attempts must be at least 1");
    }

    if cfg.flush.call_timeout_seconds == 0 {
        anyhow::bail!("flush.call_timeout_seconds must be greater than 0");
    }

    cfg.logging.min_level()?;
    cfg.logging.offset()?;

    if cfg.logging.ship_logs {
        let uploader = &cfg.uploader;
        if uploader.key_id.is_empty() || uploader.application_key.is_empty() {
            anyhow::bail!("uploader.key_id and uploader.application_key are required when ship_logs is enabled");
        }
        if uploader.bucket_id.is_empty() {
            anyhow::bail!("uploader.bucket_id is required when ship_logs is enabled");
        }
        if uploader.object_prefix.is_empty() {
            anyhow::bail!("uploader.object_prefix cannot be empty");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        let mut cfg = Config::default();
        cfg.uploader.key_id = "key-id".to_string();
        cfg.uploader.application_key = "app-key".to_string();
        cfg.uploader.bucket_id = "bucket".to_string();
        cfg
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.queue.main_key, "log_entries");
        assert_eq!(cfg.queue.pending_key, "log_entries:pending");
        assert_eq!(cfg.flush.interval(), Duration::from_secs(3600));
        assert_eq!(cfg.flush.max_attempts, 3);
        assert_eq!(cfg.logging.min_level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(validate_config(&create_test_config()).is_ok());
    }

    #[test]
    fn test_validate_requires_credentials_when_shipping() {
        let mut cfg = create_test_config();
        cfg.uploader.application_key.clear();

        let result = validate_config(&cfg);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("application_key"));

        cfg.logging.ship_logs = false;
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_validate_rejects_identical_keys() {
        let mut cfg = create_test_config();
        cfg.queue.pending_key = cfg.queue.main_key.clone();

        let result = validate_config(&cfg);
        assert!(result.unwrap_err().to_string().contains("must differ"));
    }

    #[test]
    fn test_validate_rejects_bad_level_and_offset() {
        let mut cfg = create_test_config();
        cfg.logging.level = "loud".to_string();
        assert!(validate_config(&cfg).is_err());

        let mut cfg = create_test_config();
        cfg.logging.utc_offset_hours = 20;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[queue]
main_key = "app_logs"

[flush]
interval_seconds = 60
max_attempts = 1

[uploader]
key_id = "id"
application_key = "key"
bucket_id = "bucket"
object_prefix = "PRODUCT_RECOMMEND"

[logging]
level = "warn"
"#,
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.queue.main_key, "app_logs");
        assert_eq!(cfg.queue.pending_key, "log_entries:pending");
        assert_eq!(cfg.flush.interval_seconds, 60);
        assert_eq!(cfg.flush.max_attempts, 1);
        assert_eq!(cfg.uploader.object_prefix, "PRODUCT_RECOMMEND");
        assert_eq!(cfg.logging.min_level().unwrap(), tracing::Level::WARN);
    }
}
