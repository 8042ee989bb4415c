//! Runtime configuration.
//!
//! Configuration is read from a TOML file named by `OPSDESK_CONFIG` when
//! set; every key is optional. `OPSDESK_DATABASE_URL` and `OPSDESK_LOG`
//! override the file.
//!
//! ```toml
//! log_filter = "opsdesk=debug,info"
//!
//! [database]
//! url = "postgres://opsdesk@localhost/opsdesk"
//! max_connections = 8
//!
//! [automation]
//! workflow_scan_limit = 500
//! sla_scan_limit = 2000
//! notification_flush_limit = 100
//!
//! [scheduler]
//! sla_scan_interval_secs = 300
//! workflow_interval_secs = 600
//! flush_interval_secs = 60
//! dedupe_window_secs = 60
//! queue_capacity = 64
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "OPSDESK_CONFIG";
/// Environment variable overriding the database URL.
pub const DATABASE_URL_ENV: &str = "OPSDESK_DATABASE_URL";
/// Environment variable overriding the log filter.
pub const LOG_FILTER_ENV: &str = "OPSDESK_LOG";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for [`OpsdeskConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpsdeskConfig {
    /// `PostgreSQL` connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Scan and flush limits.
    #[serde(default)]
    pub automation: AutomationConfig,
    /// Periodic enqueue settings for the scheduler binary.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for OpsdeskConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            automation: AutomationConfig::default(),
            scheduler: SchedulerConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl OpsdeskConfig {
    /// Loads configuration from the file named by `OPSDESK_CONFIG`, then
    /// applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the named file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();
        let base = match lookup(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        Ok(base.with_overrides(lookup))
    }

    /// Reads a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies environment overrides read through `lookup`.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.database.url = Some(url);
        }
        if let Some(filter) = lookup(LOG_FILTER_ENV).filter(|filter| !filter.trim().is_empty()) {
            self.log_filter = filter;
        }
        self
    }
}

/// `PostgreSQL` connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL; required by the scheduler binary.
    #[serde(default)]
    pub url: Option<String>,
    /// Pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Scan and flush limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// Active tickets loaded per organization by the workflow scan.
    #[serde(default = "default_workflow_scan_limit")]
    pub workflow_scan_limit: usize,
    /// Tickets with a due date loaded per organization by the SLA scan.
    #[serde(default = "default_sla_scan_limit")]
    pub sla_scan_limit: usize,
    /// Emails sent per flush.
    #[serde(default = "default_notification_flush_limit")]
    pub notification_flush_limit: usize,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            workflow_scan_limit: default_workflow_scan_limit(),
            sla_scan_limit: default_sla_scan_limit(),
            notification_flush_limit: default_notification_flush_limit(),
        }
    }
}

/// Periodic enqueue settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between `sla.scan` jobs.
    #[serde(default = "default_sla_scan_interval_secs")]
    pub sla_scan_interval_secs: u64,
    /// Seconds between `workflows.run` jobs.
    #[serde(default = "default_workflow_interval_secs")]
    pub workflow_interval_secs: u64,
    /// Seconds between `notifications.flush` jobs.
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,
    /// Width of the job idempotency bucket.
    #[serde(default = "default_dedupe_window_secs")]
    pub dedupe_window_secs: u64,
    /// Jobs buffered between the scheduler and its worker.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl SchedulerConfig {
    /// Interval between `sla.scan` jobs; never shorter than one second.
    #[must_use]
    pub fn sla_scan_interval(&self) -> Duration {
        Duration::from_secs(self.sla_scan_interval_secs.max(1))
    }

    /// Interval between `workflows.run` jobs; never shorter than one second.
    #[must_use]
    pub fn workflow_interval(&self) -> Duration {
        Duration::from_secs(self.workflow_interval_secs.max(1))
    }

    /// Interval between `notifications.flush` jobs; never shorter than one
    /// second.
    #[must_use]
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs.max(1))
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sla_scan_interval_secs: default_sla_scan_interval_secs(),
            workflow_interval_secs: default_workflow_interval_secs(),
            flush_interval_secs: default_flush_interval_secs(),
            dedupe_window_secs: default_dedupe_window_secs(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_owned()
}

const fn default_max_connections() -> u32 {
    8
}

const fn default_workflow_scan_limit() -> usize {
    crate::workflow::services::DEFAULT_WORKFLOW_SCAN_LIMIT
}

const fn default_sla_scan_limit() -> usize {
    crate::workflow::services::DEFAULT_SLA_SCAN_LIMIT
}

const fn default_notification_flush_limit() -> usize {
    100
}

const fn default_sla_scan_interval_secs() -> u64 {
    300
}

const fn default_workflow_interval_secs() -> u64 {
    600
}

const fn default_flush_interval_secs() -> u64 {
    60
}

const fn default_dedupe_window_secs() -> u64 {
    crate::jobs::services::DEFAULT_DEDUPE_WINDOW_SECS
}

const fn default_queue_capacity() -> usize {
    64
}
