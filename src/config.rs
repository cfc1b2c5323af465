use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PortalError, Result};

const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
const DEFAULT_REFRESH_SECS: u64 = 300; // 5 minutes
const DEFAULT_TOAST_SECS: u64 = 5;
const DEFAULT_TOAST_CAPACITY: usize = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for the portal client
///
/// Every field has a default so a partial JSON file (or an empty environment)
/// still yields a usable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the backend API (no trailing slash needed)
    pub api_base: String,

    /// CSRF token attached to state-changing requests, if any
    pub csrf_token: Option<String>,

    /// Auto-refresh interval for the dashboard
    pub refresh_interval_secs: u64,

    /// How long a toast stays visible
    pub toast_duration_secs: u64,

    /// Maximum number of toasts visible at once
    pub toast_capacity: usize,

    /// Per-request timeout for the HTTP transport
    pub request_timeout_secs: u64,

    /// Durable key/value file (sidebar state)
    pub state_file: PathBuf,

    /// Directory the headless runner writes rendered regions into
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: DEFAULT_API_BASE.to_string(),
            csrf_token: None,
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            toast_duration_secs: DEFAULT_TOAST_SECS,
            toast_capacity: DEFAULT_TOAST_CAPACITY,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            state_file: PathBuf::from("portal_state.json"),
            output_dir: PathBuf::from("portal_out"),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to a JSON object whose keys match the field names
    ///
    /// # Errors
    /// * `PortalError::Config` if the file cannot be read or parsed
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| PortalError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| PortalError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Unset variables keep their defaults; set but unparseable numbers are
    /// an error rather than a silent fallback.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(base) = lookup("PORTAL_API_BASE") {
            config.api_base = base;
        }
        if let Some(token) = lookup("PORTAL_CSRF_TOKEN") {
            if !token.trim().is_empty() {
                config.csrf_token = Some(token);
            }
        }
        if let Some(raw) = lookup("PORTAL_REFRESH_SECS") {
            config.refresh_interval_secs = parse_number("PORTAL_REFRESH_SECS", &raw)?;
        }
        if let Some(raw) = lookup("PORTAL_TOAST_SECS") {
            config.toast_duration_secs = parse_number("PORTAL_TOAST_SECS", &raw)?;
        }
        if let Some(raw) = lookup("PORTAL_TOAST_CAP") {
            config.toast_capacity = parse_number("PORTAL_TOAST_CAP", &raw)?;
        }
        if let Some(raw) = lookup("PORTAL_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_number("PORTAL_TIMEOUT_SECS", &raw)?;
        }
        if let Some(path) = lookup("PORTAL_STATE_FILE") {
            config.state_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("PORTAL_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(path);
        }

        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_duration_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| PortalError::Config(format!("{} must be a number, got {:?}", key, raw)))
}
