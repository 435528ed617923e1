//! # Configuration
//!
//! Application configuration loaded at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BOOKING_API_URL=https://api.example.com/api                        │
//! │     BOOKING_MESSAGE_SECS=5                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/booking-client/booking.toml (Linux)                      │
//! │     ~/Library/Application Support/com.booking.client/booking.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! api_base_url = "http://localhost:3000/api"
//! app_origin = "http://localhost:5173"
//! message_secs = 5
//! countdown_secs = 5
//! request_timeout_secs = 15
//! session_path = "/var/lib/booking/session.toml"
//! ```
//!
//! Read-only after startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

const CONFIG_FILE: &str = "booking.toml";
const SESSION_FILE: &str = "session.toml";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// REST API root, e.g. `http://localhost:3000/api`.
    pub api_base_url: String,

    /// Origin the app is served from; public booking links are built on it.
    pub app_origin: String,

    /// How long a banner message stays visible.
    pub message_secs: u64,

    /// Payment status page countdown start.
    pub countdown_secs: u32,

    /// Per-request timeout for API calls.
    pub request_timeout_secs: u64,

    /// Where the session is persisted. `None` uses the platform data dir.
    pub session_path: Option<PathBuf>,
}

impl Default for AppConfig {
    /// Defaults suitable for local development against `localhost:3000`.
    fn default() -> Self {
        AppConfig {
            api_base_url: "http://localhost:3000/api".to_string(),
            app_origin: "http://localhost:5173".to_string(),
            message_secs: booking_core::MESSAGE_DISPLAY_SECS,
            countdown_secs: booking_core::PAYMENT_REDIRECT_SECS,
            request_timeout_secs: 15,
            session_path: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (booking.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [("api_base_url", &self.api_base_url), ("app_origin", &self.app_origin)] {
            let parsed = url::Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{name} '{value}': {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be http(s), got: {value}"
                )));
            }
        }

        if self.message_secs == 0 {
            return Err(ConfigError::Invalid("message_secs must be greater than 0".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `BOOKING_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("BOOKING_API_URL") {
            debug!(api_base_url = %url, "Overriding API URL from environment");
            self.api_base_url = url;
        }

        if let Some(origin) = lookup("BOOKING_APP_ORIGIN") {
            self.app_origin = origin;
        }

        if let Some(secs) = lookup("BOOKING_MESSAGE_SECS").and_then(|v| v.parse().ok()) {
            self.message_secs = secs;
        }

        if let Some(secs) = lookup("BOOKING_COUNTDOWN_SECS").and_then(|v| v.parse().ok()) {
            self.countdown_secs = secs;
        }

        if let Some(secs) = lookup("BOOKING_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.request_timeout_secs = secs;
        }

        if let Some(path) = lookup("BOOKING_SESSION_PATH") {
            self.session_path = Some(PathBuf::from(path));
        }
    }

    // =========================================================================
    // Derived Values
    // =========================================================================

    pub fn message_duration(&self) -> Duration {
        Duration::from_secs(self.message_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Session file location: explicit path, else the platform data dir.
    pub fn resolved_session_path(&self) -> Option<PathBuf> {
        self.session_path.clone().or_else(|| {
            project_dirs().map(|dirs| dirs.data_dir().join(SESSION_FILE))
        })
    }

    /// Platform config file location.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.booking.client/booking.toml`
    /// - **Windows**: `%APPDATA%\booking\client\config\booking.toml`
    /// - **Linux**: `~/.config/booking-client/booking.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "booking", "client")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.message_secs, 5);
        assert_eq!(config.countdown_secs, 5);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("booking.toml");
        std::fs::write(&path, "api_base_url = \"https://api.shop.test/api\"\n").unwrap();

        let config = AppConfig::load(Some(path)).unwrap();
        assert_eq!(config.api_base_url, "https://api.shop.test/api");
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(Some(dir.path().join("absent.toml")));
        assert_eq!(config.app_origin, AppConfig::default().app_origin);
    }

    #[test]
    fn test_overrides_apply_and_ignore_garbage() {
        let env: HashMap<&str, &str> = [
            ("BOOKING_API_URL", "https://other.test/api"),
            ("BOOKING_MESSAGE_SECS", "not-a-number"),
            ("BOOKING_COUNTDOWN_SECS", "3"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "https://other.test/api");
        assert_eq!(config.message_secs, 5);
        assert_eq!(config.countdown_secs, 3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.api_base_url = "ftp://files.test".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.message_secs = 0;
        assert!(config.validate().is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("booking.toml");
        std::fs::write(&path, "message_secs = \"five\"").unwrap();
        assert!(matches!(
            AppConfig::load(Some(path)),
            Err(ConfigError::Parse(_))
        ));
    }
}
