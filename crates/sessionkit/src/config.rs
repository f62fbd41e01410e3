//! Client configuration.
//!
//! Everything has a default, so `ClientConfig::default()` works against a
//! local backend out of the box. [`ClientConfig::from_env`] overrides
//! individual fields from the environment:
//!
//! | Variable                         | Field              |
//! |----------------------------------|--------------------|
//! | `SESSIONKIT_API_URL`             | `api_base_url`     |
//! | `SESSIONKIT_REFRESH_INTERVAL_MS` | `refresh_interval` |
//! | `SESSIONKIT_STORAGE_PATH`        | `storage_path`     |
//! | `SESSIONKIT_GUARD_DISABLED`      | `guard_enabled`    |
//!
//! A value that doesn't parse is ignored (with a warning) and the default
//! is kept.

use std::path::PathBuf;
use std::time::Duration;

use sessionkit_refresh::RefreshConfig;
use sessionkit_router::GuardConfig;

pub const API_URL_VAR: &str = "SESSIONKIT_API_URL";
pub const REFRESH_INTERVAL_VAR: &str = "SESSIONKIT_REFRESH_INTERVAL_MS";
pub const STORAGE_PATH_VAR: &str = "SESSIONKIT_STORAGE_PATH";
pub const GUARD_DISABLED_VAR: &str = "SESSIONKIT_GUARD_DISABLED";

/// Settings for a [`SessionKit`](crate::SessionKit) client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the auth API, e.g. `http://localhost:8081/api`.
    pub api_base_url: String,
    /// Time between background profile refreshes.
    pub refresh_interval: Duration,
    /// File the session is persisted to.
    pub storage_path: PathBuf,
    /// Whether the route guard enforces access rules.
    pub guard_enabled: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8081/api".to_owned(),
            refresh_interval: RefreshConfig::DEFAULT_INTERVAL,
            storage_path: PathBuf::from("./.sessionkit/session.json"),
            guard_enabled: true,
        }
    }
}

impl ClientConfig {
    /// Defaults, overridden by whatever `SESSIONKIT_*` variables are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url.trim().to_owned();
        }

        if let Some(raw) = lookup(REFRESH_INTERVAL_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.refresh_interval = Duration::from_millis(ms),
                Err(_) => tracing::warn!(
                    var = REFRESH_INTERVAL_VAR,
                    value = %raw,
                    "not a number of milliseconds, using default"
                ),
            }
        }

        if let Some(path) = lookup(STORAGE_PATH_VAR).filter(|v| !v.trim().is_empty()) {
            config.storage_path = PathBuf::from(path.trim());
        }

        if let Some(raw) = lookup(GUARD_DISABLED_VAR) {
            match parse_flag(&raw) {
                Some(disabled) => config.guard_enabled = !disabled,
                None => tracing::warn!(
                    var = GUARD_DISABLED_VAR,
                    value = %raw,
                    "not a boolean, using default"
                ),
            }
        }

        config
    }

    /// The refresh loop settings derived from this config.
    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig {
            interval: self.refresh_interval,
        }
    }

    /// The route guard settings derived from this config.
    pub fn guard_config(&self) -> GuardConfig {
        if self.guard_enabled {
            GuardConfig::default()
        } else {
            GuardConfig::disabled()
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
