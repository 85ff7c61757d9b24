//! Engine configuration.
//!
//! # Responsibility
//! - Hold host-controlled switches for reconciliation and logging.
//! - Resolve them from `REMINDKIT_*` environment variables.
//!
//! # Invariants
//! - Missing variables fall back to defaults; malformed values are errors,
//!   never silently coerced.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Env var disabling reminder scheduling and display.
pub const ENV_DISABLE_REMINDER_NOTIFICATIONS: &str = "REMINDKIT_DISABLE_REMINDER_NOTIFICATIONS";
/// Env var toggling the orphan sweep.
pub const ENV_SWEEP_ORPHANS: &str = "REMINDKIT_SWEEP_ORPHANS";
/// Env var overriding the log level.
pub const ENV_LOG_LEVEL: &str = "REMINDKIT_LOG_LEVEL";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBool { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBool { key, value } => {
                write!(f, "`{key}` expects true|false|1|0, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Reconciliation and logging switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// When `false`, reminders are neither scheduled nor displayed.
    pub reminders_enabled: bool,
    /// Cancel triggers that belong to no known reminder.
    pub sweep_orphans: bool,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reminders_enabled: true,
            sweep_orphans: true,
            log_level: default_log_level().to_string(),
        }
    }
}

impl EngineConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, e.g. a map in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(disabled) = parse_bool(ENV_DISABLE_REMINDER_NOTIFICATIONS, &lookup)? {
            config.reminders_enabled = !disabled;
        }
        if let Some(sweep) = parse_bool(ENV_SWEEP_ORPHANS, &lookup)? {
            config.sweep_orphans = sweep;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|value| !value.trim().is_empty()) {
            config.log_level = level.trim().to_string();
        }
        Ok(config)
    }
}

fn parse_bool(
    key: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidBool { key, value: raw }),
    }
}
