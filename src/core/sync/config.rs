/*!
 * Map Configuration
 *
 * Runtime configuration for synchronized maps: capacity hint, statistics
 * and the default bounded wait used by `SyncMap::try_lock`
 */

use crate::core::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound accepted for the initial capacity hint
pub const MAX_INITIAL_CAPACITY: usize = 1 << 24;

/// Default capacity hint
pub const DEFAULT_CAPACITY: usize = 16;

pub const ENV_CAPACITY: &str = "ANNOTATION_MAP_CAPACITY";
pub const ENV_TRACK_STATS: &str = "ANNOTATION_MAP_TRACK_STATS";
pub const ENV_LOCK_TIMEOUT_MS: &str = "ANNOTATION_MAP_LOCK_TIMEOUT_MS";

/// Synchronized map configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Capacity hint for the underlying map (not a bound)
    pub initial_capacity: usize,
    /// Count operations in `MapStats`
    pub track_stats: bool,
    /// Bounded wait for `try_lock`; `None` blocks indefinitely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_timeout_ms: Option<u64>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            track_stats: true,
            lock_timeout_ms: None,
        }
    }
}

impl MapConfig {
    /// Configuration for short-lived maps with a handful of entries
    pub const fn small() -> Self {
        Self {
            initial_capacity: 4,
            track_stats: false,
            lock_timeout_ms: None,
        }
    }

    /// Configuration for maps shared between a reconciler thread and the UI thread
    ///
    /// The UI side should never stall for long behind a background pass.
    pub const fn reconciler() -> Self {
        Self {
            initial_capacity: 64,
            track_stats: true,
            lock_timeout_ms: Some(50),
        }
    }

    /// Override the capacity hint
    pub const fn with_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Bounded wait as a `Duration`
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string().into()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables, falling back to defaults
    ///
    /// Environment variables:
    /// - ANNOTATION_MAP_CAPACITY: capacity hint (default: 16)
    /// - ANNOTATION_MAP_TRACK_STATS: `1`/`true` or `0`/`false` (default: true)
    /// - ANNOTATION_MAP_LOCK_TIMEOUT_MS: bounded wait for `try_lock` (default: unset)
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_CAPACITY) {
            config.initial_capacity = parse_value(ENV_CAPACITY, &raw)?;
        }

        if let Some(raw) = lookup(ENV_TRACK_STATS) {
            config.track_stats = match raw.trim() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => return Err(invalid(ENV_TRACK_STATS, &raw)),
            };
        }

        if let Some(raw) = lookup(ENV_LOCK_TIMEOUT_MS) {
            config.lock_timeout_ms = Some(parse_value(ENV_LOCK_TIMEOUT_MS, &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check limits
    pub fn validate(&self) -> ConfigResult<()> {
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                requested: self.initial_capacity,
                max: MAX_INITIAL_CAPACITY,
            });
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> ConfigResult<T> {
    raw.trim().parse().map_err(|_| invalid(key, raw))
}

fn invalid(key: &str, raw: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.into(),
        value: raw.into(),
    }
}
