// Copyright (c) James Kassemi, SC, US. All rights reserved.
use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duration::{parse_duration, DurationError};
use crate::throttle::DEFAULT_THROTTLE_MS;

pub const CONFIG_FILE_STEM: &str = "rolling-stats";
pub const ENV_PREFIX: &str = "ROLLING_STATS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config source error: {0}")]
    Source(#[from] config::ConfigError),
    #[error("at least one window must be configured")]
    NoWindows,
    #[error(transparent)]
    InvalidWindow(#[from] DurationError),
}

/// Expiry throttle knob: a millisecond interval, or a plain on/off switch.
///
/// `true` means "throttled at the default interval", `false` disables
/// throttling so every trigger runs an expiry pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpiryThrottle {
    Interval(u64),
    Toggle(bool),
}

impl ExpiryThrottle {
    pub fn interval_ms(&self) -> Option<u64> {
        match *self {
            ExpiryThrottle::Interval(ms) => Some(ms),
            ExpiryThrottle::Toggle(true) => Some(DEFAULT_THROTTLE_MS),
            ExpiryThrottle::Toggle(false) => None,
        }
    }
}

impl Default for ExpiryThrottle {
    fn default() -> Self {
        ExpiryThrottle::Interval(DEFAULT_THROTTLE_MS)
    }
}

/// Settings for one rolling statistics instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Window literals in presentation order, e.g. `["1m", "5m"]`.
    #[serde(default)]
    pub windows: Vec<String>,
    #[serde(default)]
    pub expiry_throttle: ExpiryThrottle,
    #[serde(default)]
    pub debug: bool,
}

impl StatsConfig {
    pub fn new<I, S>(windows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            windows: windows.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_expiry_throttle(mut self, throttle: ExpiryThrottle) -> Self {
        self.expiry_throttle = throttle;
        self
    }

    pub fn without_expiry_throttle(self) -> Self {
        self.with_expiry_throttle(ExpiryThrottle::Toggle(false))
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Reads `rolling-stats.{toml,...}` from the working directory (optional)
    /// overlaid with `ROLLING_STATS_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(CONFIG_FILE_STEM).required(false))
            .add_source(env_source())
            .build()?;
        Self::finish(settings)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(env_source())
            .build()?;
        Self::finish(settings)
    }

    fn finish(settings: Config) -> Result<Self, ConfigError> {
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.windows.is_empty() {
            return Err(ConfigError::NoWindows);
        }
        for spec in &self.windows {
            parse_duration(spec)?;
        }
        Ok(())
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("windows")
}
