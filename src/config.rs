//! Runtime settings resolved from flags, environment and an optional file.
//!
//! Precedence, highest first: command-line flags, `NSQTOP_*` environment
//! variables, the config file given with `--config`, built-in defaults.
//!
//! ```toml
//! lookupd_addresses = ["lookupd-1:4161", "lookupd-2:4161"]
//! interval = 2
//! timeout = "2s"
//! depth_warn = 100
//! depth_crit = 1000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::data::duration::parse_duration;
use crate::data::Thresholds;

/// Prefix of environment variables, e.g. `NSQTOP_INTERVAL`.
pub const ENV_PREFIX: &str = "NSQTOP";

/// Errors detected before the monitoring loop starts.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(
        "no lookupd address given: pass --lookupd-http-address or set NSQTOP_LOOKUPD_ADDRESSES"
    )]
    NoLookupdAddress,

    #[error("refresh interval must be greater than zero")]
    ZeroInterval,

    #[error("invalid {key} '{value}': {reason}")]
    InvalidDuration {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("depth warning threshold ({warn}) is above the critical threshold ({crit})")]
    InvalidThresholds { warn: u64, crit: u64 },

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

/// Values supplied on the command line. `None`/empty means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub lookupd_addresses: Vec<String>,
    pub interval: Option<String>,
    pub timeout: Option<String>,
    pub depth_warn: Option<u64>,
    pub depth_crit: Option<u64>,
    pub config_file: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Registry base URLs, each with a scheme.
    pub lookupd_urls: Vec<String>,
    pub interval: Duration,
    pub timeout: Duration,
    pub thresholds: Thresholds,
}

impl Settings {
    /// Resolve settings from flags, the process environment and the config file.
    pub fn load(overrides: &Overrides) -> Result<Self, SettingsError> {
        Self::load_with(overrides, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(overrides: &Overrides, environment: Environment) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default("interval", "2")?
            .set_default("timeout", "2s")?
            .set_default("depth_warn", 100i64)?
            .set_default("depth_crit", 1000i64)?;

        if let Some(path) = &overrides.config_file {
            builder = builder.add_source(File::from(path.as_path()));
        }
        builder = builder.add_source(environment);

        if !overrides.lookupd_addresses.is_empty() {
            builder =
                builder.set_override("lookupd_addresses", overrides.lookupd_addresses.join(","))?;
        }
        if let Some(interval) = &overrides.interval {
            builder = builder.set_override("interval", interval.as_str())?;
        }
        if let Some(timeout) = &overrides.timeout {
            builder = builder.set_override("timeout", timeout.as_str())?;
        }
        if let Some(warn) = overrides.depth_warn {
            builder = builder.set_override("depth_warn", warn.min(i64::MAX as u64) as i64)?;
        }
        if let Some(crit) = overrides.depth_crit {
            builder = builder.set_override("depth_crit", crit.min(i64::MAX as u64) as i64)?;
        }

        let raw: RawSettings = builder.build()?.try_deserialize()?;
        raw.resolve()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AddressList {
    One(String),
    Many(Vec<String>),
}

impl AddressList {
    fn into_vec(self) -> Vec<String> {
        match self {
            AddressList::One(s) => vec![s],
            AddressList::Many(v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default)]
    lookupd_addresses: Option<AddressList>,
    #[serde(default)]
    lookupd_address: Option<AddressList>,
    interval: String,
    timeout: String,
    depth_warn: u64,
    depth_crit: u64,
}

impl RawSettings {
    fn resolve(self) -> Result<Settings, SettingsError> {
        let addresses = self
            .lookupd_addresses
            .or(self.lookupd_address)
            .map(AddressList::into_vec)
            .unwrap_or_default();
        let lookupd_urls = normalize_lookupd_urls(&addresses);
        if lookupd_urls.is_empty() {
            return Err(SettingsError::NoLookupdAddress);
        }

        let interval = duration_setting("interval", &self.interval)?;
        if interval.is_zero() {
            return Err(SettingsError::ZeroInterval);
        }
        let timeout = duration_setting("timeout", &self.timeout)?;

        if self.depth_warn > self.depth_crit {
            return Err(SettingsError::InvalidThresholds {
                warn: self.depth_warn,
                crit: self.depth_crit,
            });
        }

        Ok(Settings {
            lookupd_urls,
            interval,
            timeout,
            thresholds: Thresholds {
                depth_warning: self.depth_warn,
                depth_critical: self.depth_crit,
            },
        })
    }
}

fn duration_setting(key: &'static str, value: &str) -> Result<Duration, SettingsError> {
    parse_duration(value).map_err(|e| SettingsError::InvalidDuration {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Split comma-separated entries, drop blanks and add `http://` where no
/// scheme was given.
pub fn normalize_lookupd_urls<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| entry.as_ref().split(','))
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(|url| {
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("http://{}", url)
            }
        })
        .collect()
}
