//! Serializable backtest configuration.
//!
//! A run consumes exactly four scalars: a start date, an end date, a bar
//! interval string, and a random seed. Richer fields in the TOML are ignored.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid bar interval '{0}': expected <n>, <n>m, <n>min, <n>h or <n>d with n > 0")]
    InvalidInterval(String),
}

/// Configuration for a single synthetic backtest run.
///
/// ```toml
/// start = "2024-01-01"
/// end = "2024-01-31"
/// bar_interval = "15m"
/// seed = 42
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BacktestConfig {
    /// First day of the replay (inclusive, from UTC midnight).
    pub start: NaiveDate,

    /// Last day of the replay (inclusive, ticks up to UTC midnight).
    pub end: NaiveDate,

    pub bar_interval: String,

    pub seed: u64,
}

impl BacktestConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(content)?;
        cfg.interval_minutes()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parsed `bar_interval` in minutes.
    pub fn interval_minutes(&self) -> Result<u32, ConfigError> {
        parse_interval(&self.bar_interval)
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end.and_time(NaiveTime::MIN).and_utc()
    }

    /// Same config with a different seed. Used by sweeps.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    /// Deterministic hash ID for this configuration.
    ///
    /// Two identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        // Field order is fixed by the derive, so the JSON is canonical.
        let json = serde_json::to_string(self).expect("BacktestConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// Parse `<n>`, `<n>m`, `<n>min`, `<n>h` or `<n>d` into minutes.
pub fn parse_interval(raw: &str) -> Result<u32, ConfigError> {
    let invalid = || ConfigError::InvalidInterval(raw.to_string());
    let s = raw.trim().to_ascii_lowercase();

    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    let n: u32 = digits.parse().map_err(|_| invalid())?;

    let factor = match unit.trim() {
        "" | "m" | "min" => 1,
        "h" => 60,
        "d" => 24 * 60,
        _ => return Err(invalid()),
    };

    match n.checked_mul(factor) {
        Some(0) | None => Err(invalid()),
        Some(minutes) => Ok(minutes),
    }
}
