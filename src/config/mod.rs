//! Configuration module - environment variable parsing

use std::env;
use std::str::FromStr;

use crate::game::{ArenaBounds, MatchSettings};
use crate::util::time::SIMULATION_TPS;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,

    /// Seed for the match RNG; random when unset
    pub seed: u64,
    /// Host loop ticks per second
    pub tick_rate: u32,

    /// Round length in seconds
    pub round_secs: f32,
    /// Actors per match, human included
    pub roster_size: usize,
    pub arena_width: f32,
    pub arena_height: f32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (tests, embedding hosts)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        let seed = match lookup("MATCH_SEED") {
            Some(raw) => parse("MATCH_SEED", &raw)?,
            None => rand::random(),
        };

        let config = Self {
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format,
            seed,
            tick_rate: parse_or(&lookup, "TICK_RATE", SIMULATION_TPS)?,
            round_secs: parse_or(&lookup, "ROUND_SECONDS", 30.0)?,
            roster_size: parse_or(&lookup, "ROSTER_SIZE", 6)?,
            arena_width: parse_or(&lookup, "ARENA_WIDTH", 960.0)?,
            arena_height: parse_or(&lookup, "ARENA_HEIGHT", 640.0)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=240).contains(&self.tick_rate) {
            return Err(ConfigError::OutOfRange("TICK_RATE", "1..=240"));
        }
        if !(self.round_secs > 0.0 && self.round_secs <= 3600.0) {
            return Err(ConfigError::OutOfRange("ROUND_SECONDS", "(0, 3600]"));
        }
        if !(2..=12).contains(&self.roster_size) {
            return Err(ConfigError::OutOfRange("ROSTER_SIZE", "2..=12"));
        }
        if !(self.arena_width >= 200.0 && self.arena_width.is_finite()) {
            return Err(ConfigError::OutOfRange("ARENA_WIDTH", ">= 200"));
        }
        if !(self.arena_height >= 240.0 && self.arena_height.is_finite()) {
            return Err(ConfigError::OutOfRange("ARENA_HEIGHT", ">= 240"));
        }
        Ok(())
    }

    /// Match tuning derived from this config
    pub fn match_settings(&self) -> MatchSettings {
        MatchSettings {
            roster_size: self.roster_size,
            round_secs: self.round_secs,
            arena: ArenaBounds::new(self.arena_width, self.arena_height),
            ..MatchSettings::default()
        }
    }
}

fn parse<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}

fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => parse(name, &raw),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} out of range (expected {1})")]
    OutOfRange(&'static str, &'static str),
}
