use std::env;
use std::str::FromStr;

use crate::shared::AppError;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_END_ROUND: u32 = 10;
const DEFAULT_JOIN_CODE_ATTEMPTS: usize = 32;
const DEFAULT_STORE_RETRIES: u32 = 3;

/// Server settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Rounds in each new game
    pub end_round_num: u32,
    pub join_code_attempts: usize,
    pub store_retries: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            end_round_num: DEFAULT_END_ROUND,
            join_code_attempts: DEFAULT_JOIN_CODE_ATTEMPTS,
            store_retries: DEFAULT_STORE_RETRIES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from any variable source, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            bind_addr: lookup("BANKO_BIND_ADDR").unwrap_or(defaults.bind_addr),
            end_round_num: parsed(&lookup, "BANKO_END_ROUND", defaults.end_round_num)?,
            join_code_attempts: parsed(
                &lookup,
                "BANKO_JOIN_CODE_ATTEMPTS",
                defaults.join_code_attempts,
            )?,
            store_retries: parsed(&lookup, "BANKO_STORE_RETRIES", defaults.store_retries)?,
        };

        if config.end_round_num == 0 {
            return Err(AppError::config("BANKO_END_ROUND must be at least 1"));
        }
        if config.join_code_attempts == 0 {
            return Err(AppError::config("BANKO_JOIN_CODE_ATTEMPTS must be at least 1"));
        }
        if config.store_retries == 0 {
            return Err(AppError::config("BANKO_STORE_RETRIES must be at least 1"));
        }

        Ok(config)
    }
}

fn parsed<T, F>(lookup: &F, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("{name} has invalid value '{raw}'"))),
        None => Ok(default),
    }
}
