// ABOUTME: Configuration loading and validation for the conclave server.
// ABOUTME: Reads CONCLAVE_* environment variables and turns them into server and debate settings.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use conclave_agent::{DEFAULT_MAX_ROUNDS, DebateConfig, MIN_TURN_DELAY};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CONCLAVE_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("CONCLAVE_MAX_ROUNDS must be at least 1")]
    ZeroRounds,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ConclaveConfig {
    pub bind: SocketAddr,
    pub static_dir: PathBuf,
    pub max_rounds: u32,
    pub turn_delay: Duration,
    pub push_url: Option<String>,
}

impl Default for ConclaveConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            static_dir: PathBuf::from("frontend/dist"),
            max_rounds: DEFAULT_MAX_ROUNDS,
            turn_delay: MIN_TURN_DELAY,
            push_url: None,
        }
    }
}

impl ConclaveConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - CONCLAVE_BIND: socket address to bind (default: 127.0.0.1:5000)
    /// - CONCLAVE_STATIC_DIR: built frontend directory (default: frontend/dist)
    /// - CONCLAVE_MAX_ROUNDS: rounds per debate (default: 4, at least 1)
    /// - CONCLAVE_TURN_DELAY_MS: pause between model calls (default and minimum: 300)
    /// - CONCLAVE_PUSH_URL: also push every message to `{url}/api/message` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind = match non_empty_env("CONCLAVE_BIND") {
            Some(bind_str) => bind_str
                .parse()
                .map_err(|_| ConfigError::InvalidBind(bind_str))?,
            None => defaults.bind,
        };

        let static_dir = non_empty_env("CONCLAVE_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let max_rounds = match non_empty_env("CONCLAVE_MAX_ROUNDS") {
            Some(value) => parse_number("CONCLAVE_MAX_ROUNDS", value)? as u32,
            None => defaults.max_rounds,
        };
        if max_rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }

        let turn_delay = match non_empty_env("CONCLAVE_TURN_DELAY_MS") {
            Some(value) => Duration::from_millis(parse_number("CONCLAVE_TURN_DELAY_MS", value)?),
            None => defaults.turn_delay,
        }
        .max(MIN_TURN_DELAY);

        let push_url = non_empty_env("CONCLAVE_PUSH_URL");

        Ok(Self {
            bind,
            static_dir,
            max_rounds,
            turn_delay,
            push_url,
        })
    }

    pub fn debate_config(&self) -> DebateConfig {
        DebateConfig::default()
            .with_max_rounds(self.max_rounds)
            .with_turn_delay(self.turn_delay)
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_number(var: &'static str, value: String) -> Result<u64, ConfigError> {
    let parsed = value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|n| *n <= u32::MAX as u64);
    parsed.ok_or(ConfigError::InvalidNumber { var, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_env::env_lock;

    /// SAFETY: Only call while holding ENV_MUTEX.
    unsafe fn clear_conclave_env() {
        // SAFETY: caller holds ENV_MUTEX, ensuring no concurrent env var access
        unsafe {
            std::env::remove_var("CONCLAVE_BIND");
            std::env::remove_var("CONCLAVE_STATIC_DIR");
            std::env::remove_var("CONCLAVE_MAX_ROUNDS");
            std::env::remove_var("CONCLAVE_TURN_DELAY_MS");
            std::env::remove_var("CONCLAVE_PUSH_URL");
        }
    }

    #[test]
    fn config_loads_defaults() {
        let _lock = env_lock();
        // SAFETY: holding ENV_MUTEX, no concurrent env var access
        unsafe {
            clear_conclave_env();
        }

        let config = ConclaveConfig::from_env().unwrap();

        assert_eq!(config.bind, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.static_dir, PathBuf::from("frontend/dist"));
        assert_eq!(config.max_rounds, 4);
        assert_eq!(config.turn_delay, Duration::from_millis(300));
        assert!(config.push_url.is_none());
    }

    #[test]
    fn config_reads_overrides_and_raises_short_delay() {
        let _lock = env_lock();
        // SAFETY: holding ENV_MUTEX, no concurrent env var access
        unsafe {
            clear_conclave_env();
            std::env::set_var("CONCLAVE_BIND", "0.0.0.0:8080");
            std::env::set_var("CONCLAVE_MAX_ROUNDS", "2");
            std::env::set_var("CONCLAVE_TURN_DELAY_MS", "50");
            std::env::set_var("CONCLAVE_PUSH_URL", "http://relay:5000");
        }

        let config = ConclaveConfig::from_env();

        // SAFETY: holding ENV_MUTEX, no concurrent env var access
        unsafe {
            clear_conclave_env();
        }

        let config = config.unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.max_rounds, 2);
        assert_eq!(config.turn_delay, Duration::from_millis(300));
        assert_eq!(config.push_url.as_deref(), Some("http://relay:5000"));

        let debate = config.debate_config();
        assert_eq!(debate.max_rounds, 2);
        assert_eq!(debate.turn_delay(), Duration::from_millis(300));
    }

    #[test]
    fn config_rejects_bad_values() {
        let _lock = env_lock();

        // SAFETY: holding ENV_MUTEX, no concurrent env var access
        unsafe {
            clear_conclave_env();
            std::env::set_var("CONCLAVE_BIND", "not-an-address");
        }
        let bad_bind = ConclaveConfig::from_env();

        // SAFETY: holding ENV_MUTEX, no concurrent env var access
        unsafe {
            clear_conclave_env();
            std::env::set_var("CONCLAVE_MAX_ROUNDS", "0");
        }
        let zero_rounds = ConclaveConfig::from_env();

        // SAFETY: holding ENV_MUTEX, no concurrent env var access
        unsafe {
            clear_conclave_env();
            std::env::set_var("CONCLAVE_TURN_DELAY_MS", "soon");
        }
        let bad_delay = ConclaveConfig::from_env();

        // SAFETY: holding ENV_MUTEX, no concurrent env var access
        unsafe {
            clear_conclave_env();
        }

        assert!(matches!(bad_bind, Err(ConfigError::InvalidBind(_))));
        assert!(matches!(zero_rounds, Err(ConfigError::ZeroRounds)));
        let err = bad_delay.unwrap_err();
        assert!(err.to_string().contains("CONCLAVE_TURN_DELAY_MS"), "{}", err);
    }
}
