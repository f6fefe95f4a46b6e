//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::game::{DisconnectPolicy, GameRules};
use crate::util::rate_limit::INPUT_RATE_LIMIT;
use crate::util::time::millis_to_ticks;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Directory holding the client page
    pub static_dir: PathBuf,

    /// Score that wins the match
    pub win_score: u32,
    /// Total goals between phase changes
    pub goals_per_phase: u32,
    /// Post-goal pause
    pub goal_pause_ms: u64,
    /// Score handling when a seated player leaves
    pub disconnect_policy: DisconnectPolicy,
    /// Inbound messages per second per connection
    pub input_rate_limit: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = match var("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => var("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:5000".to_string()),
        };

        let win_score = parse_or(&var, "WIN_SCORE", 10)?;
        if win_score == 0 {
            return Err(ConfigError::Invalid("WIN_SCORE"));
        }

        let disconnect_policy = match var("DISCONNECT_SCORE_POLICY").as_deref() {
            None | Some("keep") => DisconnectPolicy::KeepScores,
            Some("reset") => DisconnectPolicy::ResetScores,
            Some(_) => return Err(ConfigError::Invalid("DISCONNECT_SCORE_POLICY")),
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            static_dir: var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),

            win_score,
            goals_per_phase: parse_or(&var, "GOALS_PER_PHASE", 2)?,
            goal_pause_ms: parse_or(&var, "GOAL_PAUSE_MS", 2000)?,
            disconnect_policy,
            input_rate_limit: parse_or(&var, "INPUT_RATE_LIMIT", INPUT_RATE_LIMIT)?,
        })
    }

    /// Match rules derived from the configuration
    pub fn game_rules(&self) -> GameRules {
        GameRules {
            win_score: self.win_score,
            goals_per_phase: self.goals_per_phase,
            goal_pause_ticks: millis_to_ticks(self.goal_pause_ms),
            disconnect_policy: self.disconnect_policy,
        }
    }
}

fn parse_or<F, T>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
