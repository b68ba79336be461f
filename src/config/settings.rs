use crate::core::monetary::{MAX_DIFFICULTY, MINING_DIFFICULTY, MINING_REWARD};
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

static DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";

const DIFFICULTY_KEY: &str = "LEDGER_DIFFICULTY";
const MINING_REWARD_KEY: &str = "LEDGER_MINING_REWARD";
const MINING_ADDRESS_KEY: &str = "MINING_ADDRESS";
const MAX_ATTEMPTS_KEY: &str = "LEDGER_MAX_ATTEMPTS";
const ENFORCE_BALANCE_KEY: &str = "LEDGER_ENFORCE_BALANCE";
const NODE_ADDRESS_KEY: &str = "NODE_ADDRESS";

/// Ledger settings. Later sources win: defaults, then a TOML file, then the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Leading zero hex digits required of a proof-of-work hash
    pub difficulty: usize,
    pub mining_reward: f64,
    /// Beneficiary of mining rewards
    pub miner_address: Option<String>,
    /// Upper bound on nonces tried per search; unbounded when absent
    pub max_attempts: Option<u64>,
    /// Reject transfers whose sender balance is below the value.
    /// Off by default: admission only checks the signature.
    pub enforce_balance: bool,
    pub listen_addr: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            difficulty: MINING_DIFFICULTY,
            mining_reward: MINING_REWARD,
            miner_address: None,
            max_attempts: None,
            enforce_balance: false,
            listen_addr: String::from(DEFAULT_LISTEN_ADDR),
        }
    }
}

impl LedgerConfig {
    /// Defaults, then `path` if given, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<LedgerConfig> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<LedgerConfig> {
        let text = fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<LedgerConfig> {
        let config: LedgerConfig = toml::from_str(text)?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in `load`)
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<LedgerConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(DIFFICULTY_KEY) {
            self.difficulty = parse_value(DIFFICULTY_KEY, &value)?;
        }
        if let Some(value) = lookup(MINING_REWARD_KEY) {
            self.mining_reward = parse_value(MINING_REWARD_KEY, &value)?;
        }
        if let Some(value) = lookup(MINING_ADDRESS_KEY) {
            self.miner_address = Some(value);
        }
        if let Some(value) = lookup(MAX_ATTEMPTS_KEY) {
            self.max_attempts = Some(parse_value(MAX_ATTEMPTS_KEY, &value)?);
        }
        if let Some(value) = lookup(ENFORCE_BALANCE_KEY) {
            self.enforce_balance = parse_value(ENFORCE_BALANCE_KEY, &value)?;
        }
        if let Some(value) = lookup(NODE_ADDRESS_KEY) {
            self.listen_addr = value;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::Config(format!(
                "difficulty {} exceeds the digest length {MAX_DIFFICULTY}",
                self.difficulty
            )));
        }
        if !self.mining_reward.is_finite() || self.mining_reward <= 0.0 {
            return Err(LedgerError::Config(format!(
                "mining reward must be positive, got {}",
                self.mining_reward
            )));
        }
        if self.max_attempts == Some(0) {
            return Err(LedgerError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_difficulty(mut self, difficulty: usize) -> LedgerConfig {
        self.difficulty = difficulty;
        self
    }

    pub fn with_miner_address(mut self, address: &str) -> LedgerConfig {
        self.miner_address = Some(address.to_string());
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> LedgerConfig {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_enforce_balance(mut self, enforce: bool) -> LedgerConfig {
        self.enforce_balance = enforce;
        self
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| LedgerError::Config(format!("Invalid value for {key}: {value} ({e})")))
}
