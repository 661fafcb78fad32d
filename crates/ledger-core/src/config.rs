use crate::constants::{DEFAULT_DIFFICULTY, DEFAULT_MINING_REWARD, HASH_HEX_SIZE};
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MiningMode {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    #[serde(default = "default_mining_reward")]
    pub mining_reward: u64,
    #[serde(default)]
    pub mining: MiningMode,
}

fn default_difficulty() -> u32 {
    DEFAULT_DIFFICULTY
}

fn default_mining_reward() -> u64 {
    DEFAULT_MINING_REWARD
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            mining_reward: default_mining_reward(),
            mining: MiningMode::default(),
        }
    }
}

impl LedgerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mining_reward == 0 {
            return Err(LedgerError::Config(
                "mining_reward must be positive".to_string(),
            ));
        }
        if self.difficulty as usize > HASH_HEX_SIZE {
            return Err(LedgerError::Config(format!(
                "difficulty {} exceeds the {} hex characters of a hash",
                self.difficulty, HASH_HEX_SIZE
            )));
        }
        Ok(())
    }
}
