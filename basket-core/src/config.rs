use serde::{Deserialize, Serialize};

use crate::allocator::RankingPolicy;
use crate::error::{Error, Result};

/// Seeded random-restart search over demand orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    /// Total rounds, including the unshuffled first round.
    pub rounds: u32,
    pub seed: u64,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            rounds: 100,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub ranking: RankingPolicy,
    /// Re-place units bought alone from a seller after the first pass.
    pub single_item_repair: bool,
    /// `None` runs the deterministic order once.
    pub restarts: Option<RestartConfig>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            ranking: RankingPolicy::SellerReuse,
            single_item_repair: true,
            restarts: None,
        }
    }
}

impl OptimizerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Config)
    }

    pub fn with_ranking(mut self, ranking: RankingPolicy) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn with_repair(mut self, enabled: bool) -> Self {
        self.single_item_repair = enabled;
        self
    }

    pub fn with_restarts(mut self, rounds: u32, seed: u64) -> Self {
        self.restarts = Some(RestartConfig { rounds, seed });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = OptimizerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, OptimizerConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = OptimizerConfig::from_json_str(
            r#"{"ranking": "stick_to_selected", "restarts": {"seed": 7}}"#,
        )
        .unwrap();
        assert_eq!(config.ranking, RankingPolicy::StickToSelected);
        assert!(config.single_item_repair);
        assert_eq!(config.restarts, Some(RestartConfig { rounds: 100, seed: 7 }));
    }

    #[test]
    fn unknown_policy_is_a_config_error() {
        assert!(matches!(
            OptimizerConfig::from_json_str(r#"{"ranking": "cheapest"}"#),
            Err(Error::Config(_))
        ));
    }
}
