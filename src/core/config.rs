//! AI tuning knobs with documented constants
//!
//! All numeric knobs for the decision core are collected here. Values can be
//! overridden from a TOML file; anything absent falls back to the defaults
//! below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{RegentError, Result};

/// Time budgets for the precompute scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Per-tick budget (ms) while the human player holds the turn
    ///
    /// Kept small so precompute work never causes a visible stall while the
    /// player is interacting.
    pub player_turn_budget_ms: u64,

    /// Per-tick budget (ms) while an AI faction holds the turn
    pub ai_turn_budget_ms: u64,

    /// Time slice (ms) handed to a single snapshot build
    ///
    /// Bounds the worst case for one work item; the analyzer returns a
    /// partial snapshot when the slice runs out.
    pub per_item_slice_ms: u64,

    /// Work items processed per tick even when the budget is already spent
    ///
    /// Guarantees forward progress under budget pressure.
    pub min_items_per_tick: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            player_turn_budget_ms: 4,
            ai_turn_budget_ms: 40,
            per_item_slice_ms: 8,
            min_items_per_tick: 1,
        }
    }
}

/// Tuning for the spatial analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Extra effective distance added to neutral targets
    ///
    /// Neutral factions are always valid targets but should lose to a
    /// non-neutral hostile at comparable range.
    pub neutral_penalty: u32,

    /// Strength margin before a target is flagged for indirect approach
    ///
    /// 0.10 = flag when the target's defensive strength exceeds the unit's
    /// offensive strength by more than 10%.
    pub indirect_approach_margin: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            neutral_penalty: 2,
            indirect_approach_margin: 0.10,
        }
    }
}

/// Cooperative movement-wait knobs for the turn orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Maximum polls before a move is abandoned as stuck
    pub poll_limit: u32,

    /// Interval (ms) between movement polls
    pub poll_interval_ms: u64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            poll_limit: 200,
            poll_interval_ms: 10_000,
        }
    }
}

/// Complete AI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub movement: MovementConfig,
}

impl AiConfig {
    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.ai_turn_budget_ms < self.scheduler.player_turn_budget_ms {
            return Err(RegentError::InvalidConfig(format!(
                "ai_turn_budget_ms ({}) should be >= player_turn_budget_ms ({})",
                self.scheduler.ai_turn_budget_ms, self.scheduler.player_turn_budget_ms
            )));
        }

        if self.scheduler.min_items_per_tick == 0 {
            return Err(RegentError::InvalidConfig(
                "min_items_per_tick must be at least 1".into(),
            ));
        }

        if self.analyzer.indirect_approach_margin < 0.0 {
            return Err(RegentError::InvalidConfig(
                "indirect_approach_margin must be non-negative".into(),
            ));
        }

        if self.movement.poll_limit == 0 {
            return Err(RegentError::InvalidConfig(
                "poll_limit must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: AiConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AiConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ai_budget_must_dominate_player_budget() {
        let mut config = AiConfig::default();
        config.scheduler.ai_turn_budget_ms = 1;
        config.scheduler.player_turn_budget_ms = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_min_items_rejected() {
        let mut config = AiConfig::default();
        config.scheduler.min_items_per_tick = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AiConfig =
            toml::from_str("[scheduler]\nai_turn_budget_ms = 80\n").expect("parse");
        assert_eq!(config.scheduler.ai_turn_budget_ms, 80);
        // Unspecified sections and fields keep their defaults
        assert_eq!(config.scheduler.min_items_per_tick, 1);
        assert_eq!(config.movement.poll_limit, 200);
    }
}
