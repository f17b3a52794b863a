//! Tunable constants for both strategies.
//!
//! Every config type has sensible defaults, builder-style `with_*` setters
//! and a `validate` method. All of them are serde-derivable so a driver can
//! read them from a file.
//!
//! ```
//! use maze_agent_core::config::{InedibleGhostPolicy, LearningConfig, RewardConfig};
//!
//! let config = LearningConfig::default()
//!     .with_seed(7)
//!     .with_exploration_rate(0.2)
//!     .with_reward(RewardConfig::default().with_inedible_ghost(InedibleGhostPolicy::Penalty(3.0)));
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings of the risk-aware path planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum straight-line distance at which a head-on ghost makes a hop unsafe.
    pub min_ghost_distance: f64,
    /// Path value bonus per edible ghost referenced by a segment.
    pub edible_ghost_bonus: i32,
    /// Path value penalty per unsafe segment.
    pub unsafe_penalty: i32,
    /// Path value bonus per power pill on the route.
    pub power_pill_bonus: i32,
    /// Seed for the random target fallback; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_ghost_distance: 100.0,
            edible_ghost_bonus: 1,
            unsafe_penalty: 10,
            power_pill_bonus: 5,
            seed: None,
        }
    }
}

impl PlannerConfig {
    pub fn with_min_ghost_distance(mut self, distance: f64) -> Self {
        self.min_ghost_distance = distance;
        self
    }

    pub fn with_edible_ghost_bonus(mut self, bonus: i32) -> Self {
        self.edible_ghost_bonus = bonus;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("min_ghost_distance", self.min_ghost_distance)
    }
}

/// How the reward function treats an inedible ghost within eating distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InedibleGhostPolicy {
    /// Contributes nothing.
    #[default]
    Ignore,
    /// Subtracts the given magnitude.
    Penalty(f64),
}

/// Reward magnitudes for the learning strategy.
///
/// Required ordering: power pill > edible ghost > pill > inedible ghost
/// penalty > tick cost > 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub pill: f64,
    pub power_pill: f64,
    pub edible_ghost: f64,
    pub inedible_ghost: InedibleGhostPolicy,
    /// Subtracted every tick so that standing still is never free.
    pub tick_cost: f64,
    /// Ghosts within this many hops of the next node count as met.
    pub eat_distance: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            pill: 10.0,
            power_pill: 50.0,
            edible_ghost: 20.0,
            inedible_ghost: InedibleGhostPolicy::Ignore,
            tick_cost: 0.01,
            eat_distance: 2,
        }
    }
}

impl RewardConfig {
    pub fn with_inedible_ghost(mut self, policy: InedibleGhostPolicy) -> Self {
        self.inedible_ghost = policy;
        self
    }

    pub fn with_eat_distance(mut self, distance: u32) -> Self {
        self.eat_distance = distance;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("tick_cost", self.tick_cost)?;
        ensure_greater("power_pill", self.power_pill, "edible_ghost", self.edible_ghost)?;
        ensure_greater("edible_ghost", self.edible_ghost, "pill", self.pill)?;
        match self.inedible_ghost {
            InedibleGhostPolicy::Ignore => {
                ensure_greater("pill", self.pill, "tick_cost", self.tick_cost)
            }
            InedibleGhostPolicy::Penalty(penalty) => {
                ensure_greater("pill", self.pill, "inedible_ghost", penalty)?;
                ensure_greater("inedible_ghost", penalty, "tick_cost", self.tick_cost)
            }
        }
    }
}

/// Settings of the tabular Q-learning strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// α in the temporal-difference update.
    pub learning_rate: f64,
    /// γ in the temporal-difference update.
    pub discount_rate: f64,
    /// Initial probability threshold for exploring.
    pub exploration_rate: f64,
    pub reward: RewardConfig,
    pub seed: Option<u64>,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_rate: 0.9,
            exploration_rate: 1.0,
            reward: RewardConfig::default(),
            seed: Some(0),
        }
    }
}

impl LearningConfig {
    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    pub fn with_discount_rate(mut self, rate: f64) -> Self {
        self.discount_rate = rate;
        self
    }

    pub fn with_exploration_rate(mut self, rate: f64) -> Self {
        self.exploration_rate = rate;
        self
    }

    pub fn with_reward(mut self, reward: RewardConfig) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_unit("learning_rate", self.learning_rate)?;
        ensure_unit("discount_rate", self.discount_rate)?;
        ensure_unit("exploration_rate", self.exploration_rate)?;
        self.reward.validate()
    }
}

pub(crate) fn ensure_unit(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { name, value })
    }
}

fn ensure_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn ensure_greater(
    larger: &'static str,
    larger_value: f64,
    smaller: &'static str,
    smaller_value: f64,
) -> Result<(), ConfigError> {
    if larger_value > smaller_value {
        Ok(())
    } else {
        Err(ConfigError::RewardOrdering {
            larger,
            larger_value,
            smaller,
            smaller_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PlannerConfig::default().validate().is_ok());
        assert!(RewardConfig::default().validate().is_ok());
        assert!(LearningConfig::default().validate().is_ok());
    }

    #[test]
    fn penalty_variant_keeps_ordering() {
        let reward = RewardConfig::default().with_inedible_ghost(InedibleGhostPolicy::Penalty(3.0));
        assert!(reward.validate().is_ok());

        let too_big = RewardConfig::default().with_inedible_ghost(InedibleGhostPolicy::Penalty(15.0));
        assert!(matches!(
            too_big.validate(),
            Err(ConfigError::RewardOrdering {
                larger: "pill",
                smaller: "inedible_ghost",
                ..
            })
        ));
    }

    #[test]
    fn power_pill_must_outrank_edible_ghost() {
        let reward = RewardConfig {
            edible_ghost: 200.0,
            ..RewardConfig::default()
        };
        assert!(matches!(
            reward.validate(),
            Err(ConfigError::RewardOrdering {
                larger: "power_pill",
                ..
            })
        ));
    }

    #[test]
    fn rates_must_be_in_unit_range() {
        let config = LearningConfig::default().with_learning_rate(1.5);
        assert_eq!(
            config.validate(),
            Err(ConfigError::OutOfUnitRange {
                name: "learning_rate",
                value: 1.5
            })
        );
        let planner = PlannerConfig::default().with_min_ghost_distance(0.0);
        assert!(planner.validate().is_err());
    }
}
