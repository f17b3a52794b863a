//! Session settings read from an optional JSON file.

use std::{path::Path, time::Duration};

use anyhow::{Context, Result, ensure};
use maze_agent_core::config::{LearningConfig, PlannerConfig};
use serde::{Deserialize, Serialize};

use crate::world::Rules;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub planner: PlannerConfig,
    pub learning: LearningConfig,
    /// Delay between rendered ticks.
    pub tick_ms: u64,
    /// Time an agent gets to decide each tick.
    pub deadline_ms: u64,
    pub tick_limit: u64,
    pub lives: u32,
    pub edible_ticks: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            learning: LearningConfig::default(),
            tick_ms: 120,
            deadline_ms: 40,
            tick_limit: 10_000,
            lives: 3,
            edible_ticks: 40,
        }
    }
}

impl SessionConfig {
    /// Reads and validates a session file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SessionConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.planner.validate().context("Invalid planner settings")?;
        self.learning.validate().context("Invalid learning settings")?;
        ensure!(self.deadline_ms > 0, "deadline_ms must be positive");
        ensure!(self.tick_limit > 0, "tick_limit must be positive");
        ensure!(self.lives > 0, "lives must be positive");
        Ok(())
    }

    /// Overrides every seed with `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.planner = self.planner.with_seed(seed);
        self.learning = self.learning.with_seed(seed);
        self
    }

    pub fn rules(&self) -> Rules {
        Rules {
            lives: self.lives,
            edible_ticks: self.edible_ticks,
            tick_limit: self.tick_limit,
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}
