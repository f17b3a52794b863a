//! Tabular Q-learning.
//!
//! The learner keeps one Q-value per (node, move) pair and updates it online,
//! once per tick, for the move it actually made:
//!
//! Q(s,a) ← (1 − α)·Q(s,a) + α·(r + γ·max_a' Q(s',a'))
//!
//! where `s'` is the neighbour reached by `a` and `r` comes from [`reward`].
//! Moves are chosen ε-greedily by [`choose_move`]. The exploration rate only
//! changes through [`QLearningAgent::reset`].
//!
//! ## Usage Example
//!
//! ```no_run
//! use maze_agent_core::config::LearningConfig;
//! use maze_agent_core::learning::QLearningAgent;
//!
//! let mut agent = QLearningAgent::new(LearningConfig::default().with_seed(0));
//! // ... drive it through many episodes ...
//! agent.export_q_table("Q-Table.txt").unwrap();
//! agent.reset(0.0); // exploit only from now on
//! ```

mod policy;
mod q_table;
mod reward;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    time::Instant,
};

use rand::{Rng, rngs::StdRng};
use tracing::{debug, info, warn};

pub use policy::choose_move;
pub use q_table::QTable;
pub use reward::reward;

use crate::{
    GameQuery, Move,
    agent::{Agent, build_rng},
    config::LearningConfig,
    error::{Error, Result},
};

/// Q-learning agent (off-policy TD control).
#[derive(Debug)]
pub struct QLearningAgent {
    config: LearningConfig,
    q_table: Option<QTable>,
    exploration_rate: f64,
    total_reward: f64,
    rng: StdRng,
}

impl QLearningAgent {
    pub fn new(config: LearningConfig) -> Self {
        Self {
            exploration_rate: config.exploration_rate,
            rng: build_rng(config.seed),
            q_table: None,
            total_reward: 0.0,
            config,
        }
    }

    /// Sets a new exploration rate and clears the accumulated reward.
    ///
    /// The learned table is kept.
    pub fn reset(&mut self, exploration_rate: f64) {
        self.exploration_rate = exploration_rate.clamp(0.0, 1.0);
        self.total_reward = 0.0;
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    /// Sum of rewards since construction or the last reset.
    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    /// The table, once the first tick has sized it.
    pub fn q_table(&self) -> Option<&QTable> {
        self.q_table.as_ref()
    }

    /// Writes the table to `path` in the text format of [`QTable::write_text`].
    pub fn export_q_table(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| Error::io(format!("create {}", path.display()), e))?;
        let mut writer = BufWriter::new(file);
        match &self.q_table {
            Some(table) => table
                .write_text(&mut writer)
                .map_err(|e| Error::io("write Q-table", e))?,
            None => warn!("Q-table is empty until the first tick, exporting nothing"),
        }
        writer.flush().map_err(|e| Error::io("flush Q-table", e))?;
        info!("Exported Q-table to {}", path.display());
        Ok(())
    }

    /// One decision and one table update for the current tick.
    ///
    /// `epsilon_sample` is the draw compared against the exploration rate.
    pub fn step(&mut self, game: &dyn GameQuery, epsilon_sample: f64) -> Move {
        let state = game.pacman_node();
        let node_count = game.node_count();
        let table = self.q_table.get_or_insert_with(|| {
            QTable::new(
                node_count,
                self.config.learning_rate,
                self.config.discount_rate,
            )
        });

        let action = choose_move(
            table,
            game,
            state,
            game.pacman_last_move(),
            epsilon_sample,
            self.exploration_rate,
            &mut self.rng,
        );

        let r = reward(game, state, action, &self.config.reward);
        let max_next = game
            .neighbour(state, action)
            .map_or(0.0, |next| table.max_value(next, &game.possible_moves(next)));
        let updated = table.update(state, action, r, max_next);
        self.total_reward += r;

        debug!(
            "QLearning: state={} action={} reward={:.2} q={:.4}",
            state, action, r, updated
        );
        action
    }
}

impl Agent for QLearningAgent {
    fn name(&self) -> &str {
        "learner"
    }

    fn get_move(&mut self, game: &dyn GameQuery, _deadline: Instant) -> Move {
        let epsilon_sample = self.rng.random::<f64>();
        self.step(game, epsilon_sample)
    }
}
