//! Risk-aware greedy path planning.
//!
//! Each tick the planner picks a target, then walks toward it one hop at a
//! time, always taking the neighbour with the smallest shortest-path
//! distance to the target. Before a hop is accepted it is checked by
//! [`is_safe`]. An unsafe hop throws the partial route away, draws a random
//! pill as the new target and starts again from the agent's node. Only the
//! caller's deadline bounds this restart loop; when it expires, or no target
//! exists, [`PlanningAgent`] reverses its last move instead.
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::time::{Duration, Instant};
//!
//! use maze_agent_core::{Agent, GameView, Snapshot, load_maze_from_string};
//! use maze_agent_core::config::PlannerConfig;
//! use maze_agent_core::planner::PlanningAgent;
//!
//! let maze = load_maze_from_string("WL ST PI PI WL").unwrap();
//! let snapshot = Snapshot::initial(&maze);
//! let mut agent = PlanningAgent::new(PlannerConfig::default().with_seed(1));
//! let deadline = Instant::now() + Duration::from_millis(40);
//! let mv = agent.get_move(&GameView::new(&maze, &snapshot), deadline);
//! ```

mod path;
mod safety;
mod segment;
mod target;

use std::time::Instant;

use rand::rngs::StdRng;
use tracing::{debug, trace, warn};

pub use path::Path;
pub use safety::is_safe;
pub use segment::Segment;
pub use target::{Target, TargetKind, select_target};

use crate::{
    GameQuery, Move,
    agent::{Agent, build_rng},
    config::PlannerConfig,
};
use segment::ordered_candidates;

/// Result of one planning attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    /// A route reaching the target.
    Found { path: Path, restarts: u32 },
    /// No reachable target, or the search hit a dead end.
    NoTarget { restarts: u32 },
    /// The deadline passed before a target was reached.
    TimedOut { restarts: u32 },
}

impl PlanOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            PlanOutcome::Found { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Number of unsafe-hop restarts performed.
    pub fn restarts(&self) -> u32 {
        match self {
            PlanOutcome::Found { restarts, .. }
            | PlanOutcome::NoTarget { restarts }
            | PlanOutcome::TimedOut { restarts } => *restarts,
        }
    }
}

/// Builds one path per call from the agent's current node.
#[derive(Debug)]
pub struct PathPlanner {
    config: PlannerConfig,
    rng: StdRng,
}

impl PathPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        let rng = build_rng(config.seed);
        Self { config, rng }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Greedy best-first construction toward the selected target.
    ///
    /// Returns as soon as the target is reached, no target can be found, or
    /// `deadline` has passed.
    pub fn build_path(&mut self, game: &dyn GameQuery, deadline: Instant) -> PlanOutcome {
        let agent = game.pacman_node();
        let mut restarts = 0;

        let Some(mut target) = select_target(game, false, &mut self.rng) else {
            return PlanOutcome::NoTarget { restarts };
        };

        let mut segments: Vec<Segment> = Vec::new();
        let mut frontier = agent;

        loop {
            if Instant::now() >= deadline {
                warn!(
                    "Planner: deadline reached after {} restarts, target {:?} at {}",
                    restarts, target.kind, target.node
                );
                return PlanOutcome::TimedOut { restarts };
            }

            let Some(best) = ordered_candidates(game, frontier, target.node)
                .into_iter()
                .next()
            else {
                debug!("Planner: node {} has no moves", frontier);
                return PlanOutcome::NoTarget { restarts };
            };
            if best.distance.is_none() {
                debug!("Planner: target {} unreachable from {}", target.node, frontier);
                return PlanOutcome::NoTarget { restarts };
            }

            let parent = segments.len().checked_sub(1).map(|i| (i, &segments[i]));
            let segment = Segment::extend(&best, parent, game);

            if !is_safe(game, best.node, &segment, self.config.min_ghost_distance) {
                restarts += 1;
                trace!(
                    "Planner: unsafe hop {} onto {}, restart #{}",
                    best.direction, best.node, restarts
                );
                segments.clear();
                frontier = agent;
                target = match select_target(game, true, &mut self.rng) {
                    Some(t) => t,
                    None => return PlanOutcome::NoTarget { restarts },
                };
                continue;
            }

            if let Some(previous) = segments.last_mut() {
                previous.end = segment.start;
            }
            frontier = segment.start;
            let reached = segment.start == target.node;
            segments.push(segment);

            if reached {
                return match Path::evaluate(segments, target.kind, game, &self.config) {
                    Some(path) => {
                        debug!(
                            "Planner: {:?} path [{}] value={} safe={} restarts={}",
                            path.target_kind(),
                            path.description(),
                            path.value(),
                            path.is_safe(),
                            restarts
                        );
                        PlanOutcome::Found { path, restarts }
                    }
                    None => PlanOutcome::NoTarget { restarts },
                };
            }
        }
    }
}

/// A planning agent that follows the first hop of a fresh path every tick.
#[derive(Debug)]
pub struct PlanningAgent {
    planner: PathPlanner,
    last_outcome: Option<PlanOutcome>,
}

impl PlanningAgent {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            planner: PathPlanner::new(config),
            last_outcome: None,
        }
    }

    /// Outcome of the most recent tick.
    pub fn last_outcome(&self) -> Option<&PlanOutcome> {
        self.last_outcome.as_ref()
    }
}

impl Agent for PlanningAgent {
    fn name(&self) -> &str {
        "planner"
    }

    fn get_move(&mut self, game: &dyn GameQuery, deadline: Instant) -> Move {
        let agent = game.pacman_node();
        let outcome = self.planner.build_path(game, deadline);

        let mv = match outcome.path() {
            Some(path) => game
                .move_to_reach_neighbour(agent, path.start())
                .unwrap_or(path.segments()[0].direction),
            None => {
                let fallback = game.pacman_last_move().opposite();
                debug!("Planner: no path this tick, reversing to {}", fallback);
                fallback
            }
        };

        self.last_outcome = Some(outcome);
        mv
    }

    fn planned_path(&self) -> Option<&Path> {
        self.last_outcome.as_ref().and_then(PlanOutcome::path)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{GameView, ObstacleState, Snapshot, load_maze_from_string};

    fn soon() -> Instant {
        Instant::now() + Duration::from_secs(2)
    }

    #[test]
    fn walks_straight_to_the_nearest_pill() {
        let maze = load_maze_from_string(
            "
            WL WL WL WL WL WL
            WL ST BL BL PI WL
            WL WL WL WL WL WL
            ",
        )
        .unwrap();
        let snapshot = Snapshot::initial(&maze);
        let view = GameView::new(&maze, &snapshot);
        let mut planner = PathPlanner::new(PlannerConfig::default().with_seed(1));

        let outcome = planner.build_path(&view, soon());
        let path = outcome.path().expect("path");
        assert_eq!(path.length(), 3);
        assert_eq!(path.end(), maze.pill_nodes()[0]);
        assert_eq!(path.target_kind(), TargetKind::Pill);
        assert_eq!(outcome.restarts(), 0);
        assert_eq!(path.description(), "RIGHT RIGHT RIGHT");
    }

    #[test]
    fn no_pills_means_no_target() {
        let maze = load_maze_from_string("WL ST BL WL").unwrap();
        let snapshot = Snapshot::initial(&maze);
        let view = GameView::new(&maze, &snapshot);
        let mut planner = PathPlanner::new(PlannerConfig::default().with_seed(1));

        assert_eq!(
            planner.build_path(&view, soon()),
            PlanOutcome::NoTarget { restarts: 0 }
        );
    }

    #[test]
    fn expired_deadline_times_out() {
        let maze = load_maze_from_string("WL ST BL PI WL").unwrap();
        let snapshot = Snapshot::initial(&maze);
        let view = GameView::new(&maze, &snapshot);
        let mut planner = PathPlanner::new(PlannerConfig::default().with_seed(1));

        let outcome = planner.build_path(&view, Instant::now());
        assert_eq!(outcome, PlanOutcome::TimedOut { restarts: 0 });
    }

    #[test]
    fn unsafe_hop_restarts_with_a_random_pill() {
        // The nearer pill on the right sits behind a head-on ghost.
        let maze = load_maze_from_string(
            "
            WL WL WL WL WL WL WL WL
            WL PI BL BL ST BL PI WL
            WL WL WL WL WL WL WL WL
            ",
        )
        .unwrap();
        let mut snapshot = Snapshot::initial(&maze);
        let right = maze.neighbour(maze.start_node(), Move::Right).unwrap();
        snapshot.obstacles.push(ObstacleState {
            node: right,
            last_move: Move::Left,
            edible: false,
        });
        let view = GameView::new(&maze, &snapshot);
        let mut planner = PathPlanner::new(PlannerConfig::default().with_seed(9));

        let outcome = planner.build_path(&view, soon());
        let path = outcome.path().expect("left pill is reachable safely");
        assert!(outcome.restarts() >= 1);
        assert_eq!(path.target_kind(), TargetKind::RandomPill);
        assert_eq!(path.end(), maze.pill_nodes()[0]);
        assert_eq!(path.length(), 3);
        assert!(path.is_safe());
    }

    #[test]
    fn restarts_never_settle_on_a_walled_off_pill() {
        // The left pill is behind a head-on ghost; the far right pill is sealed in.
        let maze = load_maze_from_string("WL PI BL ST BL PI WL PI WL").unwrap();
        let mut snapshot = Snapshot::initial(&maze);
        let left = maze.neighbour(maze.start_node(), Move::Left).unwrap();
        snapshot.obstacles.push(ObstacleState {
            node: left,
            last_move: Move::Right,
            edible: false,
        });
        let view = GameView::new(&maze, &snapshot);
        let reachable_right = maze.pill_nodes()[1];

        for seed in 0..60 {
            let mut planner = PathPlanner::new(PlannerConfig::default().with_seed(seed));
            let outcome = planner.build_path(&view, soon());
            let path = outcome.path().expect("right pill is reachable and safe");
            assert_eq!(path.end(), reachable_right, "seed {seed}");
            assert!(outcome.restarts() >= 1);
        }
    }

    #[test]
    fn agent_reverses_when_no_target() {
        let maze = load_maze_from_string("WL BL ST BL WL").unwrap();
        let mut snapshot = Snapshot::initial(&maze);
        snapshot.pacman_last_move = Move::Left;
        let view = GameView::new(&maze, &snapshot);
        let mut agent = PlanningAgent::new(PlannerConfig::default().with_seed(2));

        assert_eq!(agent.get_move(&view, soon()), Move::Right);
        assert!(agent.planned_path().is_none());
        assert!(matches!(
            agent.last_outcome(),
            Some(PlanOutcome::NoTarget { .. })
        ));
    }

    #[test]
    fn agent_takes_the_first_hop() {
        let maze = load_maze_from_string(
            "
            WL WL WL WL WL
            WL ST WL WL WL
            WL BL BL PP WL
            WL WL WL WL WL
            ",
        )
        .unwrap();
        let snapshot = Snapshot::initial(&maze);
        let view = GameView::new(&maze, &snapshot);
        let mut agent = PlanningAgent::new(PlannerConfig::default().with_seed(2));

        assert_eq!(agent.get_move(&view, soon()), Move::Down);
        let path = agent.planned_path().unwrap();
        assert_eq!(path.target_kind(), TargetKind::PowerPill);
        assert_eq!(path.description(), "DOWN RIGHT RIGHT");
    }
}
