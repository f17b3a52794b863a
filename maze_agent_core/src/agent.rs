use std::time::Instant;

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{GameQuery, Move, planner::Path};

/// Trait defining the behavior of an agent.
/// Agents choose one move per tick from a read-only view of the game.
pub trait Agent {
    /// Short human readable name of the strategy.
    fn name(&self) -> &str;

    /// Determines the move to make this tick.
    ///
    /// `deadline` is the wall-clock instant by which a decision is due.
    /// `&mut self` allows the agent to keep internal state between ticks
    /// (the learned table, the random source, diagnostics).
    fn get_move(&mut self, game: &dyn GameQuery, deadline: Instant) -> Move;

    /// The route planned on the last tick, for agents that plan one.
    fn planned_path(&self) -> Option<&Path> {
        None
    }
}

/// Builds the injected random source, seeded when a seed is given.
pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// A baseline agent that wanders randomly without turning back.
#[derive(Debug)]
pub struct RandomWalker {
    rng: StdRng,
}

impl RandomWalker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomWalker {
    fn name(&self) -> &str {
        "random"
    }

    fn get_move(&mut self, game: &dyn GameQuery, _deadline: Instant) -> Move {
        let moves =
            game.possible_moves_excluding_reverse(game.pacman_node(), game.pacman_last_move());
        moves.choose(&mut self.rng).copied().unwrap_or(Move::Neutral)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{GameView, Snapshot, load_maze_from_string};

    #[test]
    fn random_walker_only_picks_legal_moves() {
        let maze = load_maze_from_string(
            "
            WL WL WL WL WL
            WL BL BL BL WL
            WL BL ST BL WL
            WL BL BL BL WL
            WL WL WL WL WL
            ",
        )
        .unwrap();
        let mut snapshot = Snapshot::initial(&maze);
        snapshot.pacman_last_move = Move::Up;
        let view = GameView::new(&maze, &snapshot);
        let mut agent = RandomWalker::new(3);
        let deadline = Instant::now() + Duration::from_millis(10);

        for _ in 0..50 {
            let mv = agent.get_move(&view, deadline);
            assert!(view.possible_moves(snapshot.pacman).contains(&mv));
            assert_ne!(mv, Move::Down);
        }
    }

    #[test]
    fn random_walker_is_reproducible_with_a_seed() {
        let maze = load_maze_from_string("BL ST BL").unwrap();
        let snapshot = Snapshot::initial(&maze);
        let view = GameView::new(&maze, &snapshot);
        let deadline = Instant::now();

        let mut a = RandomWalker::new(11);
        let mut b = RandomWalker::new(11);
        let first: Vec<Move> = (0..20).map(|_| a.get_move(&view, deadline)).collect();
        let second: Vec<Move> = (0..20).map(|_| b.get_move(&view, deadline)).collect();
        assert_eq!(first, second);
    }
}
