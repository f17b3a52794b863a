//! A small maze game the agents can play in.
//!
//! Pac-Man moves first, then every ghost takes one random step that never
//! turns back unless it has to. Eating a power pill turns all ghosts edible
//! for a fixed number of ticks.

use maze_agent_core::{GameQuery, GameView, Maze, Move, ObstacleState, Snapshot};
use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use tracing::{debug, info};

const PILL_POINTS: u32 = 10;
const POWER_PILL_POINTS: u32 = 50;
const GHOST_POINTS: u32 = 200;

/// Rules of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub lives: u32,
    pub edible_ticks: u32,
    pub tick_limit: u64,
}

/// Whether the episode is still running and, if not, why it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Cleared,
    OutOfLives,
    TickLimit,
}

impl Status {
    pub fn is_over(self) -> bool {
        self != Status::Running
    }
}

#[derive(Debug)]
pub struct World {
    maze: Maze,
    snapshot: Snapshot,
    rules: Rules,
    rng: StdRng,
    lives: u32,
    score: u32,
    ticks: u64,
    edible_remaining: u32,
    episode: u32,
    status: Status,
}

impl World {
    pub fn new(maze: Maze, rules: Rules, seed: u64) -> Self {
        let snapshot = Snapshot::initial(&maze);
        World {
            maze,
            snapshot,
            rules,
            rng: StdRng::seed_from_u64(seed),
            lives: rules.lives,
            score: 0,
            ticks: 0,
            edible_remaining: 0,
            episode: 1,
            status: Status::Running,
        }
    }

    /// Starts a fresh episode on the same maze.
    pub fn restart(&mut self) {
        self.snapshot = Snapshot::initial(&self.maze);
        self.lives = self.rules.lives;
        self.score = 0;
        self.ticks = 0;
        self.edible_remaining = 0;
        self.episode += 1;
        self.status = Status::Running;
    }

    pub fn view(&self) -> GameView<'_> {
        GameView::new(&self.maze, &self.snapshot)
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Advances the game by one tick with Pac-Man playing `mv`.
    pub fn step(&mut self, mv: Move) -> Status {
        if self.status.is_over() {
            return self.status;
        }

        let before = self.snapshot.pacman;
        if let Some(next) = self.maze.neighbour(before, mv) {
            self.snapshot.pacman = next;
            self.snapshot.pacman_last_move = mv;
        }
        self.eat_pills();

        // A caught Pac-Man ends the tick with everyone back on their spawns.
        if !self.resolve_collisions(None) {
            let ghost_origins: Vec<_> = self.snapshot.obstacles.iter().map(|g| g.node).collect();
            self.move_ghosts();
            self.resolve_collisions(Some((before, ghost_origins.as_slice())));
        }

        if self.edible_remaining > 0 {
            self.edible_remaining -= 1;
            if self.edible_remaining == 0 {
                for ghost in &mut self.snapshot.obstacles {
                    ghost.edible = false;
                }
            }
        }

        self.ticks += 1;
        self.status = if self.snapshot.remaining_pills() == 0
            && self.snapshot.remaining_power_pills() == 0
        {
            Status::Cleared
        } else if self.lives == 0 {
            Status::OutOfLives
        } else if self.ticks >= self.rules.tick_limit {
            Status::TickLimit
        } else {
            Status::Running
        };

        if self.status.is_over() {
            info!(
                "Episode {} ended: {:?} score={} ticks={}",
                self.episode, self.status, self.score, self.ticks
            );
        }
        self.status
    }

    fn eat_pills(&mut self) {
        let node = self.snapshot.pacman;
        if let Some(index) = self.maze.pill_index(node) {
            if self.snapshot.pills_available[index] {
                self.snapshot.pills_available[index] = false;
                self.score += PILL_POINTS;
            }
        }
        if let Some(index) = self.maze.power_pill_index(node) {
            if self.snapshot.power_pills_available[index] {
                self.snapshot.power_pills_available[index] = false;
                self.score += POWER_PILL_POINTS;
                self.edible_remaining = self.rules.edible_ticks;
                for ghost in &mut self.snapshot.obstacles {
                    ghost.edible = self.rules.edible_ticks > 0;
                }
                debug!("Power pill eaten at {}, ghosts edible", node);
            }
        }
    }

    fn move_ghosts(&mut self) {
        let view = GameView::new(&self.maze, &self.snapshot);
        let moves: Vec<Option<Move>> = self
            .snapshot
            .obstacles
            .iter()
            .map(|ghost| {
                view.possible_moves_excluding_reverse(ghost.node, ghost.last_move)
                    .choose(&mut self.rng)
                    .copied()
            })
            .collect();

        for (ghost, mv) in self.snapshot.obstacles.iter_mut().zip(moves) {
            if let Some(next) = mv.and_then(|mv| self.maze.neighbour(ghost.node, mv)) {
                ghost.node = next;
                ghost.last_move = mv.unwrap_or(Move::Neutral);
            }
        }
    }

    /// Handles every ghost sharing Pac-Man's node, or swapping places with
    /// Pac-Man when `crossing` holds the positions before the ghost step.
    /// Returns whether Pac-Man lost a life.
    fn resolve_collisions(&mut self, crossing: Option<(usize, &[usize])>) -> bool {
        let pacman = self.snapshot.pacman;
        let hits: Vec<usize> = self
            .snapshot
            .obstacles
            .iter()
            .enumerate()
            .filter(|(id, ghost)| {
                ghost.node == pacman
                    || crossing.is_some_and(|(before, origins)| {
                        ghost.node == before && origins.get(*id) == Some(&pacman)
                    })
            })
            .map(|(id, _)| id)
            .collect();

        for id in hits {
            if self.snapshot.obstacles[id].edible {
                self.score += GHOST_POINTS;
                self.snapshot.obstacles[id] = self.respawned(id);
                debug!("Ghost {} eaten", id);
            } else {
                self.lose_life();
                return true;
            }
        }
        false
    }

    fn respawned(&self, id: usize) -> ObstacleState {
        ObstacleState {
            node: self.maze.ghost_spawns()[id],
            last_move: Move::Neutral,
            edible: false,
        }
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        debug!("Caught by a ghost, {} lives left", self.lives);
        self.snapshot.pacman = self.maze.start_node();
        self.snapshot.pacman_last_move = Move::Neutral;
        self.edible_remaining = 0;
        self.snapshot.obstacles = (0..self.snapshot.obstacles.len())
            .map(|id| self.respawned(id))
            .collect();
    }
}
