use std::fmt;

use serde::{Deserialize, Serialize};

pub mod agent;
pub mod config;
pub mod error;
pub mod game;
pub mod learning;
pub mod map;
pub mod maze;
pub mod planner;

pub use agent::Agent;
pub use error::{ConfigError, Error, MapError, Result};
pub use game::{GameQuery, GameView, ObstacleState, Snapshot};
pub use maze::{Maze, load_maze_from_file, load_maze_from_string};

/// Identifier of a maze graph vertex.
pub type Node = usize;

/// Identifier of a ghost. Ids run from zero in a stable enumeration order.
pub type ObstacleId = usize;

/// Represents a 2D coordinate on the maze grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    /// Straight-line distance between two grid coordinates.
    pub fn euclidean_distance(&self, other: &Position) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A discrete direction of travel between adjacent nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Up,
    Right,
    Down,
    Left,
    Neutral,
}

impl Move {
    /// Number of moves, and columns of the Q-table.
    pub const COUNT: usize = 5;

    /// Enumeration order used for tie-breaks and table columns.
    pub const ALL: [Move; Move::COUNT] = [Move::Up, Move::Right, Move::Down, Move::Left, Move::Neutral];

    /// The four moves that actually change position.
    pub const DIRECTIONS: [Move; 4] = [Move::Up, Move::Right, Move::Down, Move::Left];

    /// Returns the reverse direction. `Neutral` is its own opposite.
    pub fn opposite(self) -> Move {
        match self {
            Move::Up => Move::Down,
            Move::Right => Move::Left,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Neutral => Move::Neutral,
        }
    }

    /// Column index of this move.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Move::Up => 0,
            Move::Right => 1,
            Move::Down => 2,
            Move::Left => 3,
            Move::Neutral => 4,
        }
    }

    /// Grid offset of a single step in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Move::Up => (0, -1),
            Move::Right => (1, 0),
            Move::Down => (0, 1),
            Move::Left => (-1, 0),
            Move::Neutral => (0, 0),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "UP",
            Move::Right => "RIGHT",
            Move::Down => "DOWN",
            Move::Left => "LEFT",
            Move::Neutral => "NEUTRAL",
        };
        f.write_str(name)
    }
}
