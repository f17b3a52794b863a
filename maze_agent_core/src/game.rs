use serde::{Deserialize, Serialize};

use crate::{Move, Node, ObstacleId, maze::Maze};

/// Per-tick state of one ghost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleState {
    pub node: Node,
    pub last_move: Move,
    pub edible: bool,
}

/// Read-only queries a strategy may issue against the current tick.
///
/// This is the whole contract between the decision core and the game that
/// drives it. Distances are `Option`s: `None` means unreachable and must
/// never be compared as a number.
pub trait GameQuery {
    /// Number of nodes in the maze graph.
    fn node_count(&self) -> usize;

    fn pacman_node(&self) -> Node;

    fn pacman_last_move(&self) -> Move;

    /// Node reached from `node` by `mv`, or `None` if the move is blocked.
    fn neighbour(&self, node: Node, mv: Move) -> Option<Node>;

    /// All moves from `node` that lead to a neighbouring node.
    fn possible_moves(&self, node: Node) -> Vec<Move>;

    /// Like [`GameQuery::possible_moves`] but without the reversal of `last_move`,
    /// unless reversing is the only way out.
    fn possible_moves_excluding_reverse(&self, node: Node, last_move: Move) -> Vec<Move> {
        let all = self.possible_moves(node);
        let reverse = last_move.opposite();
        let forward: Vec<Move> = all
            .iter()
            .copied()
            .filter(|mv| *mv != reverse)
            .collect();
        if forward.is_empty() { all } else { forward }
    }

    fn shortest_path_distance(&self, from: Node, to: Node) -> Option<u32>;

    fn euclidean_distance(&self, a: Node, b: Node) -> f64;

    fn active_pill_nodes(&self) -> Vec<Node>;

    fn active_power_pill_nodes(&self) -> Vec<Node>;

    fn pill_index(&self, node: Node) -> Option<usize>;

    fn is_pill_available(&self, index: usize) -> bool;

    fn power_pill_index(&self, node: Node) -> Option<usize>;

    fn is_power_pill_available(&self, index: usize) -> bool;

    fn obstacle_count(&self) -> usize;

    fn obstacle_node(&self, id: ObstacleId) -> Option<Node>;

    fn is_obstacle_edible(&self, id: ObstacleId) -> bool;

    fn obstacle_last_move(&self, id: ObstacleId) -> Move;

    /// Move that takes `from` directly onto its neighbour `to`.
    fn move_to_reach_neighbour(&self, from: Node, to: Node) -> Option<Move> {
        self.possible_moves(from)
            .into_iter()
            .find(|mv| self.neighbour(from, *mv) == Some(to))
    }

    /// Whether an available pill lies on `node`.
    fn has_available_pill(&self, node: Node) -> bool {
        self.pill_index(node)
            .is_some_and(|index| self.is_pill_available(index))
    }

    /// Whether an available power pill lies on `node`.
    fn has_available_power_pill(&self, node: Node) -> bool {
        self.power_pill_index(node)
            .is_some_and(|index| self.is_power_pill_available(index))
    }

    /// Ids of the ghosts currently standing on `node`, in id order.
    fn obstacles_at(&self, node: Node) -> Vec<ObstacleId> {
        (0..self.obstacle_count())
            .filter(|id| self.obstacle_node(*id) == Some(node))
            .collect()
    }
}

/// Dynamic part of a tick: where everyone is and what is left to eat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub pacman: Node,
    pub pacman_last_move: Move,
    pub obstacles: Vec<ObstacleState>,
    pub pills_available: Vec<bool>,
    pub power_pills_available: Vec<bool>,
}

impl Snapshot {
    /// Start-of-level snapshot: every pill present, ghosts on their spawns.
    pub fn initial(maze: &Maze) -> Self {
        Snapshot {
            pacman: maze.start_node(),
            pacman_last_move: Move::Neutral,
            obstacles: maze
                .ghost_spawns()
                .iter()
                .map(|&node| ObstacleState {
                    node,
                    last_move: Move::Neutral,
                    edible: false,
                })
                .collect(),
            pills_available: vec![true; maze.pill_nodes().len()],
            power_pills_available: vec![true; maze.power_pill_nodes().len()],
        }
    }

    pub fn remaining_pills(&self) -> usize {
        self.pills_available.iter().filter(|a| **a).count()
    }

    pub fn remaining_power_pills(&self) -> usize {
        self.power_pills_available.iter().filter(|a| **a).count()
    }
}

/// Provides a read-only view of one tick: the static maze plus a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    pub maze: &'a Maze,
    pub snapshot: &'a Snapshot,
}

impl<'a> GameView<'a> {
    pub fn new(maze: &'a Maze, snapshot: &'a Snapshot) -> Self {
        GameView { maze, snapshot }
    }
}

impl GameQuery for GameView<'_> {
    fn node_count(&self) -> usize {
        self.maze.node_count()
    }

    fn pacman_node(&self) -> Node {
        self.snapshot.pacman
    }

    fn pacman_last_move(&self) -> Move {
        self.snapshot.pacman_last_move
    }

    fn neighbour(&self, node: Node, mv: Move) -> Option<Node> {
        self.maze.neighbour(node, mv)
    }

    fn possible_moves(&self, node: Node) -> Vec<Move> {
        self.maze.possible_moves(node)
    }

    fn shortest_path_distance(&self, from: Node, to: Node) -> Option<u32> {
        self.maze.shortest_path_distance(from, to)
    }

    fn euclidean_distance(&self, a: Node, b: Node) -> f64 {
        self.maze.euclidean_distance(a, b)
    }

    fn active_pill_nodes(&self) -> Vec<Node> {
        active_nodes(self.maze.pill_nodes(), &self.snapshot.pills_available)
    }

    fn active_power_pill_nodes(&self) -> Vec<Node> {
        active_nodes(
            self.maze.power_pill_nodes(),
            &self.snapshot.power_pills_available,
        )
    }

    fn pill_index(&self, node: Node) -> Option<usize> {
        self.maze.pill_index(node)
    }

    fn is_pill_available(&self, index: usize) -> bool {
        self.snapshot.pills_available.get(index).copied().unwrap_or(false)
    }

    fn power_pill_index(&self, node: Node) -> Option<usize> {
        self.maze.power_pill_index(node)
    }

    fn is_power_pill_available(&self, index: usize) -> bool {
        self.snapshot
            .power_pills_available
            .get(index)
            .copied()
            .unwrap_or(false)
    }

    fn obstacle_count(&self) -> usize {
        self.snapshot.obstacles.len()
    }

    fn obstacle_node(&self, id: ObstacleId) -> Option<Node> {
        self.snapshot.obstacles.get(id).map(|o| o.node)
    }

    fn is_obstacle_edible(&self, id: ObstacleId) -> bool {
        self.snapshot.obstacles.get(id).is_some_and(|o| o.edible)
    }

    fn obstacle_last_move(&self, id: ObstacleId) -> Move {
        self.snapshot
            .obstacles
            .get(id)
            .map_or(Move::Neutral, |o| o.last_move)
    }
}

fn active_nodes(layout: &[Node], available: &[bool]) -> Vec<Node> {
    layout
        .iter()
        .zip(available)
        .filter_map(|(node, present)| present.then_some(*node))
        .collect()
}
