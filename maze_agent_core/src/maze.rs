//! Static maze topology and the precomputed distance oracle.
//!
//! A [`Maze`] is built once from a text map. Every walkable cell becomes a
//! node; adjacency and all-pairs shortest-path distances are computed up
//! front so that per-tick queries are table lookups.

use std::{collections::VecDeque, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Move, Node, Position,
    error::{Error, MapError, Result},
    map::Grid,
};

const UNREACHABLE: u32 = u32::MAX;

/// Represents the static type of a cell in the maze grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Corridor,
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Wall
    }
}

/// Collectible placed on a cell by the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pickup {
    Pill,
    PowerPill,
}

/// Read-only maze graph with pill layout and spawn points.
#[derive(Debug, Clone)]
pub struct Maze {
    tiles: Grid<Tile>,
    node_at: Grid<Option<Node>>,
    wrapped_rows: Vec<bool>,
    positions: Vec<Position>,
    adjacency: Vec<[Option<Node>; 4]>,
    distances: Vec<u32>,
    pill_nodes: Vec<Node>,
    power_pill_nodes: Vec<Node>,
    pill_index: Vec<Option<usize>>,
    power_pill_index: Vec<Option<usize>>,
    start: Node,
    ghost_spawns: Vec<Node>,
}

impl Maze {
    /// Builds the node graph from a tile grid and the parsed collectibles.
    fn build(
        tiles: Grid<Tile>,
        pickups: &[(Position, Pickup)],
        start: Position,
        ghost_spawns: &[Position],
    ) -> Self {
        let width = tiles.width();
        let height = tiles.height();

        let wrapped_rows: Vec<bool> = (0..height)
            .map(|y| {
                width > 1
                    && tiles.get(0, y) == Some(&Tile::Corridor)
                    && tiles.get(width - 1, y) == Some(&Tile::Corridor)
            })
            .collect();

        let mut node_at: Grid<Option<Node>> = Grid::new(width, height);
        let mut positions = Vec::new();
        for (pos, tile) in tiles.enumerate() {
            if *tile == Tile::Corridor {
                node_at[pos] = Some(positions.len());
                positions.push(pos);
            }
        }

        let adjacency: Vec<[Option<Node>; 4]> = positions
            .iter()
            .map(|&pos| {
                let mut links = [None; 4];
                for mv in Move::DIRECTIONS {
                    links[mv.index()] = tiles
                        .step(pos, mv, wrapped_rows[pos.y])
                        .and_then(|next| node_at[next]);
                }
                links
            })
            .collect();

        let node_count = positions.len();
        let mut pill_nodes = Vec::new();
        let mut power_pill_nodes = Vec::new();
        let mut pill_index = vec![None; node_count];
        let mut power_pill_index = vec![None; node_count];
        for &(pos, pickup) in pickups {
            if let Some(node) = node_at[pos] {
                match pickup {
                    Pickup::Pill => {
                        pill_index[node] = Some(pill_nodes.len());
                        pill_nodes.push(node);
                    }
                    Pickup::PowerPill => {
                        power_pill_index[node] = Some(power_pill_nodes.len());
                        power_pill_nodes.push(node);
                    }
                }
            }
        }

        let distances = all_pairs_distances(&adjacency);
        let start = node_at[start].unwrap_or_default();
        let ghost_spawns = ghost_spawns.iter().filter_map(|&pos| node_at[pos]).collect();

        Maze {
            tiles,
            node_at,
            wrapped_rows,
            positions,
            adjacency,
            distances,
            pill_nodes,
            power_pill_nodes,
            pill_index,
            power_pill_index,
            start,
            ghost_spawns,
        }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    /// Returns the tile at the given coordinate, if inside the grid.
    pub fn tile(&self, x: usize, y: usize) -> Option<Tile> {
        self.tiles.get(x, y).copied()
    }

    /// Whether the row wraps around horizontally.
    pub fn is_wrapped_row(&self, y: usize) -> bool {
        self.wrapped_rows.get(y).copied().unwrap_or(false)
    }

    pub fn position(&self, node: Node) -> Option<Position> {
        self.positions.get(node).copied()
    }

    pub fn node_at(&self, position: Position) -> Option<Node> {
        self.node_at
            .get(position.x, position.y)
            .copied()
            .flatten()
    }

    /// Node reached from `node` by `mv`, or `None` when blocked.
    pub fn neighbour(&self, node: Node, mv: Move) -> Option<Node> {
        if mv == Move::Neutral {
            return None;
        }
        self.adjacency.get(node)?[mv.index()]
    }

    /// Moves leading to a neighbouring node, in [`Move::DIRECTIONS`] order.
    pub fn possible_moves(&self, node: Node) -> Vec<Move> {
        match self.adjacency.get(node) {
            Some(links) => Move::DIRECTIONS
                .into_iter()
                .filter(|mv| links[mv.index()].is_some())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Shortest-path hop count, or `None` when no route exists.
    pub fn shortest_path_distance(&self, from: Node, to: Node) -> Option<u32> {
        let n = self.node_count();
        if from >= n || to >= n {
            return None;
        }
        match self.distances[from * n + to] {
            UNREACHABLE => None,
            distance => Some(distance),
        }
    }

    /// Straight-line distance between node coordinates; infinite for unknown nodes.
    pub fn euclidean_distance(&self, a: Node, b: Node) -> f64 {
        match (self.position(a), self.position(b)) {
            (Some(pa), Some(pb)) => pa.euclidean_distance(&pb),
            _ => f64::INFINITY,
        }
    }

    pub fn pill_nodes(&self) -> &[Node] {
        &self.pill_nodes
    }

    pub fn power_pill_nodes(&self) -> &[Node] {
        &self.power_pill_nodes
    }

    pub fn pill_index(&self, node: Node) -> Option<usize> {
        self.pill_index.get(node).copied().flatten()
    }

    pub fn power_pill_index(&self, node: Node) -> Option<usize> {
        self.power_pill_index.get(node).copied().flatten()
    }

    /// Node the agent starts on.
    pub fn start_node(&self) -> Node {
        self.start
    }

    /// Spawn node of every ghost, in ghost id order.
    pub fn ghost_spawns(&self) -> &[Node] {
        &self.ghost_spawns
    }
}

/// Breadth-first search from every node.
///
/// Returns a flat `n * n` table; entries that stay [`UNREACHABLE`] have no route.
fn all_pairs_distances(adjacency: &[[Option<Node>; 4]]) -> Vec<u32> {
    let n = adjacency.len();
    let mut distances = vec![UNREACHABLE; n * n];
    let mut frontier = VecDeque::new();

    for source in 0..n {
        let row = &mut distances[source * n..(source + 1) * n];
        row[source] = 0;
        frontier.clear();
        frontier.push_back(source);

        while let Some(current) = frontier.pop_front() {
            let next_cost = row[current] + 1;
            for neighbour in adjacency[current].iter().flatten() {
                if row[*neighbour] == UNREACHABLE {
                    row[*neighbour] = next_cost;
                    frontier.push_back(*neighbour);
                }
            }
        }
    }

    distances
}

/// Loads a maze from a string representation of a map.
///
/// Each row is a list of whitespace separated codes: `WL` wall, `BL` empty
/// corridor, `PI` pill, `PP` power pill, `ST` agent start and `GH` ghost
/// spawn. A row whose two outermost cells are walkable wraps around.
pub fn load_maze_from_string(map_string: &str) -> std::result::Result<Maze, MapError> {
    let lines: Vec<&str> = map_string.trim().lines().collect();
    if lines.is_empty() {
        return Err(MapError::Empty);
    }

    let mut width = 0;
    let mut parsed_rows: Vec<Vec<&str>> = Vec::with_capacity(lines.len());
    for (y, line) in lines.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if y == 0 {
            width = tokens.len();
            if width == 0 {
                return Err(MapError::ZeroWidth);
            }
        } else if tokens.len() != width {
            return Err(MapError::InconsistentWidth {
                row: y,
                expected: width,
                found: tokens.len(),
            });
        }
        parsed_rows.push(tokens);
    }

    let mut tiles: Grid<Tile> = Grid::new(width, parsed_rows.len());
    let mut pickups = Vec::new();
    let mut ghost_spawns = Vec::new();
    let mut start_position: Option<Position> = None;

    for (y, row_tokens) in parsed_rows.iter().enumerate() {
        for (x, token) in row_tokens.iter().enumerate() {
            let pos = Position { x, y };
            let tile = match *token {
                "WL" => Tile::Wall,
                "BL" => Tile::Corridor,
                "PI" => {
                    pickups.push((pos, Pickup::Pill));
                    Tile::Corridor
                }
                "PP" => {
                    pickups.push((pos, Pickup::PowerPill));
                    Tile::Corridor
                }
                "GH" => {
                    ghost_spawns.push(pos);
                    Tile::Corridor
                }
                "ST" => {
                    if start_position.is_some() {
                        return Err(MapError::MultipleStarts);
                    }
                    start_position = Some(pos);
                    Tile::Corridor
                }
                unknown => {
                    return Err(MapError::UnknownCode {
                        code: unknown.to_string(),
                        x,
                        y,
                    });
                }
            };
            tiles.set(x, y, tile)?;
        }
    }

    let start = start_position.ok_or(MapError::MissingStart)?;
    Ok(Maze::build(tiles, &pickups, start, &ghost_spawns))
}

/// Reads a map file and loads it with [`load_maze_from_string`].
pub fn load_maze_from_file(path: impl AsRef<Path>) -> Result<Maze> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("read {}", path.display()), e))?;
    Ok(load_maze_from_string(&text)?)
}
