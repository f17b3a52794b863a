//! Single hops of a planned route.

use crate::{GameQuery, Move, Node, ObstacleId};

/// One hop of a planned path with bookkeeping.
///
/// `start` is the node this hop lands on, reached by `direction` from the
/// previous hop (or from the agent for the first segment). `end` is the node
/// where the following hop lands; on the target segment `end == start`.
/// `parent` is an index into the owning segment vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: Node,
    pub end: Node,
    pub direction: Move,
    /// Shortest-path distance from `start` to the target, `None` if unreachable.
    pub heuristic_score: Option<u32>,
    /// Hops from the agent up to and including this one.
    pub length_so_far: u32,
    /// Pills collected along the chain so far.
    pub pills_count: u32,
    /// Power pills collected along the chain so far.
    pub power_pills_count: u32,
    pub parent: Option<usize>,
    pub safe: bool,
    /// Ghosts standing on `start` when the segment was built.
    pub ghosts_present: Vec<ObstacleId>,
}

impl Segment {
    /// Extends the chain ending at `parent` (index and segment) by `candidate`.
    pub(crate) fn extend(
        candidate: &Candidate,
        parent: Option<(usize, &Segment)>,
        game: &dyn GameQuery,
    ) -> Self {
        let (length, pills, power_pills) = parent.map_or((0, 0, 0), |(_, p)| {
            (p.length_so_far, p.pills_count, p.power_pills_count)
        });

        Segment {
            start: candidate.node,
            end: candidate.node,
            direction: candidate.direction,
            heuristic_score: candidate.distance,
            length_so_far: length + 1,
            pills_count: pills + u32::from(game.has_available_pill(candidate.node)),
            power_pills_count: power_pills
                + u32::from(game.has_available_power_pill(candidate.node)),
            parent: parent.map(|(index, _)| index),
            safe: true,
            ghosts_present: game.obstacles_at(candidate.node),
        }
    }
}

/// A possible next hop from the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub node: Node,
    pub direction: Move,
    pub distance: Option<u32>,
}

/// Legal hops from `frontier`, nearest to `target` first.
///
/// The sort is stable so equal distances keep move enumeration order.
/// Unreachable neighbours sort after every reachable one.
pub(crate) fn ordered_candidates(
    game: &dyn GameQuery,
    frontier: Node,
    target: Node,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = game
        .possible_moves(frontier)
        .into_iter()
        .filter_map(|direction| {
            let node = game.neighbour(frontier, direction)?;
            Some(Candidate {
                node,
                direction,
                distance: game.shortest_path_distance(node, target),
            })
        })
        .collect();

    candidates.sort_by_key(|c| match c.distance {
        Some(distance) => (false, distance),
        None => (true, 0),
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameView, Snapshot, load_maze_from_string};

    const CROSS: &str = "
        WL WL WL WL WL
        WL WL PI WL WL
        WL BL ST PP WL
        WL WL BL WL WL
        WL WL WL WL WL
    ";

    #[test]
    fn candidates_are_sorted_by_distance_then_move_order() {
        let maze = load_maze_from_string(CROSS).unwrap();
        let snapshot = Snapshot::initial(&maze);
        let view = GameView::new(&maze, &snapshot);
        let start = maze.start_node();
        let power_pill = maze.power_pill_nodes()[0];

        let ordered = ordered_candidates(&view, start, power_pill);
        let directions: Vec<Move> = ordered.iter().map(|c| c.direction).collect();
        // Right reaches the target; the other three tie at distance 2 and
        // keep Up, Down, Left enumeration order.
        assert_eq!(directions, vec![Move::Right, Move::Up, Move::Down, Move::Left]);
        assert_eq!(ordered[0].distance, Some(0));
    }

    #[test]
    fn extend_accumulates_counts() {
        let maze = load_maze_from_string(CROSS).unwrap();
        let snapshot = Snapshot::initial(&maze);
        let view = GameView::new(&maze, &snapshot);
        let start = maze.start_node();
        let pill = maze.pill_nodes()[0];

        let first = Segment::extend(
            &Candidate {
                node: pill,
                direction: Move::Up,
                distance: Some(2),
            },
            None,
            &view,
        );
        assert_eq!(first.length_so_far, 1);
        assert_eq!(first.pills_count, 1);
        assert_eq!(first.parent, None);

        let second = Segment::extend(
            &Candidate {
                node: start,
                direction: Move::Down,
                distance: Some(1),
            },
            Some((0, &first)),
            &view,
        );
        assert_eq!(second.length_so_far, 2);
        assert_eq!(second.pills_count, 1);
        assert_eq!(second.power_pills_count, 0);
        assert_eq!(second.parent, Some(0));
        assert!(second.safe);
    }
}
