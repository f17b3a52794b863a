//! Target choice for the path planner.

use rand::{Rng, seq::IndexedRandom};
use tracing::debug;

use crate::{GameQuery, Node};

/// Which rule produced a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    EdibleGhost,
    PowerPill,
    Pill,
    /// A pill drawn at random after an unsafe hop.
    RandomPill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub node: Node,
    pub kind: TargetKind,
}

/// Chooses the node the planner should head for.
///
/// With `force_random` a uniformly random active pill reachable from the
/// agent is returned (or `None` when there is none). Otherwise the first
/// rule that matches wins: nearest edible ghost, nearest power pill, nearest
/// pill. Only reachable candidates count and ties keep the first one
/// enumerated.
pub fn select_target<R: Rng + ?Sized>(
    game: &dyn GameQuery,
    force_random: bool,
    rng: &mut R,
) -> Option<Target> {
    let agent = game.pacman_node();
    let target = if force_random {
        let reachable: Vec<Node> = game
            .active_pill_nodes()
            .into_iter()
            .filter(|&node| game.shortest_path_distance(agent, node).is_some())
            .collect();
        reachable
            .choose(rng)
            .map(|&node| Target {
                node,
                kind: TargetKind::RandomPill,
            })
    } else {
        let edible_ghosts = (0..game.obstacle_count())
            .filter(|id| game.is_obstacle_edible(*id))
            .filter_map(|id| game.obstacle_node(id));

        nearest(game, agent, edible_ghosts)
            .map(|node| Target {
                node,
                kind: TargetKind::EdibleGhost,
            })
            .or_else(|| {
                nearest(game, agent, game.active_power_pill_nodes()).map(|node| Target {
                    node,
                    kind: TargetKind::PowerPill,
                })
            })
            .or_else(|| {
                nearest(game, agent, game.active_pill_nodes()).map(|node| Target {
                    node,
                    kind: TargetKind::Pill,
                })
            })
    };

    match target {
        Some(t) => debug!("Current target is {:?} at node {}", t.kind, t.node),
        None => debug!("No reachable target (forced random: {})", force_random),
    }
    target
}

/// Closest node to `agent` by shortest path; unreachable nodes are skipped.
fn nearest(
    game: &dyn GameQuery,
    agent: Node,
    nodes: impl IntoIterator<Item = Node>,
) -> Option<Node> {
    let mut best: Option<(Node, u32)> = None;
    for node in nodes {
        let Some(distance) = game.shortest_path_distance(node, agent) else {
            continue;
        };
        if best.is_none_or(|(_, min)| distance < min) {
            best = Some((node, distance));
        }
    }
    best.map(|(node, _)| node)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{GameView, Snapshot, load_maze_from_string};

    const MAP: &str = "
        WL WL WL WL WL WL WL WL
        WL PI BL ST BL GH PP WL
        WL WL WL WL WL WL WL WL
        WL PI WL WL WL WL WL WL
        WL WL WL WL WL WL WL WL
    ";

    fn rng() -> StdRng {
        StdRng::seed_from_u64(5)
    }

    #[test]
    fn edible_ghost_comes_first() {
        let maze = load_maze_from_string(MAP).unwrap();
        let mut snapshot = Snapshot::initial(&maze);
        snapshot.obstacles[0].edible = true;
        let view = GameView::new(&maze, &snapshot);

        let target = select_target(&view, false, &mut rng()).unwrap();
        assert_eq!(target.kind, TargetKind::EdibleGhost);
        assert_eq!(target.node, maze.ghost_spawns()[0]);
    }

    #[test]
    fn power_pill_beats_a_closer_pill() {
        let maze = load_maze_from_string(MAP).unwrap();
        let snapshot = Snapshot::initial(&maze);
        let view = GameView::new(&maze, &snapshot);

        let target = select_target(&view, false, &mut rng()).unwrap();
        assert_eq!(target.kind, TargetKind::PowerPill);
        assert_eq!(target.node, maze.power_pill_nodes()[0]);
    }

    #[test]
    fn unreachable_pills_are_never_chosen() {
        let maze = load_maze_from_string(MAP).unwrap();
        let mut snapshot = Snapshot::initial(&maze);
        snapshot.power_pills_available[0] = false;
        let view = GameView::new(&maze, &snapshot);

        let target = select_target(&view, false, &mut rng()).unwrap();
        assert_eq!(target.kind, TargetKind::Pill);
        assert_eq!(target.node, maze.pill_nodes()[0]);
        assert!(
            view.shortest_path_distance(target.node, view.pacman_node())
                .is_some()
        );
    }

    #[test]
    fn nothing_reachable_means_no_target() {
        let maze = load_maze_from_string(MAP).unwrap();
        let mut snapshot = Snapshot::initial(&maze);
        snapshot.power_pills_available[0] = false;
        snapshot.pills_available[0] = false;
        let view = GameView::new(&maze, &snapshot);

        assert_eq!(select_target(&view, false, &mut rng()), None);
    }

    #[test]
    fn forced_random_draws_from_active_pills() {
        let maze = load_maze_from_string(MAP).unwrap();
        let mut snapshot = Snapshot::initial(&maze);
        snapshot.obstacles[0].edible = true;
        let view = GameView::new(&maze, &snapshot);
        let mut rng = rng();

        for _ in 0..20 {
            let target = select_target(&view, true, &mut rng).unwrap();
            assert_eq!(target.kind, TargetKind::RandomPill);
            assert!(maze.pill_nodes().contains(&target.node));
        }

        snapshot.pills_available.fill(false);
        let view = GameView::new(&maze, &snapshot);
        assert_eq!(select_target(&view, true, &mut rng), None);
    }

    #[test]
    fn forced_random_skips_walled_off_pills() {
        let maze = load_maze_from_string("WL PI BL ST BL PI WL PI WL").unwrap();
        let snapshot = Snapshot::initial(&maze);
        let view = GameView::new(&maze, &snapshot);
        let walled_off = maze.pill_nodes()[2];
        let mut rng = rng();

        for _ in 0..50 {
            let target = select_target(&view, true, &mut rng).unwrap();
            assert_ne!(target.node, walled_off);
        }

        let mut snapshot = snapshot.clone();
        snapshot.pills_available[0] = false;
        snapshot.pills_available[1] = false;
        let view = GameView::new(&maze, &snapshot);
        assert_eq!(select_target(&view, true, &mut rng), None);
    }

    #[test]
    fn ties_keep_the_first_ghost() {
        let maze = load_maze_from_string(
            "
            WL WL WL WL WL WL WL
            WL GH BL ST BL GH WL
            WL WL WL WL WL WL WL
            ",
        )
        .unwrap();
        let mut snapshot = Snapshot::initial(&maze);
        for ghost in &mut snapshot.obstacles {
            ghost.edible = true;
        }
        let view = GameView::new(&maze, &snapshot);

        let target = select_target(&view, false, &mut rng()).unwrap();
        assert_eq!(target.node, maze.ghost_spawns()[0]);
    }
}
