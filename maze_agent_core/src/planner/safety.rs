use crate::{GameQuery, Node, planner::Segment};

/// Whether entering `candidate_node` by `segment` avoids a head-on ghost.
///
/// A hop is unsafe only when an inedible ghost stands on the candidate node,
/// its last move is the exact reverse of the segment's direction, and the
/// agent is within `threshold` straight-line distance of that node. Edible
/// ghosts, ghosts moving away or sideways, and distant ghosts are all safe.
/// This looks one hop ahead and nothing further.
pub fn is_safe(
    game: &dyn GameQuery,
    candidate_node: Node,
    segment: &Segment,
    threshold: f64,
) -> bool {
    let agent = game.pacman_node();
    let head_on = segment.direction.opposite();

    !(0..game.obstacle_count()).any(|id| {
        game.obstacle_node(id) == Some(candidate_node)
            && !game.is_obstacle_edible(id)
            && game.obstacle_last_move(id) == head_on
            && game.euclidean_distance(agent, candidate_node) <= threshold
    })
}
