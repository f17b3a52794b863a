use crate::{
    GameQuery, Move, Node,
    config::{InedibleGhostPolicy, RewardConfig},
};

/// Immediate reward for taking `action` from `state` this tick.
///
/// Pure: the result depends only on the arguments. The reward collects the
/// pill and power pill waiting on the next node, credits every edible ghost
/// within `eat_distance` of it (and charges inedible ones when the policy
/// says so), then subtracts the per-tick cost. A blocked move only pays the
/// tick cost.
pub fn reward(game: &dyn GameQuery, state: Node, action: Move, config: &RewardConfig) -> f64 {
    let Some(next) = game.neighbour(state, action) else {
        return -config.tick_cost;
    };

    let mut total = 0.0;

    if game.has_available_pill(next) {
        total += config.pill;
    }
    if game.has_available_power_pill(next) {
        total += config.power_pill;
    }

    for ghost in 0..game.obstacle_count() {
        let Some(ghost_node) = game.obstacle_node(ghost) else {
            continue;
        };
        let Some(distance) = game.shortest_path_distance(next, ghost_node) else {
            continue;
        };
        if distance > config.eat_distance {
            continue;
        }
        if game.is_obstacle_edible(ghost) {
            total += config.edible_ghost;
        } else if let InedibleGhostPolicy::Penalty(penalty) = config.inedible_ghost {
            total -= penalty;
        }
    }

    total - config.tick_cost
}
