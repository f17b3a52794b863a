use std::time::{Duration, Instant};

use maze_agent_core::{
    Agent, GameQuery, GameView, Move, ObstacleState, Snapshot,
    config::{LearningConfig, RewardConfig},
    learning::{QLearningAgent, QTable, reward},
    load_maze_from_string,
};
use proptest::prelude::*;

const CORRIDOR: &str = "
    WL WL WL WL WL WL WL
    WL ST PI PI PP BL WL
    WL WL WL WL WL WL WL
";

#[test]
fn fresh_table_single_update_is_exactly_one() {
    let mut table = QTable::new(5, 0.1, 0.9);
    assert_eq!(table.update(2, Move::Right, 10.0, 0.0), 1.0);
    assert_eq!(table.get(2, Move::Right), 1.0);
}

#[test]
fn learner_walks_a_corridor_and_collects_reward() {
    let maze = load_maze_from_string(CORRIDOR).unwrap();
    let mut snapshot = Snapshot::initial(&maze);
    let mut agent = QLearningAgent::new(
        LearningConfig::default()
            .with_exploration_rate(0.0)
            .with_seed(11),
    );

    for _ in 0..3 {
        let view = GameView::new(&maze, &snapshot);
        let mv = agent.get_move(&view, Instant::now() + Duration::from_millis(10));
        assert_eq!(mv, Move::Right);

        let next = view.neighbour(snapshot.pacman, mv).unwrap();
        if let Some(index) = maze.pill_index(next) {
            snapshot.pills_available[index] = false;
        }
        snapshot.pacman = next;
        snapshot.pacman_last_move = mv;
    }

    // Two pills and a power pill, three tick costs.
    let expected = 10.0 + 10.0 + 50.0 - 3.0 * 0.01;
    assert!((agent.total_reward() - expected).abs() < 1e-9);
}

#[test]
fn reward_ignores_ghosts_beyond_eat_distance() {
    let maze = load_maze_from_string(CORRIDOR).unwrap();
    let mut snapshot = Snapshot::initial(&maze);
    snapshot.obstacles.push(ObstacleState {
        node: maze.node_count() - 1,
        last_move: Move::Left,
        edible: true,
    });
    let view = GameView::new(&maze, &snapshot);
    let config = RewardConfig::default().with_eat_distance(1);

    let r = reward(&view, maze.start_node(), Move::Right, &config);
    assert!((r - (10.0 - 0.01)).abs() < 1e-9);
}

proptest! {
    #[test]
    fn reward_is_idempotent(
        state in 0usize..5,
        action in prop::sample::select(Move::ALL.to_vec()),
        edible in any::<bool>(),
        ghost in 0usize..5,
        eaten in prop::collection::vec(any::<bool>(), 2),
    ) {
        let maze = load_maze_from_string(CORRIDOR).unwrap();
        let mut snapshot = Snapshot::initial(&maze);
        snapshot.pills_available = eaten.iter().map(|e| !e).collect();
        snapshot.obstacles.push(ObstacleState { node: ghost, last_move: Move::Left, edible });
        let view = GameView::new(&maze, &snapshot);
        let config = RewardConfig::default();

        let first = reward(&view, state, action, &config);
        let second = reward(&view, state, action, &config);
        prop_assert_eq!(first.to_bits(), second.to_bits());
    }
}
