use rand::{Rng, seq::IndexedRandom};

use crate::{GameQuery, Move, Node, learning::QTable};

/// ε-greedy move selection.
///
/// When `epsilon_sample` exceeds `exploration_rate` the highest-valued legal
/// move is exploited (ties go to the first enumerated move). Otherwise a
/// legal move is drawn uniformly, avoiding a reversal of `last_move` when
/// any other move exists. Only moves leading to a neighbour are ever
/// returned; a node without any yields [`Move::Neutral`].
pub fn choose_move<R: Rng + ?Sized>(
    table: &QTable,
    game: &dyn GameQuery,
    state: Node,
    last_move: Move,
    epsilon_sample: f64,
    exploration_rate: f64,
    rng: &mut R,
) -> Move {
    let legal = game.possible_moves(state);

    if epsilon_sample > exploration_rate {
        if let Some(best) = table.greedy_action(state, &legal) {
            if game.neighbour(state, best).is_some() {
                return best;
            }
        }
        return legal.choose(rng).copied().unwrap_or(Move::Neutral);
    }

    game.possible_moves_excluding_reverse(state, last_move)
        .choose(rng)
        .copied()
        .unwrap_or(Move::Neutral)
}
