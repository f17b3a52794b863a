//! Dense Q-table for temporal difference learning.

use std::io::Write;

use crate::{Move, Node};

/// Q-table mapping (node, move) pairs to Q-values.
///
/// One row per maze node, one column per [`Move`] in [`Move::ALL`] order.
/// The table is sized once from the node count and every entry starts at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Vec<[f64; Move::COUNT]>,
    /// Learning rate α.
    learning_rate: f64,
    /// Discount factor γ.
    discount_rate: f64,
}

impl QTable {
    /// Creates a zeroed table for `node_count` states.
    pub fn new(node_count: usize, learning_rate: f64, discount_rate: f64) -> Self {
        Self {
            values: vec![[0.0; Move::COUNT]; node_count],
            learning_rate,
            discount_rate,
        }
    }

    /// Number of states (rows).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Q-value for a state-action pair; unknown states read as 0.
    pub fn get(&self, state: Node, action: Move) -> f64 {
        self.values
            .get(state)
            .map_or(0.0, |row| row[action.index()])
    }

    /// Sets the Q-value for a state-action pair; unknown states are ignored.
    pub fn set(&mut self, state: Node, action: Move, value: f64) {
        if let Some(row) = self.values.get_mut(state) {
            row[action.index()] = value;
        }
    }

    /// Maximum Q-value over `legal_actions`, or 0 when there are none.
    pub fn max_value(&self, state: Node, legal_actions: &[Move]) -> f64 {
        legal_actions
            .iter()
            .map(|&action| self.get(state, action))
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Highest-valued action among `legal_actions`.
    ///
    /// Ties keep the first action enumerated, so an untouched state returns
    /// `legal_actions[0]`.
    pub fn greedy_action(&self, state: Node, legal_actions: &[Move]) -> Option<Move> {
        let mut best: Option<(Move, f64)> = None;
        for &action in legal_actions {
            let value = self.get(state, action);
            if best.is_none_or(|(_, max)| value > max) {
                best = Some((action, value));
            }
        }
        best.map(|(action, _)| action)
    }

    /// One-step Q-learning update.
    ///
    /// Q(s,a) ← (1 − α)·Q(s,a) + α·(r + γ·max_next)
    ///
    /// Returns the new value.
    pub fn update(&mut self, state: Node, action: Move, reward: f64, max_next: f64) -> f64 {
        let current = self.get(state, action);
        let target = reward + self.discount_rate * max_next;
        let updated = (1.0 - self.learning_rate) * current + self.learning_rate * target;
        self.set(state, action, updated);
        updated
    }

    /// Writes the table as text: one line per node, values separated by spaces.
    pub fn write_text<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for row in &self.values {
            let line: Vec<String> = row.iter().map(|value| value.to_string()).collect();
            writeln!(writer, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn fresh_table_is_zero() {
        let table = QTable::new(4, 0.1, 0.9);
        assert_eq!(table.len(), 4);
        for state in 0..4 {
            for action in Move::ALL {
                assert_eq!(table.get(state, action), 0.0);
            }
        }
    }

    #[test]
    fn single_update_from_zero() {
        let mut table = QTable::new(3, 0.1, 0.9);
        let value = table.update(0, Move::Left, 10.0, 0.0);
        assert_eq!(value, 1.0);
        assert_eq!(table.get(0, Move::Left), 1.0);
    }

    #[test]
    fn max_value_of_dead_end_is_zero() {
        let mut table = QTable::new(2, 0.1, 0.9);
        table.set(1, Move::Up, -4.0);
        assert_eq!(table.max_value(1, &[]), 0.0);
        assert_eq!(table.max_value(1, &[Move::Up]), -4.0);
    }

    #[test]
    fn greedy_action_prefers_value_then_order() {
        let mut table = QTable::new(1, 0.1, 0.9);
        let legal = [Move::Up, Move::Right, Move::Left];
        assert_eq!(table.greedy_action(0, &legal), Some(Move::Up));

        table.set(0, Move::Right, 0.5);
        table.set(0, Move::Left, 0.5);
        assert_eq!(table.greedy_action(0, &legal), Some(Move::Right));
        assert_eq!(table.greedy_action(0, &[]), None);
    }

    #[test]
    fn out_of_range_states_are_ignored() {
        let mut table = QTable::new(1, 0.1, 0.9);
        table.set(5, Move::Up, 3.0);
        assert_eq!(table.get(5, Move::Up), 0.0);
    }

    #[test]
    fn text_export_has_one_row_per_node() {
        let mut table = QTable::new(2, 0.1, 0.9);
        table.set(1, Move::Down, 2.5);
        let mut out = Vec::new();
        table.write_text(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "0 0 0 0 0\n0 0 2.5 0 0\n");
    }

    proptest! {
        #[test]
        fn update_contracts_toward_target(
            alpha in 0.01f64..0.99,
            gamma in 0.0f64..1.0,
            reward in -100.0f64..100.0,
            max_next in -100.0f64..100.0,
            start in -100.0f64..100.0,
        ) {
            let mut table = QTable::new(1, alpha, gamma);
            table.set(0, Move::Up, start);
            let target = reward + gamma * max_next;

            let mut previous_gap = (target - start).abs();
            for _ in 0..20 {
                let value = table.update(0, Move::Up, reward, max_next);
                let gap = (target - value).abs();
                prop_assert!(gap <= previous_gap + 1e-9);
                // Never crosses over to the other side of the target.
                prop_assert!((target - value) * (target - start) >= -1e-9);
                previous_gap = gap;
            }
        }
    }
}
