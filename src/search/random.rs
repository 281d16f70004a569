use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::moves::Move;
use crate::board::Board;
use crate::search::MoveStrategy;

/// Plays a uniformly random legal move. A baseline opponent for self-play
/// batches and tests.
pub struct RandomStrategy {
    rng: SmallRng,
}

impl RandomStrategy {
    pub fn new() -> Self {
        RandomStrategy {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Fixed seed for reproducible games.
    pub fn seeded(seed: u64) -> Self {
        RandomStrategy {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveStrategy for RandomStrategy {
    fn name(&self) -> &str {
        "Random"
    }

    fn execute(&mut self, board: &Board) -> Move {
        let moves = board.current_player().legal_moves();
        if moves.is_empty() {
            return Move::Null;
        }
        moves[self.rng.gen_range(0..moves.len())].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_streams_are_reproducible() {
        let board = Board::standard();
        let a = RandomStrategy::seeded(7).execute(&board);
        let b = RandomStrategy::seeded(7).execute(&board);
        assert_eq!(a, b);
        assert!(!a.is_null());
    }
}
