//! Depth-bounded minimax without pruning. White maximizes, Black
//! minimizes; a fixed depth bounds the recursion, so a search always
//! terminates.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use crate::board::moves::Move;
use crate::board::Board;
use crate::search::eval::{Evaluator, StandardEvaluator};
use crate::search::{MoveStrategy, SearchEvent};

/// The minimax engine. A pure function of the board it is handed (plus the
/// fixed depth and evaluator); the only mutable state is the per-invocation
/// boards-evaluated counter.
pub struct MiniMax<E = StandardEvaluator> {
    evaluator: E,
    depth: u32,
    threads: usize,
    boards_evaluated: u64,
}

impl MiniMax<StandardEvaluator> {
    pub fn new(depth: u32) -> Self {
        Self::with_evaluator(depth, StandardEvaluator)
    }
}

impl<E: Evaluator> MiniMax<E> {
    /// The evaluator is passed in explicitly; there is no process-wide
    /// instance.
    pub fn with_evaluator(depth: u32, evaluator: E) -> Self {
        assert!(depth > 0, "search depth must be at least 1");
        MiniMax {
            evaluator,
            depth,
            threads: 1,
            boards_evaluated: 0,
        }
    }

    /// Score root moves on rayon's thread pool when `threads > 1`. Child
    /// subtrees are independent, and selection stays sequential and
    /// left-to-right over root order, so the chosen move is identical to a
    /// single-threaded run.
    pub fn set_threads(&mut self, threads: usize) {
        self.threads = threads.max(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Boards evaluated by the most recent `execute` call.
    #[inline]
    pub fn boards_evaluated(&self) -> u64 {
        self.boards_evaluated
    }
}

impl<E: Evaluator + Sync> MiniMax<E> {
    /// Run the search, reporting progress through `observer`: one
    /// [`SearchEvent::RootMove`] per candidate and a final
    /// [`SearchEvent::Finished`]. The observer is purely a side channel;
    /// it never influences the chosen move.
    pub fn execute_with_observer(
        &mut self,
        board: &Board,
        observer: &mut dyn FnMut(&SearchEvent),
    ) -> Move {
        let start = Instant::now();
        self.boards_evaluated = 0;

        let player = board.current_player();
        let moves: Vec<Move> = player.legal_moves().to_vec();
        let total = moves.len();
        let maximizing = player.alliance().is_white();
        log::debug!(
            "{} thinking with depth = {} over {} moves",
            player.alliance(),
            self.depth,
            total
        );

        let precomputed: Option<Vec<Option<i32>>> = if self.threads > 1 {
            let evaluated = AtomicU64::new(0);
            let scores = moves
                .par_iter()
                .map(|mv| {
                    let transition = player.make_move(mv);
                    if !transition.status().is_done() {
                        return None;
                    }
                    let mut branch = Branch::new(&self.evaluator);
                    let score = if maximizing {
                        branch.min(transition.board(), self.depth - 1)
                    } else {
                        branch.max(transition.board(), self.depth - 1)
                    };
                    evaluated.fetch_add(branch.evaluated, Ordering::Relaxed);
                    Some(score)
                })
                .collect();
            self.boards_evaluated += evaluated.load(Ordering::Relaxed);
            Some(scores)
        } else {
            None
        };

        // Running extremum over root moves: a strict comparison keeps the
        // first move achieving the extremum, so ties break stably
        // left-to-right over move-generation order.
        let mut best = Move::Null;
        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
        let mut branch = Branch::new(&self.evaluator);
        for (i, mv) in moves.iter().enumerate() {
            let score = match &precomputed {
                Some(scores) => scores[i],
                None => {
                    let transition = player.make_move(mv);
                    // A member of the legal set cannot be rejected; skip
                    // defensively if it ever is.
                    if transition.status().is_done() {
                        Some(if maximizing {
                            branch.min(transition.board(), self.depth - 1)
                        } else {
                            branch.max(transition.board(), self.depth - 1)
                        })
                    } else {
                        None
                    }
                }
            };
            if let Some(value) = score {
                let improved = if maximizing {
                    value > best_score
                } else {
                    value < best_score
                };
                if improved {
                    best_score = value;
                    best = mv.clone();
                }
            }
            observer(&SearchEvent::RootMove {
                index: i + 1,
                total,
                mv: mv.clone(),
                best: best.clone(),
                score,
            });
        }
        self.boards_evaluated += branch.evaluated;

        observer(&SearchEvent::Finished {
            best: best.clone(),
            score: best_score,
            boards_evaluated: self.boards_evaluated,
            elapsed: start.elapsed(),
        });
        best
    }
}

impl<E: Evaluator + Sync> MoveStrategy for MiniMax<E> {
    fn name(&self) -> &str {
        "MiniMax"
    }

    fn execute(&mut self, board: &Board) -> Move {
        self.execute_with_observer(board, &mut |_| {})
    }
}

/// One subtree's recursion state. Root-parallel runs give each root move
/// its own branch and sum the counters afterwards.
struct Branch<'a, E: Evaluator> {
    evaluator: &'a E,
    evaluated: u64,
}

impl<'a, E: Evaluator> Branch<'a, E> {
    fn new(evaluator: &'a E) -> Self {
        Branch {
            evaluator,
            evaluated: 0,
        }
    }

    fn min(&mut self, board: &Board, depth: u32) -> i32 {
        if depth == 0 || is_end_game(board) {
            self.evaluated += 1;
            return self.evaluator.evaluate(board, depth);
        }
        let mut lowest = i32::MAX;
        let player = board.current_player();
        for mv in player.legal_moves() {
            let transition = player.make_move(mv);
            if transition.status().is_done() {
                let value = self.max(transition.board(), depth - 1);
                if value < lowest {
                    lowest = value;
                }
            }
        }
        lowest
    }

    fn max(&mut self, board: &Board, depth: u32) -> i32 {
        if depth == 0 || is_end_game(board) {
            self.evaluated += 1;
            return self.evaluator.evaluate(board, depth);
        }
        let mut highest = i32::MIN;
        let player = board.current_player();
        for mv in player.legal_moves() {
            let transition = player.make_move(mv);
            if transition.status().is_done() {
                let value = self.min(transition.board(), depth - 1);
                if value > highest {
                    highest = value;
                }
            }
        }
        highest
    }
}

/// Depth-0 leaves and terminal positions are evaluated identically.
fn is_end_game(board: &Board) -> bool {
    let player = board.current_player();
    player.is_in_checkmate() || player.is_in_stalemate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_one_evaluates_one_board_per_legal_move() {
        let board = Board::standard();
        let mut engine = MiniMax::new(1);
        let chosen = engine.execute(&board);
        assert!(!chosen.is_null());
        assert_eq!(engine.boards_evaluated(), 20);
    }

    #[test]
    fn repeated_searches_choose_the_same_move() {
        let board = Board::standard();
        let mut engine = MiniMax::new(2);
        let first = engine.execute(&board);
        let second = engine.execute(&board);
        assert_eq!(first, second);
    }

    #[test]
    fn root_events_cover_every_candidate() {
        let board = Board::standard();
        let mut engine = MiniMax::new(1);
        let mut root_events = 0usize;
        let mut finished = 0usize;
        engine.execute_with_observer(&board, &mut |event| match event {
            SearchEvent::RootMove { total, .. } => {
                assert_eq!(*total, 20);
                root_events += 1;
            }
            SearchEvent::Finished {
                boards_evaluated, ..
            } => {
                assert_eq!(*boards_evaluated, 20);
                finished += 1;
            }
        });
        assert_eq!(root_events, 20);
        assert_eq!(finished, 1);
    }
}
