//! Move-generation node counts over the legality layer.

use crate::board::moves::Move;
use crate::board::Board;

/// Count leaf nodes of the legal game tree to `depth`.
pub fn perft(board: &Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let player = board.current_player();
    let mut nodes = 0u64;
    for mv in player.legal_moves() {
        let transition = player.make_move(mv);
        if transition.status().is_done() {
            nodes += perft(transition.board(), depth - 1);
        }
    }
    nodes
}

/// Per-root-move node counts, in move-generation order. The sum of the
/// counts equals `perft(board, depth)`.
pub fn divide(board: &Board, depth: u32) -> Vec<(Move, u64)> {
    assert!(depth > 0, "divide needs at least one ply");
    let player = board.current_player();
    let mut out = Vec::new();
    for mv in player.legal_moves() {
        let transition = player.make_move(mv);
        if transition.status().is_done() {
            out.push((mv.clone(), perft(transition.board(), depth - 1)));
        }
    }
    out
}
