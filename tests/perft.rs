//! Known-value move generation counts. The deeper runs are `#[ignore]`d;
//! run them with `cargo test --release -- --ignored`.

use pawngrid::perft::{divide, perft};
use pawngrid::Board;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const ENDGAME: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

#[test]
fn startpos_shallow() {
    let board = Board::standard();
    assert_eq!(perft(&board, 1), 20);
    assert_eq!(perft(&board, 2), 400);
    assert_eq!(perft(&board, 3), 8_902);
}

#[test]
#[ignore]
fn startpos_deep() {
    let board = Board::standard();
    assert_eq!(perft(&board, 4), 197_281);
}

#[test]
fn kiwipete_shallow() {
    // Exercises castling, en passant, promotions, and pins all at once.
    let board = Board::from_fen(KIWIPETE).expect("valid fen");
    assert_eq!(perft(&board, 1), 48);
    assert_eq!(perft(&board, 2), 2_039);
}

#[test]
#[ignore]
fn kiwipete_deep() {
    let board = Board::from_fen(KIWIPETE).expect("valid fen");
    assert_eq!(perft(&board, 3), 97_862);
}

#[test]
fn rook_endgame_with_en_passant_pins() {
    // The classic position where a pinned en-passant capture must be
    // rejected.
    let board = Board::from_fen(ENDGAME).expect("valid fen");
    assert_eq!(perft(&board, 1), 14);
    assert_eq!(perft(&board, 2), 191);
    assert_eq!(perft(&board, 3), 2_812);
}

#[test]
fn divide_matches_the_total() {
    let board = Board::standard();
    let split = divide(&board, 3);
    assert_eq!(split.len(), 20);
    assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), perft(&board, 3));
}
