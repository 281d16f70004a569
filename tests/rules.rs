use pretty_assertions::assert_eq;

use pawngrid::board::moves::MoveKind;
use pawngrid::{Alliance, Board, Move, MoveStatus, PieceKind, Square};

fn sq(name: &str) -> Square {
    Square::from_algebraic(name).expect("valid square")
}

fn find(board: &Board, from: &str, to: &str) -> Move {
    let (from, to) = (sq(from), sq(to));
    board
        .current_player()
        .legal_moves()
        .iter()
        .find(|m| m.from() == from && m.to() == to)
        .unwrap_or_else(|| panic!("{from}{to} should be legal"))
        .clone()
}

fn play(board: &Board, from: &str, to: &str) -> Board {
    let mv = find(board, from, to);
    let transition = board.current_player().make_move(&mv);
    assert_eq!(transition.status(), MoveStatus::Done);
    transition.into_board()
}

#[test]
fn fools_mate_is_checkmate() {
    let mut board = Board::standard();
    for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
        board = play(&board, from, to);
    }
    let white = board.current_player();
    assert_eq!(white.alliance(), Alliance::White);
    assert!(white.is_in_check());
    assert!(white.legal_moves().is_empty());
    assert!(white.is_in_checkmate());
    assert!(!white.is_in_stalemate());
    // The winner is in neither terminal state.
    assert!(!board.player(Alliance::Black).is_in_checkmate());
    assert!(!board.player(Alliance::Black).is_in_stalemate());
}

#[test]
fn cornered_king_with_no_moves_is_stalemate() {
    let board = Board::from_fen("7k/5K2/6Q1/8/8/8/8/8 b - - 0 1").expect("valid fen");
    let black = board.current_player();
    assert!(!black.is_in_check());
    assert!(black.legal_moves().is_empty());
    assert!(black.is_in_stalemate());
    assert!(!black.is_in_checkmate());
}

#[test]
fn back_rank_mate_is_detected() {
    let board = Board::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").expect("valid fen");
    let black = board.current_player();
    assert!(black.is_in_checkmate());
}

#[test]
fn moves_outside_the_legal_set_are_rejected_as_data() {
    let board = Board::standard();
    // A knight hop to the middle of the board: geometrically well-formed,
    // but not a legal move of this position.
    let knight = *board.piece_at(sq("b1")).unwrap();
    let bogus = Move::Major {
        piece: knight,
        to: sq("e5"),
    };
    let transition = board.current_player().make_move(&bogus);
    assert_eq!(transition.status(), MoveStatus::IllegalMove);
    assert_eq!(transition.board(), &board);
    assert!(!transition.status().is_done());
}

#[test]
fn self_check_moves_never_appear_in_the_legal_set() {
    // For every reachable-from-start move, the successor board never
    // leaves the mover's own king attacked.
    let mut board = Board::standard();
    for (from, to) in [("e2", "e4"), ("e7", "e5"), ("g1", "f3")] {
        let player = board.current_player();
        let us = player.alliance();
        for mv in player.legal_moves() {
            let transition = player.make_move(mv);
            assert_eq!(transition.status(), MoveStatus::Done, "{mv}");
            let next = transition.board();
            assert!(
                !next.is_square_attacked(next.king_square(us), us.opponent()),
                "{mv} exposes the {us} king"
            );
        }
        board = play(&board, from, to);
    }
}

#[test]
fn null_move_is_never_accepted() {
    let board = Board::standard();
    let transition = board.current_player().make_move(&Move::Null);
    assert_eq!(transition.status(), MoveStatus::IllegalMove);
}

#[test]
fn undo_reconstructs_the_pre_move_board() {
    let board = Board::standard();
    for mv in board.current_player().legal_moves() {
        let transition = board.current_player().make_move(mv);
        assert_eq!(transition.status(), MoveStatus::Done);
        assert_eq!(mv.undo(transition.board()), board, "round trip of {mv}");
    }
}

#[test]
fn undo_restores_captured_material() {
    // Scandinavian: 1.e4 d5 2.exd5.
    let mut board = Board::standard();
    for (from, to) in [("e2", "e4"), ("d7", "d5")] {
        board = play(&board, from, to);
    }
    let capture = find(&board, "e4", "d5");
    assert!(capture.is_attack());
    let after = board.current_player().make_move(&capture).into_board();
    assert_eq!(after.pieces(Alliance::Black).count(), 15);

    let undone = capture.undo(&after);
    assert_eq!(undone.pieces(Alliance::Black).count(), 16);
    assert_eq!(undone.to_move(), Alliance::White);
    // The pre-move board carried an en-passant marker (d5 was a jump),
    // which a move cannot restore; piece placement and side to move are
    // what round-trips.
    assert_eq!(undone.to_string(), board.to_string());
    assert_eq!(undone.to_move(), board.to_move());
}

#[test]
fn castle_undo_returns_king_and_rook() {
    let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("valid fen");
    let castle = find(&board, "e1", "g1");
    let after = board.current_player().make_move(&castle).into_board();
    let undone = castle.undo(&after);
    assert_eq!(undone, board);
    assert!(undone.piece_at(sq("e1")).unwrap().first_move);
    assert!(undone.piece_at(sq("h1")).unwrap().first_move);
}

#[test]
fn move_records_carry_the_external_shape() {
    let board = Board::standard();
    let jump = find(&board, "e2", "e4");
    let record = jump.record();
    assert_eq!(record.piece, PieceKind::Pawn);
    assert_eq!(record.alliance, Alliance::White);
    assert_eq!(record.from, sq("e2"));
    assert_eq!(record.to, sq("e4"));
    assert_eq!(record.move_kind, MoveKind::Normal);
    assert_eq!(record.captured, None);
    assert_eq!(record.promotion, None);

    let json = serde_json::to_string(&record).expect("serializable");
    let back: pawngrid::MoveRecord = serde_json::from_str(&json).expect("deserializable");
    assert_eq!(back, record);
}

#[test]
fn promotion_records_tag_kind_and_target() {
    let board = Board::from_fen("6k1/8/8/8/8/8/6p1/K4N2 b - - 0 1").expect("valid fen");
    // gxf1=N: a capturing under-promotion.
    let mv = board
        .current_player()
        .legal_moves()
        .iter()
        .find(|m| {
            matches!(m, Move::PawnPromotion { promote_to, .. } if *promote_to == PieceKind::Knight)
                && m.to() == sq("f1")
        })
        .expect("capturing promotion available")
        .clone();
    let record = mv.record();
    assert_eq!(record.move_kind, MoveKind::Promotion);
    assert_eq!(record.captured, Some(PieceKind::Knight));
    assert_eq!(record.promotion, Some(PieceKind::Knight));
    assert_eq!(record.alliance, Alliance::Black);
}
