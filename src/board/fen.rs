//! FEN import/export. Castling availability maps onto the king/rook
//! first-move flags; the en-passant target square maps onto the board's
//! en-passant pawn marker. Halfmove and fullmove counters are accepted but
//! not tracked (the engine models no move clocks).

use thiserror::Error;

use crate::board::piece::{Alliance, Piece, PieceKind};
use crate::board::square::Square;
use crate::board::{Board, BoardBuilder};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("expected at least 4 FEN fields, got {0}")]
    MissingFields(usize),
    #[error("bad piece placement: {0}")]
    Placement(String),
    #[error("bad side to move: {0}")]
    SideToMove(String),
    #[error("bad castling availability: {0}")]
    Castling(String),
    #[error("bad en passant target: {0}")]
    EnPassant(String),
}

impl Board {
    /// Parse a FEN position. At least the four positional fields are
    /// required; clock fields are ignored when present.
    pub fn from_fen(fen: &str) -> Result<Board, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::MissingFields(fields.len()));
        }

        let mut squares: [Option<(Alliance, PieceKind)>; 64] = [None; 64];
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::Placement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(n) = c.to_digit(10) {
                    file += n as u8;
                } else if let Some((alliance, kind)) = PieceKind::from_char(c) {
                    if file > 7 {
                        return Err(FenError::Placement(format!("rank {} overflows", rank + 1)));
                    }
                    squares[Square::from_file_rank(file, rank).index()] = Some((alliance, kind));
                    file += 1;
                } else {
                    return Err(FenError::Placement(format!("unexpected character {c:?}")));
                }
            }
            if file != 8 {
                return Err(FenError::Placement(format!(
                    "rank {} has {} files",
                    rank + 1,
                    file
                )));
            }
        }
        for alliance in [Alliance::White, Alliance::Black] {
            let kings = squares
                .iter()
                .flatten()
                .filter(|(a, k)| *a == alliance && *k == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(FenError::Placement(format!(
                    "{alliance} has {kings} kings"
                )));
            }
        }

        let to_move = match fields[1] {
            "w" => Alliance::White,
            "b" => Alliance::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        let castling = fields[2];
        if castling != "-" && !castling.chars().all(|c| "KQkq".contains(c)) {
            return Err(FenError::Castling(castling.to_string()));
        }
        let right = |c: char| castling.contains(c);

        let mut builder = BoardBuilder::new();
        for (idx, slot) in squares.iter().enumerate() {
            let Some((alliance, kind)) = *slot else {
                continue;
            };
            let sq = Square(idx as u8);
            let first_move = match kind {
                PieceKind::Pawn => sq.rank() == alliance.pawn_start_rank(),
                PieceKind::Rook => match alliance {
                    Alliance::White => {
                        (sq == Square::from_file_rank(7, 0) && right('K'))
                            || (sq == Square::from_file_rank(0, 0) && right('Q'))
                    }
                    Alliance::Black => {
                        (sq == Square::from_file_rank(7, 7) && right('k'))
                            || (sq == Square::from_file_rank(0, 7) && right('q'))
                    }
                },
                PieceKind::King => match alliance {
                    Alliance::White => right('K') || right('Q'),
                    Alliance::Black => right('k') || right('q'),
                },
                _ => false,
            };
            builder.set_piece(Piece::new(kind, alliance, sq).with_first_move(first_move));
        }
        builder.set_move_maker(to_move);

        if fields[3] != "-" {
            let target = Square::from_algebraic(fields[3])
                .ok_or_else(|| FenError::EnPassant(fields[3].to_string()))?;
            let pawn_sq = match target.rank() {
                2 => target.offset(8),
                5 => target.offset(-8),
                _ => None,
            }
            .ok_or_else(|| FenError::EnPassant(fields[3].to_string()))?;
            match squares[pawn_sq.index()] {
                Some((alliance, PieceKind::Pawn)) if alliance != to_move => {
                    builder.set_en_passant_pawn(
                        Piece::new(PieceKind::Pawn, alliance, pawn_sq).with_first_move(false),
                    );
                }
                _ => return Err(FenError::EnPassant(fields[3].to_string())),
            }
        }
        Ok(builder.build())
    }

    /// Render this position as FEN. The untracked clock fields are emitted
    /// as `0 1`.
    pub fn to_fen(&self) -> String {
        let mut out = String::new();
        for rank in (0..8).rev() {
            let mut empties = 0;
            for file in 0..8 {
                match self.piece_at(Square::from_file_rank(file, rank)) {
                    Some(p) => {
                        if empties > 0 {
                            out.push_str(&empties.to_string());
                            empties = 0;
                        }
                        out.push(p.kind.to_char(p.alliance));
                    }
                    None => empties += 1,
                }
            }
            if empties > 0 {
                out.push_str(&empties.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(if self.to_move().is_white() { 'w' } else { 'b' });

        out.push(' ');
        let mut rights = String::new();
        let unmoved = |sq: Square, kind: PieceKind, alliance: Alliance| {
            matches!(self.piece_at(sq),
                Some(p) if p.kind == kind && p.alliance == alliance && p.first_move)
        };
        for (alliance, king_ch, queen_ch) in [
            (Alliance::White, 'K', 'Q'),
            (Alliance::Black, 'k', 'q'),
        ] {
            let rank = alliance.back_rank();
            if unmoved(Square::from_file_rank(4, rank), PieceKind::King, alliance) {
                if unmoved(Square::from_file_rank(7, rank), PieceKind::Rook, alliance) {
                    rights.push(king_ch);
                }
                if unmoved(Square::from_file_rank(0, rank), PieceKind::Rook, alliance) {
                    rights.push(queen_ch);
                }
            }
        }
        if rights.is_empty() {
            rights.push('-');
        }
        out.push_str(&rights);

        out.push(' ');
        match self.en_passant_pawn() {
            Some(pawn) => {
                let target = if pawn.alliance.is_white() {
                    Square(pawn.square.0 - 8)
                } else {
                    Square(pawn.square.0 + 8)
                };
                out.push_str(&target.to_algebraic());
            }
            None => out.push('-'),
        }

        out.push_str(" 0 1");
        out
    }
}

/// The FEN of the standard initial position.
pub const STANDARD_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_round_trip() {
        let board = Board::from_fen(STANDARD_FEN).expect("valid fen");
        assert_eq!(board, Board::standard());
        assert_eq!(board.to_fen(), STANDARD_FEN);
    }

    #[test]
    fn en_passant_field_marks_the_jumped_pawn() {
        let board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2")
                .expect("valid fen");
        let pawn = board.en_passant_pawn().expect("marker set");
        assert_eq!(pawn.alliance, Alliance::Black);
        assert_eq!(pawn.square, Square::from_algebraic("d5").unwrap());
        assert_eq!(
            board.to_fen(),
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1"
        );
    }

    #[test]
    fn castling_rights_map_to_first_move_flags() {
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1").expect("valid fen");
        let h1 = board
            .piece_at(Square::from_algebraic("h1").unwrap())
            .unwrap();
        let a1 = board
            .piece_at(Square::from_algebraic("a1").unwrap())
            .unwrap();
        assert!(h1.first_move);
        assert!(!a1.first_move);
        assert_eq!(board.to_fen(), "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1");
    }

    #[test]
    fn rejects_malformed_fens() {
        assert!(matches!(
            Board::from_fen("8/8/8/8 w - -"),
            Err(FenError::Placement(_))
        ));
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq -"),
            Err(FenError::SideToMove(_))
        ));
        assert!(matches!(
            Board::from_fen("8/8/8/8/8/8/8/8 w - -"),
            Err(FenError::Placement(_))
        ));
        assert!(matches!(Board::from_fen("only"), Err(FenError::MissingFields(1))));
    }
}
