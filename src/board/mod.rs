pub mod fen;
pub mod moves;
pub mod piece;
pub mod square;

use std::fmt;
use std::sync::OnceLock;

use crate::board::moves::Move;
use crate::board::piece::{
    knight_wraps, slide_wraps, Alliance, Piece, PieceKind, BISHOP_DIRECTIONS, KING_OFFSETS,
    KNIGHT_OFFSETS, ROOK_DIRECTIONS,
};
use crate::board::square::{Square, FILE_A, FILE_H};
use crate::player::Player;

/// Memoized per-alliance legality data, computed at most once per board
/// instance.
#[derive(Debug)]
pub(crate) struct SideState {
    pub(crate) legal_moves: Vec<Move>,
    pub(crate) in_check: bool,
}

/// An immutable snapshot of a position: 64 squares each holding at most one
/// piece, the side to move, and the pawn (if any) that is capturable en
/// passant. Boards come into existence only through [`BoardBuilder`] and are
/// never mutated afterwards; applying a move produces a new board.
#[derive(Debug)]
pub struct Board {
    squares: [Option<Piece>; 64],
    to_move: Alliance,
    en_passant_pawn: Option<Piece>,
    cache: [OnceLock<SideState>; 2],
}

impl Board {
    /// The canonical initial position, White to move.
    pub fn standard() -> Board {
        use PieceKind::*;
        let mut builder = BoardBuilder::new();
        let back = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        for (file, &kind) in back.iter().enumerate() {
            let file = file as u8;
            builder.set_piece(Piece::new(
                kind,
                Alliance::White,
                Square::from_file_rank(file, 0),
            ));
            builder.set_piece(Piece::new(
                kind,
                Alliance::Black,
                Square::from_file_rank(file, 7),
            ));
            builder.set_piece(Piece::new(
                Pawn,
                Alliance::White,
                Square::from_file_rank(file, 1),
            ));
            builder.set_piece(Piece::new(
                Pawn,
                Alliance::Black,
                Square::from_file_rank(file, 6),
            ));
        }
        builder.set_move_maker(Alliance::White);
        builder.build()
    }

    /// The piece on `sq`, if any. This is the tile query: a square is
    /// either empty (`None`) or occupied.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.squares[sq.index()].as_ref()
    }

    #[inline]
    pub fn to_move(&self) -> Alliance {
        self.to_move
    }

    /// The pawn that just double-stepped, if the last move armed one.
    #[inline]
    pub fn en_passant_pawn(&self) -> Option<&Piece> {
        self.en_passant_pawn.as_ref()
    }

    /// The player whose turn it is on this board.
    pub fn current_player(&self) -> Player<'_> {
        Player::new(self, self.to_move)
    }

    /// The player view for a given alliance on this board.
    pub fn player(&self, alliance: Alliance) -> Player<'_> {
        Player::new(self, alliance)
    }

    /// All pieces on the board, in square order.
    pub fn all_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.squares.iter().flatten()
    }

    /// One side's pieces, in square order.
    pub fn pieces(&self, alliance: Alliance) -> impl Iterator<Item = &Piece> {
        self.all_pieces().filter(move |p| p.alliance == alliance)
    }

    /// Square of the given side's king. Every reachable board holds exactly
    /// one king per side; a missing king is a broken invariant.
    pub fn king_square(&self, alliance: Alliance) -> Square {
        self.pieces(alliance)
            .find(|p| p.kind == PieceKind::King)
            .map(|p| p.square)
            .unwrap_or_else(|| panic!("board invariant violated: no {alliance} king"))
    }

    /// Union of the pseudo-legal moves of one side's pieces, in square
    /// order. Castles are contributed by the player layer, not here.
    pub(crate) fn pseudo_legal_moves(&self, alliance: Alliance) -> Vec<Move> {
        let mut moves = Vec::new();
        for piece in self.pieces(alliance) {
            moves.extend(piece.pseudo_legal_moves(self));
        }
        moves
    }

    /// Would a piece of `by` capture on `sq` if it were that side's turn?
    /// Computed from reverse attack geometry; equivalent to asking whether
    /// any pseudo-legal move of `by` lands on `sq`.
    pub fn is_square_attacked(&self, sq: Square, by: Alliance) -> bool {
        // Knights.
        for &delta in &KNIGHT_OFFSETS {
            if knight_wraps(sq, delta) {
                continue;
            }
            if let Some(from) = sq.offset(delta) {
                if let Some(p) = self.piece_at(from) {
                    if p.alliance == by && p.kind == PieceKind::Knight {
                        return true;
                    }
                }
            }
        }
        // Enemy king adjacency.
        for &delta in &KING_OFFSETS {
            if slide_wraps(sq, delta) {
                continue;
            }
            if let Some(from) = sq.offset(delta) {
                if let Some(p) = self.piece_at(from) {
                    if p.alliance == by && p.kind == PieceKind::King {
                        return true;
                    }
                }
            }
        }
        // Sliders along ranks/files and diagonals.
        if self.slider_hits(sq, by, &ROOK_DIRECTIONS, PieceKind::Rook)
            || self.slider_hits(sq, by, &BISHOP_DIRECTIONS, PieceKind::Bishop)
        {
            return true;
        }
        // Pawns: a `by` pawn attacks `sq` from one rank behind, one file to
        // either side.
        let dir = by.pawn_direction();
        if !FILE_H[sq.index()] {
            if let Some(from) = sq.offset(1 - dir) {
                if let Some(p) = self.piece_at(from) {
                    if p.alliance == by && p.kind == PieceKind::Pawn {
                        return true;
                    }
                }
            }
        }
        if !FILE_A[sq.index()] {
            if let Some(from) = sq.offset(-1 - dir) {
                if let Some(p) = self.piece_at(from) {
                    if p.alliance == by && p.kind == PieceKind::Pawn {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn slider_hits(&self, sq: Square, by: Alliance, directions: &[i8], kind: PieceKind) -> bool {
        for &delta in directions {
            let mut cur = sq;
            loop {
                if slide_wraps(cur, delta) {
                    break;
                }
                let Some(next) = cur.offset(delta) else {
                    break;
                };
                if let Some(p) = self.piece_at(next) {
                    if p.alliance == by && (p.kind == kind || p.kind == PieceKind::Queen) {
                        return true;
                    }
                    break;
                }
                cur = next;
            }
        }
        false
    }

    pub(crate) fn side_state(&self, alliance: Alliance) -> &SideState {
        self.cache[alliance.index()]
            .get_or_init(|| crate::player::compute_side_state(self, alliance))
    }
}

impl Clone for Board {
    fn clone(&self) -> Self {
        // The legality cache is per-instance; a clone starts cold.
        Board {
            squares: self.squares,
            to_move: self.to_move,
            en_passant_pawn: self.en_passant_pawn,
            cache: Default::default(),
        }
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.squares == other.squares
            && self.to_move == other.to_move
            && self.en_passant_pawn == other.en_passant_pawn
    }
}

impl Eq for Board {}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                match self.piece_at(Square::from_file_rank(file, rank)) {
                    Some(p) => write!(f, " {p}")?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

/// Mutable staging structure for a board. `build` finalizes it into an
/// immutable [`Board`]; a partially populated builder is never visible
/// outside construction.
#[derive(Clone, Debug)]
pub struct BoardBuilder {
    squares: [Option<Piece>; 64],
    to_move: Option<Alliance>,
    en_passant_pawn: Option<Piece>,
}

impl Default for BoardBuilder {
    fn default() -> Self {
        BoardBuilder {
            squares: [None; 64],
            to_move: None,
            en_passant_pawn: None,
        }
    }
}

impl BoardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a piece on its own square, replacing any occupant.
    pub fn set_piece(&mut self, piece: Piece) -> &mut Self {
        self.squares[piece.square.index()] = Some(piece);
        self
    }

    pub fn set_move_maker(&mut self, alliance: Alliance) -> &mut Self {
        self.to_move = Some(alliance);
        self
    }

    pub fn set_en_passant_pawn(&mut self, pawn: Piece) -> &mut Self {
        self.en_passant_pawn = Some(pawn);
        self
    }

    /// Finalize. Panics if the side to move was never set or either side
    /// does not have exactly one king; a malformed board must never escape
    /// construction.
    pub fn build(self) -> Board {
        let to_move = self.to_move.expect("board builder: side to move not set");
        for alliance in [Alliance::White, Alliance::Black] {
            let kings = self
                .squares
                .iter()
                .flatten()
                .filter(|p| p.alliance == alliance && p.kind == PieceKind::King)
                .count();
            assert!(
                kings == 1,
                "board invariant violated: {alliance} has {kings} kings"
            );
        }
        Board {
            squares: self.squares,
            to_move,
            en_passant_pawn: self.en_passant_pawn,
            cache: Default::default(),
        }
    }
}
