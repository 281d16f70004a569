use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::piece::{Alliance, Piece, PieceKind};
use crate::board::square::Square;
use crate::board::{Board, BoardBuilder};

/// King-side or queen-side castle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

/// A move is a pure description of a board transformation. Applying one
/// never mutates the source board; `execute` builds the successor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Move {
    /// A non-capturing move of any piece but a pawn.
    Major { piece: Piece, to: Square },
    /// A capture by any piece but a pawn.
    Attack {
        piece: Piece,
        to: Square,
        captured: Piece,
    },
    /// Single-step pawn advance.
    PawnPush { piece: Piece, to: Square },
    /// Double-step pawn advance from the start rank; arms the en-passant
    /// marker on the successor board.
    PawnJump { piece: Piece, to: Square },
    /// Diagonal pawn capture.
    PawnAttack {
        piece: Piece,
        to: Square,
        captured: Piece,
    },
    /// Pawn capture of a just-double-stepped enemy pawn; the destination
    /// square is empty, the captured pawn stands a rank behind it.
    EnPassantAttack {
        piece: Piece,
        to: Square,
        captured: Piece,
    },
    /// Wraps a pawn push or capture landing on the farthest rank.
    PawnPromotion {
        inner: Box<Move>,
        promote_to: PieceKind,
    },
    /// King and rook move together; legality is established by the player
    /// layer, not by piece geometry.
    Castle {
        side: CastleSide,
        king: Piece,
        king_to: Square,
        rook: Piece,
        rook_to: Square,
    },
    /// The "no move" sentinel. Never applicable to a board.
    Null,
}

impl Move {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Move::Null)
    }

    /// The piece being moved (the king, for a castle).
    ///
    /// Panics on the null move.
    pub fn piece(&self) -> Piece {
        match self {
            Move::Major { piece, .. }
            | Move::Attack { piece, .. }
            | Move::PawnPush { piece, .. }
            | Move::PawnJump { piece, .. }
            | Move::PawnAttack { piece, .. }
            | Move::EnPassantAttack { piece, .. } => *piece,
            Move::PawnPromotion { inner, .. } => inner.piece(),
            Move::Castle { king, .. } => *king,
            Move::Null => panic!("null move has no piece"),
        }
    }

    /// Source square.
    pub fn from(&self) -> Square {
        self.piece().square
    }

    /// Destination square (the king's destination, for a castle).
    pub fn to(&self) -> Square {
        match self {
            Move::Major { to, .. }
            | Move::Attack { to, .. }
            | Move::PawnPush { to, .. }
            | Move::PawnJump { to, .. }
            | Move::PawnAttack { to, .. }
            | Move::EnPassantAttack { to, .. } => *to,
            Move::PawnPromotion { inner, .. } => inner.to(),
            Move::Castle { king_to, .. } => *king_to,
            Move::Null => panic!("null move has no destination"),
        }
    }

    /// The captured piece, if this move is a capture.
    pub fn captured(&self) -> Option<Piece> {
        match self {
            Move::Attack { captured, .. }
            | Move::PawnAttack { captured, .. }
            | Move::EnPassantAttack { captured, .. } => Some(*captured),
            Move::PawnPromotion { inner, .. } => inner.captured(),
            _ => None,
        }
    }

    #[inline]
    pub fn is_attack(&self) -> bool {
        self.captured().is_some()
    }

    /// Apply this move to `board`, producing the successor board: every
    /// untouched piece is carried over, the moved piece lands with its
    /// first-move flag cleared, the side to move flips, and the en-passant
    /// marker is set only by a pawn jump.
    ///
    /// Panics on the null move; a null move never describes a transition.
    pub fn execute(&self, board: &Board) -> Board {
        assert!(!self.is_null(), "null move cannot be applied to a board");
        let mover = self.piece().alliance;
        let captured_at = self.captured().map(|c| c.square);
        let rook_from = match self {
            Move::Castle { rook, .. } => Some(rook.square),
            _ => None,
        };

        let mut builder = BoardBuilder::new();
        for p in board.all_pieces() {
            if p.square == self.from()
                || Some(p.square) == captured_at
                || Some(p.square) == rook_from
            {
                continue;
            }
            builder.set_piece(*p);
        }
        match self {
            Move::Castle {
                king,
                king_to,
                rook,
                rook_to,
                ..
            } => {
                builder.set_piece(king.moved_to(*king_to));
                builder.set_piece(rook.moved_to(*rook_to));
            }
            Move::PawnPromotion { inner, promote_to } => {
                builder.set_piece(inner.piece().moved_to(inner.to()).promoted_to(*promote_to));
            }
            Move::PawnJump { piece, to } => {
                let jumped = piece.moved_to(*to);
                builder.set_piece(jumped);
                builder.set_en_passant_pawn(jumped);
            }
            _ => {
                builder.set_piece(self.piece().moved_to(self.to()));
            }
        }
        builder.set_move_maker(mover.opponent());
        builder.build()
    }

    /// Reconstruct the pre-move board from the board this move produced:
    /// the moved piece returns to its source with its original first-move
    /// flag, any captured piece is restored, and the mover is to move
    /// again. The pre-move en-passant marker is not recorded in a move, so
    /// the reconstruction leaves it unset; piece placement and side to move
    /// round-trip exactly.
    pub fn undo(&self, after: &Board) -> Board {
        assert!(!self.is_null(), "null move cannot be undone");
        let rook_landing = match self {
            Move::Castle { rook_to, .. } => Some(*rook_to),
            _ => None,
        };

        let mut builder = BoardBuilder::new();
        for p in after.all_pieces() {
            if p.square == self.to() || Some(p.square) == rook_landing {
                continue;
            }
            builder.set_piece(*p);
        }
        builder.set_piece(self.piece());
        if let Some(captured) = self.captured() {
            builder.set_piece(captured);
        }
        if let Move::Castle { rook, .. } = self {
            builder.set_piece(*rook);
        }
        builder.set_move_maker(self.piece().alliance);
        builder.build()
    }

    /// The externally representable shape of this move.
    ///
    /// Panics on the null move.
    pub fn record(&self) -> MoveRecord {
        let piece = self.piece();
        let move_kind = match self {
            Move::Major { .. } | Move::PawnPush { .. } | Move::PawnJump { .. } => MoveKind::Normal,
            Move::Attack { .. } | Move::PawnAttack { .. } => MoveKind::Attack,
            Move::EnPassantAttack { .. } => MoveKind::EnPassant,
            Move::PawnPromotion { .. } => MoveKind::Promotion,
            Move::Castle { .. } => MoveKind::Castle,
            Move::Null => panic!("null move has no record"),
        };
        MoveRecord {
            piece: piece.kind,
            alliance: piece.alliance,
            from: self.from(),
            to: self.to(),
            move_kind,
            captured: self.captured().map(|c| c.kind),
            promotion: match self {
                Move::PawnPromotion { promote_to, .. } => Some(*promote_to),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Major { .. } | Move::PawnPush { .. } | Move::PawnJump { .. } => {
                write!(f, "{}{}", self.from(), self.to())
            }
            Move::Attack { .. } | Move::PawnAttack { .. } => {
                write!(f, "{}x{}", self.from(), self.to())
            }
            Move::EnPassantAttack { .. } => write!(f, "{}x{} e.p.", self.from(), self.to()),
            Move::PawnPromotion { inner, promote_to } => {
                write!(
                    f,
                    "{}={}",
                    inner,
                    promote_to.to_char(Alliance::White)
                )
            }
            Move::Castle {
                side: CastleSide::KingSide,
                ..
            } => write!(f, "O-O"),
            Move::Castle {
                side: CastleSide::QueenSide,
                ..
            } => write!(f, "O-O-O"),
            Move::Null => write!(f, "--"),
        }
    }
}

/// Outcome classification of an attempted move. Always returned as data,
/// never raised as control flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveStatus {
    Done,
    IllegalMove,
    LeavesPlayerInCheck,
}

impl MoveStatus {
    #[inline]
    pub const fn is_done(self) -> bool {
        matches!(self, MoveStatus::Done)
    }
}

/// Result of attempting a move: the resulting board (the original board if
/// the attempt was rejected), the attempted move, and the status.
#[derive(Clone, Debug)]
pub struct MoveTransition {
    board: Board,
    mv: Move,
    status: MoveStatus,
}

impl MoveTransition {
    pub(crate) fn new(board: Board, mv: Move, status: MoveStatus) -> Self {
        MoveTransition { board, mv, status }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn move_played(&self) -> &Move {
        &self.mv
    }

    #[inline]
    pub fn status(&self) -> MoveStatus {
        self.status
    }
}

// ---------------------------------------------------------------------------
// External move record
// ---------------------------------------------------------------------------

/// Move-kind tag of a [`MoveRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Normal,
    Attack,
    EnPassant,
    Castle,
    Promotion,
}

/// The minimal information an external writer or logger needs about a move.
/// The engine does not define a textual game notation; this record is the
/// wire shape for collaborators that do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub piece: PieceKind,
    pub alliance: Alliance,
    pub from: Square,
    pub to: Square,
    pub move_kind: MoveKind,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
}
