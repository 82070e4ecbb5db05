use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ChessBoard, ChessField, Color, Piece, PieceType, Square};
use crate::chess_errors::{ChessError, ChessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Basic {
        from: ChessField,
        to: ChessField,
    },
    KingsideCastle(Color),
    QueensideCastle(Color),
    EnPassant {
        from: ChessField,
        to: ChessField,
    },
    Promotion {
        from: ChessField,
        to: ChessField,
        promotion: PieceType,
    },
}

/// Outcome of executing a [`Move`] on a board. Carries what bookkeeping and
/// notation need to know about the move after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedMove {
    pub mv: Move,
    pub piece: PieceType,
    pub capture: bool,
    pub pawn_advance: bool,
    /// En passant target created by a double pawn push.
    pub en_passant: Option<ChessField>,
}

fn king_home(color: Color) -> ChessField {
    ChessField::new_unchecked(color.home_rank(), 5)
}

impl Move {
    pub fn basic(from: ChessField, to: ChessField) -> Self {
        Move::Basic { from, to }
    }

    pub fn from(&self) -> ChessField {
        match *self {
            Move::Basic { from, .. } | Move::EnPassant { from, .. } | Move::Promotion { from, .. } => from,
            Move::KingsideCastle(color) | Move::QueensideCastle(color) => king_home(color),
        }
    }

    pub fn to(&self) -> ChessField {
        match *self {
            Move::Basic { to, .. } | Move::EnPassant { to, .. } | Move::Promotion { to, .. } => to,
            Move::KingsideCastle(color) => ChessField::new_unchecked(color.home_rank(), 7),
            Move::QueensideCastle(color) => ChessField::new_unchecked(color.home_rank(), 3),
        }
    }

    pub fn promotion(&self) -> Option<PieceType> {
        match *self {
            Move::Promotion { promotion, .. } => Some(promotion),
            _ => None,
        }
    }

    /// Coordinate form such as "e2e4" or "e7e8q". Castles render as king moves.
    pub fn as_algebraic(&self) -> String {
        let base_move = format!("{}{}", self.from(), self.to());
        if let Some(promo) = self.promotion() {
            base_move + &promo.to_string().to_lowercase()
        } else {
            base_move
        }
    }

    /// Performs the board edits of this move on `board` without touching
    /// turn, clocks or castling rights.
    pub fn execute(self, board: &mut ChessBoard) -> ChessResult<ExecutedMove> {
        match self {
            Move::Basic { from, to } => {
                let piece = mover(board, from)?;
                if piece.kind == PieceType::Pawn && to.row() == piece.color.promotion_rank() {
                    return Err(ChessError::InvalidMove(format!("pawn on {} must promote", to)));
                }
                let capture = place(board, piece, from, to)?;
                let pawn_advance = piece.kind == PieceType::Pawn;
                let en_passant = if pawn_advance && from.row().abs_diff(to.row()) == 2 {
                    Some(ChessField::new_unchecked((from.row() + to.row()) / 2, from.col()))
                } else {
                    None
                };
                Ok(ExecutedMove {
                    mv: self,
                    piece: piece.kind,
                    capture,
                    pawn_advance,
                    en_passant,
                })
            }
            Move::KingsideCastle(color) | Move::QueensideCastle(color) => {
                let kingside = matches!(self, Move::KingsideCastle(_));
                if color != board.active_color {
                    return Err(ChessError::InvalidMove(format!("{} cannot castle on {}'s turn", color, board.active_color)));
                }
                let allowed = if kingside {
                    board.can_castle_kingside(color)
                } else {
                    board.can_castle_queenside(color)
                };
                if !allowed {
                    return Err(ChessError::InvalidMove(format!("{} cannot castle {}", color, self.side_name())));
                }
                let rank = color.home_rank();
                let (rook_from, rook_to) = if kingside { (8, 6) } else { (1, 4) };
                let king = mover(board, king_home(color))?;
                place(board, king, king_home(color), self.to())?;
                let rook = mover(board, ChessField::new_unchecked(rank, rook_from))?;
                place(board, rook, ChessField::new_unchecked(rank, rook_from), ChessField::new_unchecked(rank, rook_to))?;
                Ok(ExecutedMove {
                    mv: self,
                    piece: PieceType::King,
                    capture: false,
                    pawn_advance: false,
                    en_passant: None,
                })
            }
            Move::EnPassant { from, to } => {
                let piece = mover(board, from)?;
                if piece.kind != PieceType::Pawn {
                    return Err(ChessError::InvalidMove(format!("only pawns capture en passant, found {}", piece.kind)));
                }
                if board.en_passant != Some(to) {
                    return Err(ChessError::InvalidMove(format!("{} is not the en passant target", to)));
                }
                let behind = ChessField::new_unchecked(from.row(), to.col());
                match board.piece_at(behind) {
                    Some(Piece { kind: PieceType::Pawn, color, .. }) if color != piece.color => {}
                    _ => return Err(ChessError::InvalidMove(format!("no pawn to capture on {}", behind))),
                }
                board.set(behind, Square::Empty);
                place(board, piece, from, to)?;
                Ok(ExecutedMove {
                    mv: self,
                    piece: PieceType::Pawn,
                    capture: true,
                    pawn_advance: true,
                    en_passant: None,
                })
            }
            Move::Promotion { from, to, promotion } => {
                let piece = mover(board, from)?;
                if piece.kind != PieceType::Pawn || to.row() != piece.color.promotion_rank() {
                    return Err(ChessError::InvalidMove(format!("{} on {} cannot promote on {}", piece.kind, from, to)));
                }
                if !PieceType::PROMOTIONS.contains(&promotion) {
                    return Err(ChessError::InvalidMove(format!("cannot promote to {}", promotion)));
                }
                let capture = place(board, piece, from, to)?;
                let mut promoted = Piece::new(piece.color, promotion);
                promoted.has_moved = true;
                board.set(to, Square::Occupied(promoted));
                Ok(ExecutedMove {
                    mv: self,
                    piece: PieceType::Pawn,
                    capture,
                    pawn_advance: true,
                    en_passant: None,
                })
            }
        }
    }

    fn side_name(&self) -> &'static str {
        match self {
            Move::QueensideCastle(_) => "queenside",
            _ => "kingside",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_algebraic())
    }
}

/// Piece of the side to move standing on `from`.
fn mover(board: &ChessBoard, from: ChessField) -> ChessResult<Piece> {
    let piece = board
        .piece_at(from)
        .ok_or_else(|| ChessError::InvalidMove(format!("no piece on {}", from)))?;
    if piece.color != board.active_color {
        return Err(ChessError::InvalidMove(format!("{} on {} is not {}'s piece", piece.kind, from, board.active_color)));
    }
    Ok(piece)
}

/// Moves `piece` from `from` to `to`, returns whether something was captured.
fn place(board: &mut ChessBoard, mut piece: Piece, from: ChessField, to: ChessField) -> ChessResult<bool> {
    let capture = match board.piece_at(to) {
        Some(target) if target.color == piece.color => {
            return Err(ChessError::InvalidMove(format!("cannot capture own {} on {}", target.kind, to)));
        }
        Some(_) => true,
        None => false,
    };
    piece.has_moved = true;
    board.set(from, Square::Empty);
    board.set(to, Square::Occupied(piece));
    Ok(capture)
}

impl ExecutedMove {
    pub fn was_capture(&self) -> bool {
        self.capture
    }

    pub fn was_pawn_advance(&self) -> bool {
        self.pawn_advance
    }

    /// Notation without the check suffix, e.g. "Nf3", "exd5", "e8=Q", "0-0".
    pub fn basic_notation(&self) -> String {
        let capture = if self.capture { "x" } else { "" };
        match self.mv {
            Move::KingsideCastle(_) => "0-0".to_string(),
            Move::QueensideCastle(_) => "0-0-0".to_string(),
            Move::EnPassant { from, to } => format!("{}x{}", from.file(), to),
            Move::Promotion { from, to, promotion } => {
                let file = if self.capture { format!("{}x", from.file()) } else { String::new() };
                format!("{}{}={}", file, to, promotion)
            }
            Move::Basic { from, to } => match self.piece {
                PieceType::Pawn if self.capture => format!("{}x{}", from.file(), to),
                PieceType::Pawn => to.to_string(),
                kind => format!("{}{}{}", kind, capture, to),
            },
        }
    }

    /// Full notation; `after` is the position this move produced.
    pub fn notation(&self, after: &ChessBoard) -> String {
        let suffix = if after.is_checkmate() {
            "#"
        } else {
            match after.find_king(after.active_color) {
                Some(king) => match after.count_attackers(king, after.active_color.opposite()) {
                    0 => "",
                    1 => "+",
                    _ => "++",
                },
                None => "",
            }
        };
        format!("{}{}", self.basic_notation(), suffix)
    }
}
