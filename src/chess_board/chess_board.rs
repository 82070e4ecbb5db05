use serde::{Deserialize, Serialize};

use super::moves::ExecutedMove;
use super::zobrist_hash::ZOBRIST;
use super::{fen, notation, ChessField, Color, Move, Piece, PieceType, Square};
use crate::chess_errors::{ChessError, ChessResult};

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Index into `castling_rights`: K, Q, k, q.
pub(crate) fn castling_index(color: Color, kingside: bool) -> usize {
    match (color, kingside) {
        (Color::White, true) => 0,
        (Color::White, false) => 1,
        (Color::Black, true) => 2,
        (Color::Black, false) => 3,
    }
}

/// Immutable snapshot of a game position. Playing a move never changes a
/// board, it produces a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessBoard {
    pub(crate) squares: [[Square; 8]; 8],
    pub(crate) active_color: Color,
    pub(crate) castling_rights: [bool; 4],
    pub(crate) en_passant: Option<ChessField>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
}

/// A move that has been played: the resulting board, what happened and the
/// rendered notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub board: ChessBoard,
    pub executed: ExecutedMove,
    pub notation: String,
}

impl Default for ChessBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessBoard {
    /// Creates an empty chess board
    pub fn new() -> Self {
        Self {
            squares: [[Square::Empty; 8]; 8],
            active_color: Color::White,
            castling_rights: [false; 4],
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn starting_position() -> Self {
        let mut board = Self::new();
        for color in [Color::White, Color::Black] {
            for (col, kind) in (1..=8u8).zip(BACK_RANK) {
                board.set(ChessField::new_unchecked(color.home_rank(), col), Square::Occupied(Piece::new(color, kind)));
                board.set(
                    ChessField::new_unchecked(color.pawn_rank(), col),
                    Square::Occupied(Piece::new(color, PieceType::Pawn)),
                );
            }
        }
        board.castling_rights = [true; 4];
        board
    }

    /// Delegates FEN parsing to the `fen` module.
    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        fen::from_fen(fen)
    }

    pub fn to_fen(&self) -> String {
        fen::to_fen(self)
    }

    pub fn active_color(&self) -> Color {
        self.active_color
    }

    pub fn castling_rights(&self) -> [bool; 4] {
        self.castling_rights
    }

    pub fn en_passant(&self) -> Option<ChessField> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn piece_at(&self, field: ChessField) -> Option<Piece> {
        let (row, col) = field.index();
        self.squares[row][col].piece()
    }

    pub(crate) fn set(&mut self, field: ChessField, square: Square) {
        let (row, col) = field.index();
        self.squares[row][col] = square;
    }

    /// Returns an iterator over all pieces on the chessboard along with their coordinates.
    pub fn pieces_with_coordinates(&self) -> impl Iterator<Item = (ChessField, Piece)> + '_ {
        ChessField::all().filter_map(move |field| self.piece_at(field).map(|piece| (field, piece)))
    }

    pub fn find_king(&self, color: Color) -> Option<ChessField> {
        self.pieces_with_coordinates()
            .find(|(_, piece)| piece.kind == PieceType::King && piece.color == color)
            .map(|(field, _)| field)
    }

    pub fn under_attack(&self, target: ChessField, by: Color) -> bool {
        self.pieces_with_coordinates()
            .any(|(field, piece)| piece.color == by && piece.can_attack(self, field, target))
    }

    pub fn count_attackers(&self, target: ChessField, by: Color) -> usize {
        self.pieces_with_coordinates()
            .filter(|(field, piece)| piece.color == by && piece.can_attack(self, *field, target))
            .count()
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.find_king(color)
            .map_or(false, |king| self.under_attack(king, color.opposite()))
    }

    /// Whether the side to move is in check.
    pub fn in_check(&self) -> bool {
        self.is_in_check(self.active_color)
    }

    /// The side that just moved must not have left its king in check.
    pub fn is_valid_state(&self) -> bool {
        !self.is_in_check(self.active_color.opposite())
    }

    pub fn can_castle_kingside(&self, color: Color) -> bool {
        self.can_castle(color, true)
    }

    pub fn can_castle_queenside(&self, color: Color) -> bool {
        self.can_castle(color, false)
    }

    fn can_castle(&self, color: Color, kingside: bool) -> bool {
        let rank = color.home_rank();
        let at = |col: u8| ChessField::new_unchecked(rank, col);
        // fields the king crosses, and the b-file field that only has to be empty
        let (rook_col, crossed, passed): (u8, [u8; 2], &[u8]) = if kingside {
            (8, [6, 7], &[])
        } else {
            (1, [4, 3], &[2])
        };

        self.castling_rights[castling_index(color, kingside)]
            && self.piece_at(at(5)) == Some(Piece::new(color, PieceType::King))
            && self.piece_at(at(rook_col)) == Some(Piece::new(color, PieceType::Rook))
            && !self.is_in_check(color)
            && passed.iter().all(|&col| self.piece_at(at(col)).is_none())
            && crossed
                .iter()
                .all(|&col| self.piece_at(at(col)).is_none() && !self.under_attack(at(col), color.opposite()))
    }

    /// Plays `mv` and returns the resulting board. Fails if the move is
    /// structurally impossible or leaves the mover's king in check.
    pub fn make_move(&self, mv: Move) -> ChessResult<ChessBoard> {
        self.play(mv).map(|(board, _)| board)
    }

    /// Like [`ChessBoard::make_move`], but also reports what the move did and
    /// how it is written.
    pub fn apply_move(&self, mv: Move) -> ChessResult<AppliedMove> {
        let (board, executed) = self.play(mv)?;
        let notation = executed.notation(&board);
        Ok(AppliedMove {
            board,
            executed,
            notation,
        })
    }

    fn play(&self, mv: Move) -> ChessResult<(ChessBoard, ExecutedMove)> {
        let piece = self
            .piece_at(mv.from())
            .ok_or_else(|| ChessError::InvalidMove(format!("no piece on {}", mv.from())))?;
        if piece.color != self.active_color {
            return Err(ChessError::InvalidMove(format!(
                "{} on {} cannot move on {}'s turn",
                piece.kind,
                mv.from(),
                self.active_color
            )));
        }
        if !piece.can_move(self, mv) {
            return Err(ChessError::InvalidMove(format!("{} cannot play {}", piece.kind, mv)));
        }

        let mut board = self.clone();
        let executed = mv.execute(&mut board)?;
        board.update_state(&executed);

        if !board.is_valid_state() {
            return Err(ChessError::InvalidMove(format!("{} leaves the {} king in check", mv, self.active_color)));
        }
        Ok((board, executed))
    }

    fn update_state(&mut self, executed: &ExecutedMove) {
        self.active_color = self.active_color.opposite();
        if self.active_color == Color::White {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        if executed.was_capture() || executed.was_pawn_advance() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        self.update_castling_rights();
        self.en_passant = executed.en_passant;
    }

    /// Drops every right whose king or rook is no longer on its home field.
    fn update_castling_rights(&mut self) {
        for color in [Color::White, Color::Black] {
            let rank = color.home_rank();
            let king_home = self.piece_at(ChessField::new_unchecked(rank, 5)) == Some(Piece::new(color, PieceType::King));
            for (kingside, rook_col) in [(true, 8), (false, 1)] {
                let rook_home =
                    self.piece_at(ChessField::new_unchecked(rank, rook_col)) == Some(Piece::new(color, PieceType::Rook));
                if !king_home || !rook_home {
                    self.castling_rights[castling_index(color, kingside)] = false;
                }
            }
        }
    }

    /// Legal moves of the piece on `field`, empty if there is none.
    pub fn legal_moves_from(&self, field: ChessField) -> Vec<Move> {
        self.piece_at(field)
            .map(|piece| piece.legal_moves(self, field))
            .unwrap_or_default()
    }

    /// All legal moves of the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.pieces_with_coordinates()
            .filter(|(_, piece)| piece.color == self.active_color)
            .flat_map(|(field, piece)| piece.legal_moves(self, field))
            .collect()
    }

    pub fn has_legal_moves(&self) -> bool {
        self.pieces_with_coordinates()
            .filter(|(_, piece)| piece.color == self.active_color)
            .any(|(field, piece)| !piece.legal_moves(self, field).is_empty())
    }

    /// Legal moves of the side to move's pieces of `kind` that land on
    /// `target`. Castles count as king moves to the king's destination.
    pub fn moves_with_target(&self, kind: PieceType, target: ChessField) -> Vec<Move> {
        self.pieces_with_coordinates()
            .filter(|(_, piece)| piece.color == self.active_color && piece.kind == kind)
            .flat_map(|(field, piece)| piece.legal_moves(self, field))
            .filter(|mv| mv.to() == target)
            .collect()
    }

    pub fn is_checkmate(&self) -> bool {
        self.in_check() && !self.has_legal_moves()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.in_check() && !self.has_legal_moves()
    }

    pub fn is_fifty_move_rule(&self) -> bool {
        self.halfmove_clock >= 50
    }

    /// Kings are ignored. Any queen, rook or pawn means mate is still possible;
    /// otherwise it is a draw if each side has at most one minor piece, or one
    /// side has exactly two knights against a bare king.
    pub fn insufficient_material(&self) -> bool {
        // (knights, bishops) per color
        let mut minors = [(0u8, 0u8); 2];
        for (_, piece) in self.pieces_with_coordinates() {
            let side = &mut minors[if piece.color == Color::White { 0 } else { 1 }];
            match piece.kind {
                PieceType::Queen | PieceType::Rook | PieceType::Pawn => return false,
                PieceType::Knight => side.0 += 1,
                PieceType::Bishop => side.1 += 1,
                PieceType::King => {}
            }
        }

        let [white, black] = minors;
        let total = |(knights, bishops): (u8, u8)| knights + bishops;
        if total(white) <= 1 && total(black) <= 1 {
            return true;
        }
        let two_knights_vs_bare_king = |side: (u8, u8), other: (u8, u8)| side == (2, 0) && other == (0, 0);
        two_knights_vs_bare_king(white, black) || two_knights_vs_bare_king(black, white)
    }

    /// Same side to move, castling rights, en passant target and placement.
    /// Move counters are ignored.
    pub fn same_position(&self, other: &ChessBoard) -> bool {
        self.active_color == other.active_color
            && self.castling_rights == other.castling_rights
            && self.en_passant == other.en_passant
            && self.squares == other.squares
    }

    pub fn zobrist_key(&self) -> u64 {
        ZOBRIST.calculate_hash(self)
    }

    /// Resolves free-form move text against this position. `None` if the
    /// text is malformed, ambiguous or names no legal move.
    pub fn parse_move(&self, text: &str) -> Option<Move> {
        notation::parse_move(self, text)
    }

    pub fn render_to_string(&self) -> String {
        let mut board_representation = String::new();
        board_representation.push_str("    a   b   c   d   e   f   g   h  \n");
        board_representation.push_str("  ┌───┬───┬───┬───┬───┬───┬───┬───┐\n");

        for row in (0..8).rev() {
            board_representation.push_str(&format!("{} │", row + 1));
            for square in &self.squares[row] {
                let symbol = square.piece().map_or(' ', |piece| piece.to_char());
                board_representation.push_str(&format!(" {} │", symbol));
            }
            board_representation.push_str(&format!(" {}\n", row + 1));

            if row > 0 {
                board_representation.push_str("  ├───┼───┼───┼───┼───┼───┼───┼───┤\n");
            }
        }

        board_representation.push_str("  └───┴───┴───┴───┴───┴───┴───┴───┘\n");
        board_representation.push_str("    a   b   c   d   e   f   g   h  \n");

        board_representation
    }
}
