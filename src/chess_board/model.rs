use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chess_errors::{ChessError, ChessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a single pawn step.
    pub fn pawn_direction(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank holding the king and rooks at the start of the game.
    pub fn home_rank(&self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 8,
        }
    }

    pub fn pawn_rank(&self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    pub fn promotion_rank(&self) -> u8 {
        self.opposite().home_rank()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// Piece types a pawn may turn into, in the order they are generated.
    pub const PROMOTIONS: [PieceType; 4] = [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight];

    /// Parses an uppercase piece letter as used in move text.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'P' => Some(PieceType::Pawn),
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }

    pub fn is_minor(&self) -> bool {
        matches!(self, PieceType::Knight | PieceType::Bishop)
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A piece on the board. `has_moved` only matters for pawns (double first
/// push) and is ignored by equality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceType,
    pub has_moved: bool,
}

impl PartialEq for Piece {
    fn eq(&self, other: &Self) -> bool {
        self.color == other.color && self.kind == other.kind
    }
}

impl Eq for Piece {}

impl Piece {
    pub fn new(color: Color, kind: PieceType) -> Self {
        Self {
            color,
            kind,
            has_moved: false,
        }
    }

    /// Parses a FEN piece letter, uppercase for white.
    pub fn from_char(c: char) -> ChessResult<Self> {
        let kind = PieceType::from_char(c.to_ascii_uppercase()).ok_or(ChessError::InvalidPiece(c))?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Ok(Piece::new(color, kind))
    }

    pub fn to_char(&self) -> char {
        match self.color {
            Color::White => self.kind.to_char(),
            Color::Black => self.kind.to_char().to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Square {
    Occupied(Piece),
    Empty,
}

impl Square {
    pub fn piece(&self) -> Option<Piece> {
        match self {
            Square::Occupied(piece) => Some(*piece),
            Square::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Square::Empty)
    }
}

/// A board cell. Row and column both run from 1 to 8; a field can only be
/// built inside that range.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChessField {
    row: u8,
    col: u8,
}

impl ChessField {
    pub fn new(row: u8, col: u8) -> ChessResult<Self> {
        if (1..=8).contains(&row) && (1..=8).contains(&col) {
            Ok(Self { row, col })
        } else {
            Err(ChessError::InvalidCoordinate(format!("row {} col {}", row, col)))
        }
    }

    /// Caller guarantees both coordinates are in 1..=8.
    pub(crate) const fn new_unchecked(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    /// Zero based grid index (row, col).
    pub(crate) fn index(&self) -> (usize, usize) {
        ((self.row - 1) as usize, (self.col - 1) as usize)
    }

    /// The field `drow` rows and `dcol` columns away, if still on the board.
    pub fn offset(&self, drow: i8, dcol: i8) -> Option<ChessField> {
        let row = self.row as i8 + drow;
        let col = self.col as i8 + dcol;
        if (1..=8).contains(&row) && (1..=8).contains(&col) {
            Some(Self::new_unchecked(row as u8, col as u8))
        } else {
            None
        }
    }

    pub fn from_algebraic(algebraic: &str) -> ChessResult<Self> {
        let mut chars = algebraic.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file @ 'a'..='h'), Some(rank @ '1'..='8'), None) => {
                Ok(Self::new_unchecked(rank as u8 - b'0', file as u8 - b'a' + 1))
            }
            _ => Err(ChessError::InvalidCoordinate(algebraic.to_string())),
        }
    }

    pub fn as_algebraic(&self) -> String {
        format!("{}{}", self.file(), self.row)
    }

    pub fn file(&self) -> char {
        (b'a' + self.col - 1) as char
    }

    /// All 64 fields, rank 1 first.
    pub fn all() -> impl Iterator<Item = ChessField> {
        (1..=8u8).flat_map(|row| (1..=8u8).map(move |col| Self::new_unchecked(row, col)))
    }
}

impl FromStr for ChessField {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_algebraic(s)
    }
}

impl TryFrom<String> for ChessField {
    type Error = ChessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_algebraic(&value)
    }
}

impl From<ChessField> for String {
    fn from(field: ChessField) -> Self {
        field.as_algebraic()
    }
}

impl fmt::Display for ChessField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_algebraic())
    }
}
