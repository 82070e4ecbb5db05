//! Free-form move text to [`Move`]. Patterns are tried in a fixed order; the
//! first one that matches decides, and it has to resolve to exactly one legal
//! move.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::{ChessBoard, ChessField, Move, PieceType};

const SQUARE: &str = "[a-h][1-8]";
const SEP: &str = r"\s*[x-]?\s*";
const PROMO: &str = r"\s*=?\s*";

lazy_static! {
    static ref KINGSIDE_RE: Regex = Regex::new("^(0-0|O-O)$").unwrap();
    static ref QUEENSIDE_RE: Regex = Regex::new("^(0-0-0|O-O-O)$").unwrap();
    static ref SQUARE_TO_SQUARE_RE: Regex =
        Regex::new(&format!("^({sq}){sep}({sq})$", sq = SQUARE, sep = SEP)).unwrap();
    static ref SQUARE_TO_SQUARE_PROMO_RE: Regex =
        Regex::new(&format!("^({sq}){sep}({sq}){promo}([QRBNqrbn])$", sq = SQUARE, sep = SEP, promo = PROMO)).unwrap();
    static ref DESTINATION_RE: Regex = Regex::new(&format!("^({sq})$", sq = SQUARE)).unwrap();
    static ref FILE_DESTINATION_RE: Regex =
        Regex::new(&format!("^([a-h]){sep}({sq})$", sq = SQUARE, sep = SEP)).unwrap();
    static ref DESTINATION_PROMO_RE: Regex =
        Regex::new(&format!("^({sq}){promo}([QRBN])$", sq = SQUARE, promo = PROMO)).unwrap();
    static ref FILE_DESTINATION_PROMO_RE: Regex =
        Regex::new(&format!("^([a-h]){sep}({sq}){promo}([QRBN])$", sq = SQUARE, sep = SEP, promo = PROMO)).unwrap();
    static ref PIECE_RE: Regex = Regex::new(&format!("^([KQRBNP]){sep}({sq})$", sq = SQUARE, sep = SEP)).unwrap();
    static ref PIECE_FILE_RE: Regex =
        Regex::new(&format!("^([KQRBNP])([a-h]){sep}({sq})$", sq = SQUARE, sep = SEP)).unwrap();
    static ref PIECE_RANK_RE: Regex =
        Regex::new(&format!("^([KQRBNP])([1-8]){sep}({sq})$", sq = SQUARE, sep = SEP)).unwrap();
    static ref PIECE_SQUARE_RE: Regex =
        Regex::new(&format!("^([KQRBNP])({sq}){sep}({sq})$", sq = SQUARE, sep = SEP)).unwrap();
}

/// Source constraints a move text may state.
#[derive(Debug, Default, Clone, Copy)]
struct Filter {
    row: Option<u8>,
    col: Option<u8>,
    promotion: Option<PieceType>,
}

fn square(caps: &Captures, i: usize) -> Option<ChessField> {
    caps.get(i).and_then(|m| ChessField::from_algebraic(m.as_str()).ok())
}

fn piece(caps: &Captures, i: usize) -> Option<PieceType> {
    caps.get(i)
        .and_then(|m| m.as_str().chars().next())
        .and_then(|c| PieceType::from_char(c.to_ascii_uppercase()))
}

fn file(caps: &Captures, i: usize) -> Option<u8> {
    caps.get(i)
        .and_then(|m| m.as_str().bytes().next())
        .map(|b| b - b'a' + 1)
}

fn rank(caps: &Captures, i: usize) -> Option<u8> {
    caps.get(i)
        .and_then(|m| m.as_str().bytes().next())
        .map(|b| b - b'0')
}

/// Exactly one survivor, otherwise nothing.
fn single(mut candidates: impl Iterator<Item = Move>) -> Option<Move> {
    let first = candidates.next()?;
    match candidates.next() {
        None => Some(first),
        Some(_) => None,
    }
}

/// Legal moves of `kind` landing on `target` that satisfy `filter`.
fn process_match(board: &ChessBoard, kind: PieceType, target: ChessField, filter: Filter) -> Option<Move> {
    single(board.moves_with_target(kind, target).into_iter().filter(|mv| {
        let from = mv.from();
        filter.row.map_or(true, |row| from.row() == row)
            && filter.col.map_or(true, |col| from.col() == col)
            && mv.promotion() == filter.promotion
    }))
}

/// Move from `from` to `to`, whatever its kind (castle, en passant, ...).
fn from_squares(board: &ChessBoard, from: ChessField, to: ChessField, promotion: Option<PieceType>) -> Option<Move> {
    single(
        board
            .legal_moves_from(from)
            .into_iter()
            .filter(|mv| mv.to() == to && mv.promotion() == promotion),
    )
}

fn castle(board: &ChessBoard, mv: Move) -> Option<Move> {
    board.legal_moves_from(mv.from()).into_iter().find(|&legal| legal == mv)
}

pub(crate) fn parse_move(board: &ChessBoard, text: &str) -> Option<Move> {
    let text = text.trim().trim_end_matches(['#', '+']).trim_end();
    let color = board.active_color();

    if KINGSIDE_RE.is_match(text) {
        return castle(board, Move::KingsideCastle(color));
    }
    if QUEENSIDE_RE.is_match(text) {
        return castle(board, Move::QueensideCastle(color));
    }
    if let Some(caps) = SQUARE_TO_SQUARE_RE.captures(text) {
        return from_squares(board, square(&caps, 1)?, square(&caps, 2)?, None);
    }
    if let Some(caps) = SQUARE_TO_SQUARE_PROMO_RE.captures(text) {
        return from_squares(board, square(&caps, 1)?, square(&caps, 2)?, Some(piece(&caps, 3)?));
    }
    if let Some(caps) = DESTINATION_RE.captures(text) {
        let target = square(&caps, 1)?;
        let filter = Filter {
            col: Some(target.col()),
            ..Filter::default()
        };
        return process_match(board, PieceType::Pawn, target, filter);
    }
    if let Some(caps) = FILE_DESTINATION_RE.captures(text) {
        let filter = Filter {
            col: Some(file(&caps, 1)?),
            ..Filter::default()
        };
        return process_match(board, PieceType::Pawn, square(&caps, 2)?, filter);
    }
    if let Some(caps) = DESTINATION_PROMO_RE.captures(text) {
        // any pawn file, so a lone capturing promotion may be written `d8=Q`
        let filter = Filter {
            promotion: Some(piece(&caps, 2)?),
            ..Filter::default()
        };
        return process_match(board, PieceType::Pawn, square(&caps, 1)?, filter);
    }
    if let Some(caps) = FILE_DESTINATION_PROMO_RE.captures(text) {
        let filter = Filter {
            col: Some(file(&caps, 1)?),
            promotion: Some(piece(&caps, 3)?),
            ..Filter::default()
        };
        return process_match(board, PieceType::Pawn, square(&caps, 2)?, filter);
    }
    if let Some(caps) = PIECE_RE.captures(text) {
        return process_match(board, piece(&caps, 1)?, square(&caps, 2)?, Filter::default());
    }
    if let Some(caps) = PIECE_FILE_RE.captures(text) {
        let filter = Filter {
            col: Some(file(&caps, 2)?),
            ..Filter::default()
        };
        return process_match(board, piece(&caps, 1)?, square(&caps, 3)?, filter);
    }
    if let Some(caps) = PIECE_RANK_RE.captures(text) {
        let filter = Filter {
            row: Some(rank(&caps, 2)?),
            ..Filter::default()
        };
        return process_match(board, piece(&caps, 1)?, square(&caps, 3)?, filter);
    }
    if let Some(caps) = PIECE_SQUARE_RE.captures(text) {
        let from = square(&caps, 2)?;
        let filter = Filter {
            row: Some(from.row()),
            col: Some(from.col()),
            ..Filter::default()
        };
        return process_match(board, piece(&caps, 1)?, square(&caps, 3)?, filter);
    }
    None
}
