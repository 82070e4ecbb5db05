use super::ChessBoard;
use super::{ChessField, Color, Piece, PieceType, Square};
use crate::chess_errors::{ChessError, ChessResult};

pub const INITIAL_POSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const CASTLING_SYMBOLS: [char; 4] = ['K', 'Q', 'k', 'q'];

/// Parses a FEN string and sets up a ChessBoard. Nothing is returned unless
/// all six fields are valid.
pub fn from_fen(fen: &str) -> ChessResult<ChessBoard> {
    let mut board = ChessBoard::new();
    let parts: Vec<&str> = fen.split(' ').collect();
    if parts.len() != 6 {
        return Err(ChessError::InvalidFen(format!("expected 6 fields, found {}", parts.len())));
    }

    let rows: Vec<&str> = parts[0].split('/').collect();
    if rows.len() != 8 {
        return Err(ChessError::InvalidFen(format!("expected 8 rows, found {}", rows.len())));
    }

    for (row_index, row) in rows.iter().enumerate() {
        let rank = 8 - row_index as u8;
        let mut col = 1u8;

        for c in row.chars() {
            if col > 8 {
                return Err(ChessError::InvalidFen(format!("too many squares in rank {}", rank)));
            }
            match c {
                '1'..='8' => col += c as u8 - b'0',
                _ => {
                    let mut piece = Piece::from_char(c)?;
                    // a pawn off its starting rank has moved
                    piece.has_moved = piece.kind == PieceType::Pawn && rank != piece.color.pawn_rank();
                    board.set(ChessField::new_unchecked(rank, col), Square::Occupied(piece));
                    col += 1;
                }
            }
        }
        if col != 9 {
            return Err(ChessError::InvalidFen(format!("rank {} does not have 8 squares", rank)));
        }
    }

    board.active_color = match parts[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(ChessError::InvalidFen(format!("invalid active color: {}", other))),
    };

    board.castling_rights = parse_castling(parts[2])?;

    board.en_passant = match parts[3] {
        "-" => None,
        square => {
            let field = ChessField::from_algebraic(square)?;
            if field.row() != 3 && field.row() != 6 {
                return Err(ChessError::InvalidFen(format!("en passant square not on rank 3 or 6: {}", square)));
            }
            Some(field)
        }
    };

    board.halfmove_clock = parts[4]
        .parse::<u32>()
        .map_err(|_| ChessError::InvalidFen(format!("halfmove clock is not a valid number: {}", parts[4])))?;

    board.fullmove_number = parts[5]
        .parse::<u32>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| ChessError::InvalidFen(format!("fullmove number is not a positive number: {}", parts[5])))?;

    Ok(board)
}

fn parse_castling(field: &str) -> ChessResult<[bool; 4]> {
    let mut rights = [false; 4];
    if field == "-" {
        return Ok(rights);
    }
    if field.is_empty() {
        return Err(ChessError::InvalidFen("empty castling field".to_string()));
    }
    for c in field.chars() {
        let index = CASTLING_SYMBOLS
            .iter()
            .position(|&symbol| symbol == c)
            .ok_or_else(|| ChessError::InvalidFen(format!("invalid castling symbol: {}", c)))?;
        rights[index] = true;
    }
    Ok(rights)
}

pub fn to_fen(board: &ChessBoard) -> String {
    let mut board_representation = String::new();

    for rank in (0..8).rev() {
        let mut empty_count = 0;

        for square in &board.squares[rank] {
            match square {
                Square::Occupied(piece) => {
                    if empty_count > 0 {
                        board_representation.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    board_representation.push(piece.to_char());
                }
                Square::Empty => {
                    empty_count += 1;
                }
            }
        }

        if empty_count > 0 {
            board_representation.push_str(&empty_count.to_string());
        }

        if rank > 0 {
            board_representation.push('/');
        }
    }

    let active_color = if board.active_color == Color::White { "w" } else { "b" };

    let mut castling: String = CASTLING_SYMBOLS
        .iter()
        .zip(board.castling_rights)
        .filter(|(_, right)| *right)
        .map(|(symbol, _)| *symbol)
        .collect();
    if castling.is_empty() {
        castling = "-".to_string();
    }

    let en_passant_square = match board.en_passant {
        Some(square) => square.as_algebraic(),
        None => "-".to_string(),
    };

    format!(
        "{} {} {} {} {} {}",
        board_representation,
        active_color,
        castling,
        en_passant_square,
        board.halfmove_clock,
        board.fullmove_number
    )
}

#[cfg(test)]
mod test {
    use super::*;

    fn field(name: &str) -> ChessField {
        ChessField::from_algebraic(name).unwrap()
    }

    #[test]
    fn fen_empty_board() {
        let board = ChessBoard::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").expect("Failed to parse FEN");

        assert_eq!(board.pieces_with_coordinates().count(), 0);
        assert_eq!(board.active_color(), Color::White);
        assert_eq!(board.castling_rights(), [false, false, false, false]);
        assert_eq!(board.en_passant(), None);
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.fullmove_number(), 1);
    }

    #[test]
    fn fen_two_pawns() {
        let board = ChessBoard::from_fen("8/8/8/8/8/8/8/P3P3 w - - 0 1").expect("Failed to parse FEN");

        assert_eq!(board.piece_at(field("a1")), Some(Piece::new(Color::White, PieceType::Pawn)));
        assert_eq!(board.piece_at(field("e1")), Some(Piece::new(Color::White, PieceType::Pawn)));
        assert_eq!(board.pieces_with_coordinates().count(), 2);
    }

    #[test]
    fn fen_initial_board() {
        let board = ChessBoard::from_fen(INITIAL_POSITION).expect("Failed to parse FEN");

        for col in 1..=8 {
            let pawn = board.piece_at(ChessField::new(2, col).unwrap()).unwrap();
            assert_eq!(pawn, Piece::new(Color::White, PieceType::Pawn));
            assert!(!pawn.has_moved);
            assert_eq!(
                board.piece_at(ChessField::new(7, col).unwrap()),
                Some(Piece::new(Color::Black, PieceType::Pawn))
            );
        }

        assert_eq!(board.piece_at(field("a8")), Some(Piece::new(Color::Black, PieceType::Rook)));
        assert_eq!(board.piece_at(field("e1")), Some(Piece::new(Color::White, PieceType::King)));
        assert_eq!(board.piece_at(field("e4")), None);

        assert_eq!(board.active_color(), Color::White);
        assert_eq!(board.castling_rights(), [true, true, true, true]);
    }

    #[test]
    fn fen_pawn_has_moved_from_rank() {
        let board = ChessBoard::from_fen("8/8/p7/8/4P3/8/3P4/8 w - - 0 1").unwrap();
        assert!(board.piece_at(field("e4")).unwrap().has_moved);
        assert!(!board.piece_at(field("d2")).unwrap().has_moved);
        assert!(board.piece_at(field("a6")).unwrap().has_moved);
    }

    #[test]
    fn fen_invalid_piece() {
        let result = ChessBoard::from_fen("8/8/8/8/8/8/8/X7 w - - 0 1");
        assert_eq!(result, Err(ChessError::InvalidPiece('X')));
    }

    #[test]
    fn fen_invalid_fen_extra_columns() {
        let fen = "rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert!(matches!(ChessBoard::from_fen(fen), Err(ChessError::InvalidFen(_))));
        let fen = "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert!(ChessBoard::from_fen(fen).is_err());
    }

    #[test]
    fn fen_invalid_short_row() {
        let fen = "rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert!(matches!(ChessBoard::from_fen(fen), Err(ChessError::InvalidFen(_))));
    }

    #[test]
    fn test_invalid_fen_missing_parts() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w";
        assert!(matches!(ChessBoard::from_fen(fen), Err(ChessError::InvalidFen(_))));
    }

    #[test]
    fn test_invalid_fields() {
        for fen in [
            "8/8/8/8/8/8/8/8 x - - 0 1",
            "8/8/8/8/8/8/8/8 w KX - 0 1",
            "8/8/8/8/8/8/8/8 w - - -1 1",
            "8/8/8/8/8/8/8/8 w - - 0 0",
            "8/8/8/8/8/8/8/8 w - - 0 a",
            "8/8/8/8/8/8/8/8 w - e4 0 1",
            "8/8/8/8/8/8/8/8 b - a1 0 1",
        ] {
            assert!(matches!(ChessBoard::from_fen(fen), Err(ChessError::InvalidFen(_))), "{}", fen);
        }
        assert!(matches!(
            ChessBoard::from_fen("8/8/8/8/8/8/8/8 w - z9 0 1"),
            Err(ChessError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_en_passant_parsing() {
        let fen = "8/8/8/8/4pP2/8/8/8 b - f3 0 1";
        let board = ChessBoard::from_fen(fen).expect("Failed to parse FEN");

        assert_eq!(board.active_color(), Color::Black);
        assert_eq!(board.en_passant(), Some(field("f3")));
    }

    #[test]
    fn fen_halfmove_and_fullmove() {
        let fen = "8/8/8/8/8/8/PPPPPPPP/RNBQKBNR b - - 12 34";
        let board = ChessBoard::from_fen(fen).expect("Failed to parse FEN");

        assert_eq!(board.halfmove_clock(), 12);
        assert_eq!(board.fullmove_number(), 34);
    }

    #[test]
    fn fen_castling_rights() {
        let board = ChessBoard::from_fen("8/8/8/8/8/8/8/8 w Kq - 0 1").expect("Failed to parse FEN");
        assert_eq!(board.castling_rights(), [true, false, false, true]);
    }

    #[test]
    fn test_to_fen_round_trip() {
        for fen in [
            INITIAL_POSITION,
            "8/8/8/8/8/8/8/8 w - - 0 1",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR w Kq e3 0 2",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "4k3/8/8/8/8/8/8/4K3 b - - 99 250",
        ] {
            assert_eq!(ChessBoard::from_fen(fen).unwrap().to_fen(), fen);
        }
    }
}
