use super::{ChessBoard, Color, PieceType, Square};
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::sync::Arc;

const BOARD_SIZE: usize = 8;

/// Random keys for hashing positions. Two boards with the same placement,
/// side to move, castling rights and en passant file get the same hash.
pub struct ZobristHash {
    piece_keys: [[[u64; BOARD_SIZE * BOARD_SIZE]; 6]; 2],
    side_to_move_key: u64,
    castling_keys: [u64; 4],
    en_passant_keys: [u64; BOARD_SIZE],
}

fn piece_index(kind: PieceType) -> usize {
    match kind {
        PieceType::Pawn => 0,
        PieceType::Knight => 1,
        PieceType::Bishop => 2,
        PieceType::Rook => 3,
        PieceType::Queen => 4,
        PieceType::King => 5,
    }
}

impl ZobristHash {
    fn new(seed: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);

        let mut piece_keys = [[[0; BOARD_SIZE * BOARD_SIZE]; 6]; 2];
        for color_keys in &mut piece_keys {
            for piece_type_keys in color_keys {
                for square_key in piece_type_keys {
                    *square_key = rng.gen();
                }
            }
        }

        let side_to_move_key = rng.gen();

        let mut castling_keys = [0; 4];
        for key in &mut castling_keys {
            *key = rng.gen();
        }

        let mut en_passant_keys = [0; BOARD_SIZE];
        for file in &mut en_passant_keys {
            *file = rng.gen();
        }

        ZobristHash {
            piece_keys,
            side_to_move_key,
            castling_keys,
            en_passant_keys,
        }
    }

    pub fn calculate_hash(&self, board: &ChessBoard) -> u64 {
        let mut hash = 0;

        for (row, squares) in board.squares.iter().enumerate() {
            for (col, square) in squares.iter().enumerate() {
                if let Square::Occupied(piece) = square {
                    let color_index = match piece.color {
                        Color::White => 0,
                        Color::Black => 1,
                    };
                    hash ^= self.piece_keys[color_index][piece_index(piece.kind)][row * BOARD_SIZE + col];
                }
            }
        }

        if board.active_color == Color::Black {
            hash ^= self.side_to_move_key;
        }

        for (key, right) in self.castling_keys.iter().zip(board.castling_rights) {
            if right {
                hash ^= key;
            }
        }

        if let Some(en_passant) = board.en_passant {
            hash ^= self.en_passant_keys[en_passant.col() as usize - 1];
        }

        hash
    }
}

lazy_static! {
    pub static ref ZOBRIST: Arc<ZobristHash> = Arc::new(ZobristHash::new(42));
}
