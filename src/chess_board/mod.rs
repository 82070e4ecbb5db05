pub mod fen;
pub mod zobrist_hash;
pub use zobrist_hash::ZobristHash;
pub use zobrist_hash::ZOBRIST;
pub mod model;
pub use model::{ChessField, Color, Piece, PieceType, Square};
mod moves;
pub use moves::{ExecutedMove, Move};

mod chess_board;
mod move_generation;
mod notation;
#[cfg(test)]
mod test_utils;
pub use chess_board::{AppliedMove, ChessBoard};
