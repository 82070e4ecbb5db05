//! Chess rules: board snapshots, legal move generation, move text, FEN and
//! game termination.

pub mod chess_board;
pub mod chess_errors;
pub mod game;
pub mod perft;

pub use chess_board::{AppliedMove, ChessBoard, ChessField, Color, ExecutedMove, Move, Piece, PieceType, Square};
pub use chess_errors::{ChessError, ChessResult};
pub use game::{Game, GameResult, Outcome, Termination};
