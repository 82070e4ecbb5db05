use thiserror::Error;

/// Errors raised by the rules engine. All of them are caused by bad input
/// and leave every existing board untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Invalid piece character: {0}")]
    InvalidPiece(char),

    #[error("Invalid FEN string: {0}")]
    InvalidFen(String),
}

pub type ChessResult<T> = std::result::Result<T, ChessError>;
