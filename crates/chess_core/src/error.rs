use thiserror::Error;

/// Errors produced by the rules engine.
///
/// None of these are fatal: an illegal move attempt leaves the game untouched
/// and is reported back to whoever asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("{row}, {column} is not on the board")]
    OutOfBounds { row: i32, column: i32 },

    #[error("invalid move: {0}")]
    InvalidMove(String),

    #[error("the game is already over")]
    GameEnded,

    #[error("invalid notation: {0}")]
    InvalidNotation(String),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),
}

impl ChessError {
    pub(crate) fn invalid_move(reason: impl Into<String>) -> Self {
        ChessError::InvalidMove(reason.into())
    }
}
