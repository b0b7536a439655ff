use std::path::PathBuf;

use chess_core::ChessError;
use thiserror::Error;

use crate::store::GameId;

/// Failures of the auth/catalog collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no game with id {0}")]
    UnknownGame(GameId),

    #[error("stored game state is unreadable: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Why a single command was refused.
///
/// The `Display` text is exactly what the requester receives in its `ERROR`
/// message. None of these end the session.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Error: Invalid authtoken")]
    Unauthorized,

    #[error("Error: Invalid gameID")]
    GameNotFound,

    #[error("Error: {0}")]
    NotParticipant(&'static str),

    #[error("Error: It's not your turn")]
    NotYourTurn,

    #[error("Error: The game is already over")]
    GameEnded,

    #[error("Error: That's not a valid move")]
    InvalidMove(#[source] ChessError),

    #[error("Error: Malformed command: {0}")]
    MalformedCommand(String),

    #[error("Error: Unknown server error")]
    StoreUnavailable(#[from] StoreError),
}

pub(crate) const INCORRECT_PLAYER: &str = "Incorrect player attempted to join";
pub(crate) const NOT_A_PARTICIPANT: &str = "You are not a participant in this game";

impl From<ChessError> for ServerError {
    fn from(err: ChessError) -> Self {
        match err {
            ChessError::GameEnded => ServerError::GameEnded,
            other => ServerError::InvalidMove(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
