//! JSON messages exchanged over a game connection.

use chess_core::{Color, Game, Move};
use serde::{Deserialize, Serialize};

use crate::store::GameId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    JoinPlayer,
    JoinObserver,
    MakeMove,
    Leave,
    Resign,
}

/// Client → server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGameCommand {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    pub auth_token: String,
    #[serde(alias = "gameID")]
    pub game_id: GameId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_color: Option<Color>,
    #[serde(default, rename = "move", skip_serializing_if = "Option::is_none")]
    pub mv: Option<Move>,
}

impl UserGameCommand {
    pub fn new(kind: CommandKind, auth_token: impl Into<String>, game_id: GameId) -> Self {
        UserGameCommand {
            kind,
            auth_token: auth_token.into(),
            game_id,
            player_color: None,
            mv: None,
        }
    }

    pub fn join_player(auth_token: impl Into<String>, game_id: GameId, color: Color) -> Self {
        UserGameCommand {
            player_color: Some(color),
            ..Self::new(CommandKind::JoinPlayer, auth_token, game_id)
        }
    }

    pub fn make_move(auth_token: impl Into<String>, game_id: GameId, mv: Move) -> Self {
        UserGameCommand {
            mv: Some(mv),
            ..Self::new(CommandKind::MakeMove, auth_token, game_id)
        }
    }
}

/// Server → client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    LoadGame {
        game: Game,
    },
    Notification {
        message: String,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

impl ServerMessage {
    pub fn load_game(game: Game) -> Self {
        ServerMessage::LoadGame { game }
    }

    pub fn notification(message: impl Into<String>) -> Self {
        ServerMessage::Notification {
            message: message.into(),
        }
    }

    pub fn error(error_message: impl Into<String>) -> Self {
        ServerMessage::Error {
            error_message: error_message.into(),
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod protocol_tests;
