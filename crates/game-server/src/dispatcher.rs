//! Turns client commands into game mutations and outgoing messages.
//!
//! Every command on a game runs under that game's lock, from loading the
//! record through persisting it and fanning out the result. Two commands on
//! the same game are therefore strictly ordered, and the second one sees the
//! first one's effect when it checks whose turn it is.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chess_core::{Color, EndReason, MoveOutcome};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error, info, warn};

use crate::error::{ServerError, INCORRECT_PLAYER, NOT_A_PARTICIPANT};
use crate::protocol::{CommandKind, ServerMessage, UserGameCommand};
use crate::registry::{Connection, SessionRegistry};
use crate::store::{AuthLookup, GameId, GameRecord, GameStore, MemoryStore};

/// One async mutex per game id. An entry lives only while some command holds
/// or waits for it.
#[derive(Debug, Default)]
struct GameLocks {
    locks: Mutex<HashMap<GameId, Arc<tokio::sync::Mutex<()>>>>,
}

impl GameLocks {
    async fn acquire(&self, game_id: GameId) -> GameGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(game_id).or_default().clone()
        };
        let guard = lock.clone().lock_owned().await;
        GameGuard {
            table: self,
            game_id,
            lock,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Held for the duration of one command. Dropping it releases the game and
/// removes the table entry when nobody else is queued on it.
struct GameGuard<'a> {
    table: &'a GameLocks,
    game_id: GameId,
    lock: Arc<tokio::sync::Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for GameGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.table.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // the table's clone plus ours
        if Arc::strong_count(&self.lock) == 2
            && locks
                .get(&self.game_id)
                .is_some_and(|entry| Arc::ptr_eq(entry, &self.lock))
        {
            locks.remove(&self.game_id);
        }
    }
}

/// Everything a command handler needs, built once at startup and shared by
/// all connections.
pub struct ServerContext {
    registry: SessionRegistry,
    auth: Arc<dyn AuthLookup>,
    games: Arc<dyn GameStore>,
    locks: GameLocks,
}

impl ServerContext {
    pub fn new(auth: Arc<dyn AuthLookup>, games: Arc<dyn GameStore>) -> Self {
        ServerContext {
            registry: SessionRegistry::new(),
            auth,
            games,
            locks: GameLocks::default(),
        }
    }

    pub fn with_memory_store(store: Arc<MemoryStore>) -> Self {
        Self::new(store.clone(), store)
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Parses one raw text frame and handles it. Malformed input is answered
    /// with an `ERROR` to the sender only.
    pub async fn handle_text(&self, conn: &Connection, text: &str) {
        match serde_json::from_str::<UserGameCommand>(text) {
            Ok(command) => self.handle_command(conn, command).await,
            Err(e) => {
                debug!(connection = %conn.id(), error = %e, "unparseable command");
                let err = ServerError::MalformedCommand(e.to_string());
                conn.deliver(ServerMessage::error(err.to_string()));
            }
        }
    }

    /// Runs `command` for `conn`. Any refusal is unicast back as an `ERROR`;
    /// game state and other sessions are untouched by it.
    pub async fn handle_command(&self, conn: &Connection, command: UserGameCommand) {
        debug!(
            connection = %conn.id(),
            kind = ?command.kind,
            game_id = command.game_id,
            "received command"
        );
        if let Err(err) = self.dispatch(conn, &command).await {
            match &err {
                ServerError::StoreUnavailable(source) => {
                    error!(game_id = command.game_id, error = %source, "store failure")
                }
                other => debug!(connection = %conn.id(), error = %other, "command refused"),
            }
            conn.deliver(ServerMessage::error(err.to_string()));
        }
    }

    async fn dispatch(&self, conn: &Connection, command: &UserGameCommand) -> Result<(), ServerError> {
        let username = self
            .auth
            .find_auth(&command.auth_token)?
            .ok_or(ServerError::Unauthorized)?;

        // Unknown ids never get a lock entry.
        if self.games.find_game(command.game_id)?.is_none() {
            return Err(ServerError::GameNotFound);
        }
        let _guard = self.locks.acquire(command.game_id).await;

        let record = self
            .games
            .find_game(command.game_id)?
            .ok_or(ServerError::GameNotFound)?;

        match command.kind {
            CommandKind::JoinPlayer => self.join_player(conn, &username, record, command.player_color),
            CommandKind::JoinObserver => self.join_observer(conn, &username, record),
            CommandKind::MakeMove => self.make_move(conn, &username, record, command),
            CommandKind::Leave => self.leave(conn, &username, &record),
            CommandKind::Resign => self.resign(conn, &username, record),
        }
    }

    fn join_player(
        &self,
        conn: &Connection,
        username: &str,
        record: GameRecord,
        color: Option<Color>,
    ) -> Result<(), ServerError> {
        let color = color.ok_or(ServerError::NotParticipant(INCORRECT_PLAYER))?;
        if record.username_for(color) != Some(username) {
            return Err(ServerError::NotParticipant(INCORRECT_PLAYER));
        }

        self.registry.add_session(record.id, conn);
        conn.deliver(ServerMessage::load_game(record.game));
        self.registry.broadcast(
            record.id,
            &ServerMessage::notification(format!("{username} joined playing color {}.", color.name())),
            Some(conn.id()),
        );
        info!(game_id = record.id, %username, color = color.name(), "player joined");
        Ok(())
    }

    fn join_observer(
        &self,
        conn: &Connection,
        username: &str,
        record: GameRecord,
    ) -> Result<(), ServerError> {
        self.registry.add_session(record.id, conn);
        conn.deliver(ServerMessage::load_game(record.game));
        self.registry.broadcast(
            record.id,
            &ServerMessage::notification(format!("{username} is now watching the game")),
            Some(conn.id()),
        );
        info!(game_id = record.id, %username, "observer joined");
        Ok(())
    }

    fn make_move(
        &self,
        conn: &Connection,
        username: &str,
        mut record: GameRecord,
        command: &UserGameCommand,
    ) -> Result<(), ServerError> {
        if !record.is_participant(username) {
            return Err(ServerError::NotParticipant(NOT_A_PARTICIPANT));
        }
        if !record.game.is_active() {
            return Err(ServerError::GameEnded);
        }
        if record.username_for(record.game.turn()) != Some(username) {
            return Err(ServerError::NotYourTurn);
        }
        let mv = command
            .mv
            .ok_or_else(|| ServerError::MalformedCommand("MAKE_MOVE without a move".into()))?;

        // Played on a copy; the stored record stays authoritative until the
        // update below succeeds.
        let mut game = record.game.clone();
        let outcome = game.make_move(mv)?;
        record.game = game;
        self.games.update_game(&record)?;

        let text = format!("{username} makes move {mv}{}", annotation(username, &outcome));
        let state = ServerMessage::load_game(record.game);
        self.registry.broadcast(record.id, &state, Some(conn.id()));
        conn.deliver(state);
        self.registry
            .broadcast(record.id, &ServerMessage::notification(text), Some(conn.id()));

        info!(game_id = record.id, %username, %mv, "move played");
        if let Some(reason) = outcome.ended {
            info!(game_id = record.id, ?reason, "game over");
        }
        Ok(())
    }

    fn leave(&self, conn: &Connection, username: &str, record: &GameRecord) -> Result<(), ServerError> {
        self.registry.remove_session(record.id, conn.id());
        let text = if record.is_participant(username) {
            format!("{username} has left the game")
        } else {
            format!("{username} is no longer watching")
        };
        self.registry
            .broadcast(record.id, &ServerMessage::notification(text), Some(conn.id()));
        info!(game_id = record.id, %username, "left game");
        Ok(())
    }

    fn resign(&self, conn: &Connection, username: &str, mut record: GameRecord) -> Result<(), ServerError> {
        let color = record
            .color_of(username)
            .ok_or(ServerError::NotParticipant(NOT_A_PARTICIPANT))?;
        if !record.game.is_active() {
            return Err(ServerError::GameEnded);
        }

        record.game.resign(color)?;
        if let Err(e) = self.games.update_game(&record) {
            warn!(game_id = record.id, error = %e, "resignation not persisted");
            return Err(e.into());
        }

        let text = match record.opponent_of(color) {
            Some(opponent) => format!("{username} has resigned. {opponent} wins!"),
            None => format!("{username} has resigned."),
        };
        self.registry
            .broadcast(record.id, &ServerMessage::notification(text), Some(conn.id()));
        conn.deliver(ServerMessage::notification("You have resigned."));
        info!(game_id = record.id, %username, "resigned");
        Ok(())
    }
}

/// Suffix for a move notification, e.g. `" Check."`.
fn annotation(mover: &str, outcome: &MoveOutcome) -> String {
    match outcome.ended {
        Some(EndReason::Checkmate) => format!(" Checkmate. {mover} wins!"),
        Some(EndReason::Stalemate) => " The game ends in a stalemate.".to_string(),
        Some(EndReason::FiftyMoveRule) => " The game is drawn by the fifty-move rule.".to_string(),
        Some(EndReason::Resignation) | None if outcome.check => " Check.".to_string(),
        Some(EndReason::Resignation) | None => String::new(),
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod dispatcher_tests;
