//! Collaborator interfaces for identity lookup and the game catalog, plus an
//! in-memory implementation of both.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chess_core::{Color, Game};

use crate::error::StoreError;

pub type GameId = u32;

/// `authToken → username`.
pub trait AuthLookup: Send + Sync {
    fn find_auth(&self, auth_token: &str) -> Result<Option<String>, StoreError>;
}

pub trait GameStore: Send + Sync {
    fn find_game(&self, id: GameId) -> Result<Option<GameRecord>, StoreError>;

    /// Fails with [`StoreError::UnknownGame`] if `record.id` was never inserted.
    fn update_game(&self, record: &GameRecord) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub id: GameId,
    pub white_username: Option<String>,
    pub black_username: Option<String>,
    pub name: String,
    pub game: Game,
}

impl GameRecord {
    pub fn new(id: GameId, name: impl Into<String>) -> Self {
        GameRecord {
            id,
            white_username: None,
            black_username: None,
            name: name.into(),
            game: Game::new(),
        }
    }

    pub fn username_for(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white_username.as_deref(),
            Color::Black => self.black_username.as_deref(),
        }
    }

    pub fn is_participant(&self, username: &str) -> bool {
        self.username_for(Color::White) == Some(username)
            || self.username_for(Color::Black) == Some(username)
    }

    /// The color `username` plays. Someone holding both seats plays
    /// whichever side is to move.
    pub fn color_of(&self, username: &str) -> Option<Color> {
        let white = self.username_for(Color::White) == Some(username);
        let black = self.username_for(Color::Black) == Some(username);
        match (white, black) {
            (true, true) => Some(self.game.turn()),
            (true, false) => Some(Color::White),
            (false, true) => Some(Color::Black),
            (false, false) => None,
        }
    }

    /// Username seated opposite `color`, if anyone is.
    pub fn opponent_of(&self, color: Color) -> Option<&str> {
        self.username_for(color.other())
    }
}

/// A record as kept by [`MemoryStore`]: the game state is held in its
/// serialized form, so every load is a fresh deserialization.
#[derive(Debug, Clone)]
struct StoredGame {
    white_username: Option<String>,
    black_username: Option<String>,
    name: String,
    state: String,
}

impl StoredGame {
    fn encode(record: &GameRecord) -> Result<Self, StoreError> {
        Ok(StoredGame {
            white_username: record.white_username.clone(),
            black_username: record.black_username.clone(),
            name: record.name.clone(),
            state: serde_json::to_string(&record.game)?,
        })
    }

    fn decode(&self, id: GameId) -> Result<GameRecord, StoreError> {
        Ok(GameRecord {
            id,
            white_username: self.white_username.clone(),
            black_username: self.black_username.clone(),
            name: self.name.clone(),
            game: serde_json::from_str(&self.state)?,
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    auths: RwLock<HashMap<String, String>>,
    games: RwLock<HashMap<GameId, StoredGame>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read()
        .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_auth(
        &self,
        auth_token: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<(), StoreError> {
        write(&self.auths)?.insert(auth_token.into(), username.into());
        Ok(())
    }

    /// Inserts or replaces the record with `record.id`.
    pub fn insert_game(&self, record: &GameRecord) -> Result<(), StoreError> {
        let stored = StoredGame::encode(record)?;
        write(&self.games)?.insert(record.id, stored);
        Ok(())
    }

    pub fn game_count(&self) -> Result<usize, StoreError> {
        Ok(read(&self.games)?.len())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        write(&self.auths)?.clear();
        write(&self.games)?.clear();
        Ok(())
    }
}

impl AuthLookup for MemoryStore {
    fn find_auth(&self, auth_token: &str) -> Result<Option<String>, StoreError> {
        Ok(read(&self.auths)?.get(auth_token).cloned())
    }
}

impl GameStore for MemoryStore {
    fn find_game(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        read(&self.games)?
            .get(&id)
            .map(|stored| stored.decode(id))
            .transpose()
    }

    fn update_game(&self, record: &GameRecord) -> Result<(), StoreError> {
        let stored = StoredGame::encode(record)?;
        let mut games = write(&self.games)?;
        match games.get_mut(&record.id) {
            Some(slot) => {
                *slot = stored;
                Ok(())
            }
            None => Err(StoreError::UnknownGame(record.id)),
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
