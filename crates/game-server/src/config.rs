use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, StoreError};
use crate::store::{GameId, GameRecord, MemoryStore};

/// Server settings, read from TOML. Every field has a default, so an empty
/// file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Route the WebSocket upgrade is served on.
    pub ws_path: String,
    /// Messages queued per connection before further ones are dropped.
    pub outbound_buffer: usize,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub users: Vec<UserFixture>,
    pub games: Vec<GameFixture>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFixture {
    pub auth_token: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFixture {
    pub id: GameId,
    pub name: String,
    #[serde(default)]
    pub white: Option<String>,
    #[serde(default)]
    pub black: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            ws_path: "/ws".to_string(),
            outbound_buffer: 64,
            log_filter: "info".to_string(),
            users: Vec::new(),
            games: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.outbound_buffer == 0 {
            return Err(ConfigError::Invalid("outbound_buffer must be at least 1".into()));
        }
        if !self.ws_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "ws_path '{}' must start with '/'",
                self.ws_path
            )));
        }
        let mut ids: Vec<GameId> = self.games.iter().map(|g| g.id).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ConfigError::Invalid(format!("duplicate game id {}", pair[0])));
        }
        Ok(())
    }

    /// Loads the fixture users and games into `store`. Every game starts from
    /// the standard position.
    pub fn seed(&self, store: &MemoryStore) -> Result<(), StoreError> {
        for user in &self.users {
            store.insert_auth(&user.auth_token, &user.username)?;
        }
        for fixture in &self.games {
            let record = GameRecord {
                white_username: fixture.white.clone(),
                black_username: fixture.black.clone(),
                ..GameRecord::new(fixture.id, &fixture.name)
            };
            store.insert_game(&record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
