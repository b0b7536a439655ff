//! Real-time session layer for chess games.
//!
//! Clients send [`UserGameCommand`]s over a WebSocket; the
//! [`ServerContext`] checks identity and seat, applies the command to the
//! game through `chess_core`, persists it, and fans the result out to every
//! connection registered on that game.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod store;
pub mod ws;

pub use config::{GameFixture, ServerConfig, UserFixture};
pub use dispatcher::ServerContext;
pub use error::{ConfigError, ServerError, StoreError};
pub use protocol::{CommandKind, ServerMessage, UserGameCommand};
pub use registry::{Connection, ConnectionId, SessionRegistry};
pub use store::{AuthLookup, GameId, GameRecord, GameStore, MemoryStore};
