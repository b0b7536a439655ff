//! Which connections are watching which game.
//!
//! The registry only fans messages out. It holds a sending half of each
//! connection's outbound queue and never looks at game state.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::protocol::ServerMessage;
use crate::store::GameId;

pub type ConnectionId = Uuid;

/// Handle to one client's outbound queue. The transport owns the receiving
/// end; cloning the handle is cheap.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    tx: mpsc::Sender<ServerMessage>,
}

impl Connection {
    pub fn new(tx: mpsc::Sender<ServerMessage>) -> Self {
        Connection {
            id: Uuid::new_v4(),
            tx,
        }
    }

    /// A connection together with the queue its writer drains.
    ///
    /// `buffer` must be non-zero.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Connection::new(tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Queues `msg` without waiting. Returns whether it was queued; a closed
    /// or backed-up connection drops the message.
    pub fn deliver(&self, msg: ServerMessage) -> bool {
        match self.tx.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(connection = %self.id, "outbound queue full, dropping message");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(connection = %self.id, "connection closed, dropping message");
                false
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<GameId, HashMap<ConnectionId, Connection>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `conn` for `game_id`. Adding it twice is a no-op.
    pub fn add_session(&self, game_id: GameId, conn: &Connection) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions
            .entry(game_id)
            .or_default()
            .insert(conn.id, conn.clone());
    }

    /// Removing a connection that is not registered is a no-op.
    pub fn remove_session(&self, game_id: GameId, conn_id: ConnectionId) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(conns) = sessions.get_mut(&game_id) {
            conns.remove(&conn_id);
            if conns.is_empty() {
                sessions.remove(&game_id);
            }
        }
    }

    /// Drops `conn_id` from every game. Returns the games it was watching.
    pub fn remove_connection(&self, conn_id: ConnectionId) -> Vec<GameId> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let mut left = Vec::new();
        sessions.retain(|game_id, conns| {
            if conns.remove(&conn_id).is_some() {
                left.push(*game_id);
            }
            !conns.is_empty()
        });
        left.sort_unstable();
        left
    }

    /// Queues `msg` for every connection on `game_id` except `exclude`.
    /// Returns how many connections accepted it.
    pub fn broadcast(
        &self,
        game_id: GameId,
        msg: &ServerMessage,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        let Some(conns) = sessions.get(&game_id) else {
            return 0;
        };
        conns
            .values()
            .filter(|conn| Some(conn.id) != exclude)
            .filter(|conn| conn.deliver(msg.clone()))
            .count()
    }

    /// Unicast to one registered connection.
    pub fn send(&self, game_id: GameId, conn_id: ConnectionId, msg: ServerMessage) -> bool {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(&game_id)
            .and_then(|conns| conns.get(&conn_id))
            .is_some_and(|conn| conn.deliver(msg))
    }

    pub fn session_count(&self, game_id: GameId) -> usize {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.get(&game_id).map_or(0, |conns| conns.len())
    }

    pub fn clear(&self) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
