//! Chess rules engine.
//!
//! Pseudo-legal generation per piece kind, castling and en passant as
//! self-contained compound rules, and a [`Game`] state machine that filters
//! candidates by simulating them on a copy of the board.

pub mod board;
pub mod error;
pub mod game;
pub mod movegen;
pub mod notation;
pub mod perft;
pub mod rules;
pub mod types;

// Re-export core game logic
pub use board::*;
pub use error::ChessError;
pub use game::*;
pub use movegen::*;
pub use perft::{perft, perft_divide};
pub use rules::{Castling, CastlingRights, CastlingSide, EnPassant, SpecialRule};
pub use types::*;
