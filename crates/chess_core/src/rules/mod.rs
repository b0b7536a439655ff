//! Compound rules layered on top of basic piece movement.
//!
//! Each rule owns only its own ephemeral state and is driven through the same
//! four operations, so [`crate::game::Game`] can treat castling, en passant
//! and any later addition uniformly.

pub mod castling;
pub mod en_passant;

pub use castling::*;
pub use en_passant::*;

use crate::{board::Board, error::ChessError, types::*};

/// Contract shared by every compound rule.
pub trait SpecialRule {
    /// Extra candidate moves this rule contributes for the piece on `from`.
    ///
    /// Candidates may still leave the mover's king in check; the game filters
    /// them through the same legality simulation as ordinary moves.
    fn candidate_moves(&self, board: &Board, from: Position) -> Vec<Move>;

    /// Whether `mv` belongs to this rule and must be executed by it.
    fn matches(&self, board: &Board, mv: &Move) -> bool;

    /// Plays `mv` on `board`, returning the captured piece, if any.
    fn perform(&self, board: &mut Board, mv: &Move) -> Result<Option<Piece>, ChessError>;

    /// Updates ephemeral state after any move, not only this rule's own.
    /// `board` is the position after the move was played.
    fn after_move(&mut self, mv: &Move, moved: Piece, board: &Board);
}
