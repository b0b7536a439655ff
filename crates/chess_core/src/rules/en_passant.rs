use serde::{Deserialize, Serialize};

use super::SpecialRule;
use crate::{board::Board, error::ChessError, types::*};

/// En passant: a pawn that just advanced two squares may be captured, for one
/// ply only, as if it had advanced a single square.
///
/// The stored target is the square the pawn passed over, which is where the
/// capturing pawn lands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnPassant {
    target: Option<Position>,
}

impl EnPassant {
    pub fn new(target: Option<Position>) -> Self {
        Self { target }
    }

    pub fn target(&self) -> Option<Position> {
        self.target
    }

    /// Square of the pawn that can be taken, given the capturing move.
    fn victim_square(mv: &Move) -> Option<Position> {
        Position::new(mv.start.row() as i32, mv.end.column() as i32).ok()
    }
}

impl SpecialRule for EnPassant {
    fn candidate_moves(&self, board: &Board, from: Position) -> Vec<Move> {
        let target = match self.target {
            Some(t) => t,
            None => return Vec::new(),
        };
        let pc = match board.piece_at(from) {
            Some(p) if p.kind == PieceKind::Pawn => p,
            _ => return Vec::new(),
        };
        let ahead_row = from.offset(pc.color.forward(), 0).map(|p| p.row());
        if from.column().abs_diff(target.column()) != 1 || ahead_row != Some(target.row()) {
            return Vec::new();
        }

        // The double-stepped pawn sits beside us, on the capturer's row.
        let mv = Move::new(from, target);
        let victim = Self::victim_square(&mv).and_then(|sq| board.piece_at(sq));
        if victim == Some(Piece::new(pc.color.other(), PieceKind::Pawn)) {
            vec![mv]
        } else {
            Vec::new()
        }
    }

    fn matches(&self, board: &Board, mv: &Move) -> bool {
        board
            .piece_at(mv.start)
            .is_some_and(|p| p.kind == PieceKind::Pawn)
            && mv.start.column() != mv.end.column()
            && board.piece_at(mv.end).is_none()
    }

    fn perform(&self, board: &mut Board, mv: &Move) -> Result<Option<Piece>, ChessError> {
        if self.target != Some(mv.end) || mv.promotion.is_some() || !self.matches(board, mv) {
            return Err(ChessError::invalid_move("invalid en passant move"));
        }
        let victim_sq = Self::victim_square(mv)
            .ok_or_else(|| ChessError::invalid_move("invalid en passant move"))?;
        let captured = board.piece_at(victim_sq);
        if captured.is_none_or(|p| p.kind != PieceKind::Pawn) {
            return Err(ChessError::invalid_move("no pawn to capture en passant"));
        }

        board.set_piece(victim_sq, None);
        board.relocate(mv.start, mv.end);
        Ok(captured)
    }

    fn after_move(&mut self, mv: &Move, moved: Piece, _board: &Board) {
        self.target = None;
        if moved.kind == PieceKind::Pawn && mv.start.row().abs_diff(mv.end.row()) == 2 {
            self.target = mv.start.offset(moved.color.forward(), 0);
        }
    }
}

#[cfg(test)]
#[path = "en_passant_tests.rs"]
mod en_passant_tests;
