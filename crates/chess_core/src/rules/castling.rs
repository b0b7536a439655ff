use serde::{Deserialize, Serialize};

use super::SpecialRule;
use crate::{board::Board, error::ChessError, movegen::is_in_check, types::*};

const KING_COLUMN: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastlingSide {
    KingSide,
    QueenSide,
}

impl CastlingSide {
    pub const BOTH: [CastlingSide; 2] = [CastlingSide::KingSide, CastlingSide::QueenSide];

    pub fn rook_column(self) -> u8 {
        match self {
            CastlingSide::KingSide => 8,
            CastlingSide::QueenSide => 1,
        }
    }

    /// Column step from the king toward this side's rook.
    fn step(self) -> i8 {
        match self {
            CastlingSide::KingSide => 1,
            CastlingSide::QueenSide => -1,
        }
    }

    /// Columns strictly between king and rook.
    fn between(self) -> &'static [u8] {
        match self {
            CastlingSide::KingSide => &[6, 7],
            CastlingSide::QueenSide => &[2, 3, 4],
        }
    }
}

/// Per-side, per-wing eligibility flags. Each flag only ever goes from
/// `true` to `false`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        white_king_side: true,
        white_queen_side: true,
        black_king_side: true,
        black_queen_side: true,
    };

    pub const NONE: CastlingRights = CastlingRights {
        white_king_side: false,
        white_queen_side: false,
        black_king_side: false,
        black_queen_side: false,
    };

    pub fn get(&self, c: Color, side: CastlingSide) -> bool {
        match (c, side) {
            (Color::White, CastlingSide::KingSide) => self.white_king_side,
            (Color::White, CastlingSide::QueenSide) => self.white_queen_side,
            (Color::Black, CastlingSide::KingSide) => self.black_king_side,
            (Color::Black, CastlingSide::QueenSide) => self.black_queen_side,
        }
    }

    pub fn revoke(&mut self, c: Color, side: CastlingSide) {
        let flag = match (c, side) {
            (Color::White, CastlingSide::KingSide) => &mut self.white_king_side,
            (Color::White, CastlingSide::QueenSide) => &mut self.white_queen_side,
            (Color::Black, CastlingSide::KingSide) => &mut self.black_king_side,
            (Color::Black, CastlingSide::QueenSide) => &mut self.black_queen_side,
        };
        *flag = false;
    }

    /// Rights consistent with what actually stands on the home squares.
    pub fn from_board(board: &Board) -> Self {
        let mut rights = CastlingRights::ALL;
        for c in [Color::White, Color::Black] {
            for side in CastlingSide::BOTH {
                if !pieces_at_home(board, c, side) {
                    rights.revoke(c, side);
                }
            }
        }
        rights
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        CastlingRights::ALL
    }
}

fn home(c: Color, column: u8) -> Option<Position> {
    Position::new(c.home_row() as i32, column as i32).ok()
}

fn pieces_at_home(board: &Board, c: Color, side: CastlingSide) -> bool {
    let king = home(c, KING_COLUMN).and_then(|p| board.piece_at(p));
    let rook = home(c, side.rook_column()).and_then(|p| board.piece_at(p));
    king == Some(Piece::new(c, PieceKind::King)) && rook == Some(Piece::new(c, PieceKind::Rook))
}

/// Castling: the king moves two squares toward a rook, which jumps over it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Castling {
    rights: CastlingRights,
}

impl Castling {
    pub fn new(rights: CastlingRights) -> Self {
        Self { rights }
    }

    pub fn rights(&self) -> CastlingRights {
        self.rights
    }

    fn castle_move(board: &Board, c: Color, side: CastlingSide) -> Option<Move> {
        if !pieces_at_home(board, c, side) {
            return None;
        }
        for &col in side.between() {
            if board.piece_at(home(c, col)?).is_some() {
                return None;
            }
        }
        if is_in_check(board, c) {
            return None;
        }

        // King may not pass through or land on an attacked square.
        let king_from = home(c, KING_COLUMN)?;
        let transit = king_from.offset(0, side.step())?;
        let dest = king_from.offset(0, 2 * side.step())?;
        for sq in [transit, dest] {
            let mut probe = board.clone();
            probe.relocate(king_from, sq);
            if is_in_check(&probe, c) {
                return None;
            }
        }
        Some(Move::new(king_from, dest))
    }
}

impl SpecialRule for Castling {
    fn candidate_moves(&self, board: &Board, from: Position) -> Vec<Move> {
        let pc = match board.piece_at(from) {
            Some(p) if p.kind == PieceKind::King => p,
            _ => return Vec::new(),
        };
        if home(pc.color, KING_COLUMN) != Some(from) {
            return Vec::new();
        }
        CastlingSide::BOTH
            .into_iter()
            .filter(|&side| self.rights.get(pc.color, side))
            .filter_map(|side| Self::castle_move(board, pc.color, side))
            .collect()
    }

    fn matches(&self, board: &Board, mv: &Move) -> bool {
        board
            .piece_at(mv.start)
            .is_some_and(|p| p.kind == PieceKind::King)
            && mv.start.row() == mv.end.row()
            && mv.start.column().abs_diff(mv.end.column()) == 2
    }

    fn perform(&self, board: &mut Board, mv: &Move) -> Result<Option<Piece>, ChessError> {
        if mv.promotion.is_some() || !self.matches(board, mv) {
            return Err(ChessError::invalid_move("not a valid castling move"));
        }
        let row = mv.end.row() as i32;
        let rook_col = if mv.start.column() > mv.end.column() { 1 } else { 8 };
        let rook_from = Position::new(row, rook_col)?;
        let rook_to = Position::new(row, ((mv.start.column() + mv.end.column()) / 2) as i32)?;
        if board.piece_at(rook_from).is_none_or(|p| p.kind != PieceKind::Rook) {
            return Err(ChessError::invalid_move("no rook to castle with"));
        }

        board.relocate(rook_from, rook_to);
        board.relocate(mv.start, mv.end);
        Ok(None)
    }

    fn after_move(&mut self, mv: &Move, moved: Piece, _board: &Board) {
        if moved.kind == PieceKind::King {
            for side in CastlingSide::BOTH {
                self.rights.revoke(moved.color, side);
            }
        }
        // A rook leaving its corner, or anything landing on it, ends that right.
        for c in [Color::White, Color::Black] {
            for side in CastlingSide::BOTH {
                let corner = home(c, side.rook_column());
                if corner == Some(mv.start) || corner == Some(mv.end) {
                    self.rights.revoke(c, side);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "castling_tests.rs"]
mod castling_tests;
