use serde::{Deserialize, Serialize};

use crate::types::*;

/// 8x8 grid of optional pieces, indexed `[row - 1][column - 1]`.
///
/// `Clone` is a deep copy: the grid is plain data, so mutating a clone never
/// touches the original. Hypothetical moves are always played on a clone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<Piece>; 8]; 8],
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn startpos() -> Self {
        let mut b = Board::empty();

        // Back ranks
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (c, &kind) in back.iter().enumerate() {
            b.cells[0][c] = Some(Piece::new(Color::White, kind));
            b.cells[7][c] = Some(Piece::new(Color::Black, kind));
        }
        // Pawns
        for c in 0..8 {
            b.cells[1][c] = Some(Piece::new(Color::White, PieceKind::Pawn));
            b.cells[6][c] = Some(Piece::new(Color::Black, PieceKind::Pawn));
        }
        b
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        let (r, c) = pos.idx();
        self.cells[r][c]
    }

    pub fn set_piece(&mut self, pos: Position, pc: Option<Piece>) {
        let (r, c) = pos.idx();
        self.cells[r][c] = pc;
    }

    /// Moves whatever stands on `from` to `to`, returning what `to` held.
    pub fn relocate(&mut self, from: Position, to: Position) -> Option<Piece> {
        let moving = self.piece_at(from);
        let captured = self.piece_at(to);
        self.set_piece(from, None);
        self.set_piece(to, moving);
        captured
    }

    pub fn king_position(&self, c: Color) -> Option<Position> {
        self.pieces()
            .find(|(_, pc)| pc.color == c && pc.kind == PieceKind::King)
            .map(|(pos, _)| pos)
    }

    /// Every occupied square with its piece.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(|pos| self.piece_at(pos).map(|pc| (pos, pc)))
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
