//! Pseudo-legal move generation.
//!
//! Moves produced here respect each piece's movement shape and board
//! occupancy but may leave the mover's own king in check. Legality filtering
//! and the compound rules (castling, en passant) live in [`crate::game`] and
//! [`crate::rules`].

use crate::{board::Board, types::*};

const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];
const KING_STEPS: [(i8, i8); 8] = [
    (1, 1),
    (1, 0),
    (1, -1),
    (0, 1),
    (0, -1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Pseudo-legal moves for the piece on `from`; empty if the square is empty.
pub fn pseudo_moves(board: &Board, from: Position) -> Vec<Move> {
    let mut out = Vec::with_capacity(32);
    pseudo_moves_into(board, from, &mut out);
    out
}

/// Appends the pseudo-legal moves for the piece on `from` to `out`.
pub fn pseudo_moves_into(board: &Board, from: Position, out: &mut Vec<Move>) {
    let pc = match board.piece_at(from) {
        Some(p) => p,
        None => return,
    };
    match pc.kind {
        PieceKind::Pawn => gen_pawn(board, from, pc.color, out),
        PieceKind::Knight => gen_steps(board, from, pc.color, out, &KNIGHT_JUMPS),
        PieceKind::Bishop => gen_slider(board, from, pc.color, out, &DIAGONALS),
        PieceKind::Rook => gen_slider(board, from, pc.color, out, &ORTHOGONALS),
        PieceKind::Queen => {
            gen_slider(board, from, pc.color, out, &DIAGONALS);
            gen_slider(board, from, pc.color, out, &ORTHOGONALS);
        }
        PieceKind::King => gen_steps(board, from, pc.color, out, &KING_STEPS),
    }
}

/// True iff some enemy piece's pseudo-legal destinations include `c`'s king.
///
/// A board without a king of color `c` is never in check.
pub fn is_in_check(board: &Board, c: Color) -> bool {
    match board.king_position(c) {
        Some(ksq) => is_square_attacked(board, ksq, c.other()),
        None => false,
    }
}

/// True iff a piece of color `by` could move onto `target` as a capture.
///
/// Only meaningful for squares holding a piece of the other color (pawns
/// capture diagonally onto occupied squares only); callers that need to test
/// an empty square place a piece there first.
pub fn is_square_attacked(board: &Board, target: Position, by: Color) -> bool {
    let mut buf = Vec::with_capacity(32);
    board
        .pieces()
        .filter(|(_, pc)| pc.color == by)
        .any(|(pos, _)| {
            buf.clear();
            pseudo_moves_into(board, pos, &mut buf);
            buf.iter().any(|mv| mv.end == target)
        })
}

fn gen_pawn(board: &Board, from: Position, c: Color, out: &mut Vec<Move>) {
    let dir = c.forward();
    let start_row: u8 = match c {
        Color::White => 2,
        Color::Black => 7,
    };
    let promo_row = c.other().home_row();

    // forward 1
    if let Some(to) = from.offset(dir, 0)
        && board.piece_at(to).is_none()
    {
        push_pawn_move(from, to, promo_row, out);

        // forward 2 from start
        if from.row() == start_row
            && let Some(to2) = from.offset(2 * dir, 0)
            && board.piece_at(to2).is_none()
        {
            out.push(Move::new(from, to2));
        }
    }

    // captures
    for dc in [-1, 1] {
        if let Some(to) = from.offset(dir, dc)
            && let Some(tpc) = board.piece_at(to)
            && tpc.color != c
        {
            push_pawn_move(from, to, promo_row, out);
        }
    }
}

fn push_pawn_move(from: Position, to: Position, promo_row: u8, out: &mut Vec<Move>) {
    if to.row() == promo_row {
        for pk in PieceKind::PROMOTIONS {
            out.push(Move::promoting(from, to, pk));
        }
    } else {
        out.push(Move::new(from, to));
    }
}

/// Single-step generator shared by knight and king.
fn gen_steps(board: &Board, from: Position, c: Color, out: &mut Vec<Move>, deltas: &[(i8, i8)]) {
    for &(dr, dc) in deltas {
        if let Some(to) = from.offset(dr, dc) {
            match board.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(pc) if pc.color != c => out.push(Move::new(from, to)),
                _ => {}
            }
        }
    }
}

/// Ray walk: stop at the edge, before a friendly piece, or on an enemy piece.
fn gen_slider(board: &Board, from: Position, c: Color, out: &mut Vec<Move>, dirs: &[(i8, i8)]) {
    for &(dr, dc) in dirs {
        let mut cur = from;
        while let Some(to) = cur.offset(dr, dc) {
            match board.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(pc) if pc.color != c => {
                    out.push(Move::new(from, to));
                    break;
                }
                _ => break,
            }
            cur = to;
        }
    }
}

#[cfg(test)]
#[path = "movegen_tests.rs"]
mod movegen_tests;
