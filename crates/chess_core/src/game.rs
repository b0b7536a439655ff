//! The game state machine: board, turn, compound-rule state and clocks.
//!
//! Legality is decided by playing each candidate on a disposable copy of the
//! board and asking whether the mover's king is then in check. The live board
//! is only ever written once a move has been fully validated.

use serde::{Deserialize, Serialize};

use crate::{
    board::Board,
    error::ChessError,
    movegen::{is_in_check, pseudo_moves_into},
    rules::{Castling, CastlingRights, EnPassant, SpecialRule},
    types::*,
};

/// Half-moves without a capture or pawn move after which the game is drawn.
pub const FIFTY_MOVE_LIMIT: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndReason {
    Checkmate,
    Stalemate,
    /// Drawn by the half-move clock, kept apart from a true stalemate.
    FiftyMoveRule,
    Resignation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Active,
    Ended {
        reason: EndReason,
        winner: Option<Color>,
    },
}

/// What a successful [`Game::make_move`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved: Piece,
    pub captured: Option<Piece>,
    /// Whether the side now to move is in check.
    pub check: bool,
    /// Set when this move ended the game.
    pub ended: Option<EndReason>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub(crate) board: Board,
    pub(crate) turn: Color,
    pub(crate) status: GameStatus,
    pub(crate) castling: Castling,
    pub(crate) en_passant: EnPassant,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Standard starting position, White to move, all castling rights held.
    pub fn new() -> Self {
        Game {
            board: Board::startpos(),
            turn: Color::White,
            status: GameStatus::Active,
            castling: Castling::new(CastlingRights::ALL),
            en_passant: EnPassant::default(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// A game on an arbitrary board. Castling rights are granted wherever
    /// king and rook stand on their home squares; no en passant target.
    pub fn from_board(board: Board, turn: Color) -> Self {
        let castling = Castling::new(CastlingRights::from_board(&board));
        let mut game = Game {
            board,
            turn,
            status: GameStatus::Active,
            castling,
            en_passant: EnPassant::default(),
            halfmove_clock: 0,
            fullmove_number: 1,
        };
        game.status = game.evaluate_status();
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn turn(&self) -> Color {
        self.turn
    }
    pub fn status(&self) -> GameStatus {
        self.status
    }
    pub fn is_active(&self) -> bool {
        self.status == GameStatus::Active
    }
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling.rights()
    }
    pub fn en_passant_target(&self) -> Option<Position> {
        self.en_passant.target()
    }
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn winner(&self) -> Option<Color> {
        match self.status {
            GameStatus::Active => None,
            GameStatus::Ended { winner, .. } => winner,
        }
    }

    fn rules(&self) -> [&dyn SpecialRule; 2] {
        [&self.castling, &self.en_passant]
    }

    /// Legal moves for the piece on `pos`, whichever side it belongs to.
    ///
    /// `None` if the square is empty.
    pub fn valid_moves(&self, pos: Position) -> Option<Vec<Move>> {
        let piece = self.board.piece_at(pos)?;

        let mut moves = Vec::with_capacity(32);
        pseudo_moves_into(&self.board, pos, &mut moves);
        for rule in self.rules() {
            moves.extend(rule.candidate_moves(&self.board, pos));
        }

        moves.retain(|mv| self.is_legal(mv, piece.color));
        Some(moves)
    }

    /// Every legal move for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.legal_moves_for(self.turn)
    }

    pub fn legal_moves_for(&self, c: Color) -> Vec<Move> {
        self.board
            .pieces()
            .filter(|(_, pc)| pc.color == c)
            .filter_map(|(pos, _)| self.valid_moves(pos))
            .flatten()
            .collect()
    }

    fn has_legal_move(&self, c: Color) -> bool {
        self.board
            .pieces()
            .filter(|(_, pc)| pc.color == c)
            .any(|(pos, _)| self.valid_moves(pos).is_some_and(|m| !m.is_empty()))
    }

    /// Simulates `mv` on a copy of the board and checks the mover's king.
    fn is_legal(&self, mv: &Move, mover: Color) -> bool {
        let mut scratch = self.board.clone();
        match self.play_on(&mut scratch, mv) {
            Ok(_) => !is_in_check(&scratch, mover),
            Err(_) => false,
        }
    }

    /// Executes `mv` on `board`: through the compound rule that claims it,
    /// otherwise as a plain relocation with optional promotion.
    fn play_on(&self, board: &mut Board, mv: &Move) -> Result<Option<Piece>, ChessError> {
        for rule in self.rules() {
            if rule.matches(board, mv) {
                return rule.perform(board, mv);
            }
        }

        let piece = board
            .piece_at(mv.start)
            .ok_or_else(|| ChessError::invalid_move("no piece at starting position"))?;

        match mv.promotion {
            None => Ok(board.relocate(mv.start, mv.end)),
            Some(kind) => {
                if piece.kind != PieceKind::Pawn {
                    return Err(ChessError::invalid_move("promotion requested for a non-pawn"));
                }
                if mv.end.row() != piece.color.other().home_row() {
                    return Err(ChessError::invalid_move("promotion away from the far rank"));
                }
                if !kind.is_promotion_target() {
                    return Err(ChessError::invalid_move("cannot promote to a king or pawn"));
                }
                let captured = board.relocate(mv.start, mv.end);
                board.set_piece(mv.end, Some(Piece::new(piece.color, kind)));
                Ok(captured)
            }
        }
    }

    /// Plays `mv` for the side to move.
    ///
    /// Rejections leave the game exactly as it was.
    pub fn make_move(&mut self, mv: Move) -> Result<MoveOutcome, ChessError> {
        if !self.is_active() {
            return Err(ChessError::GameEnded);
        }
        let moved = self
            .board
            .piece_at(mv.start)
            .ok_or_else(|| ChessError::invalid_move("no piece at starting position"))?;
        if moved.color != self.turn {
            return Err(ChessError::invalid_move("piece of wrong color for turn"));
        }
        if mv.promotion.is_some_and(|k| !k.is_promotion_target()) {
            return Err(ChessError::invalid_move("cannot promote to a king or pawn"));
        }
        let legal = self.valid_moves(mv.start).unwrap_or_default();
        if !legal.contains(&mv) {
            return Err(ChessError::invalid_move("not a valid move"));
        }

        let mut next = self.board.clone();
        let captured = self.play_on(&mut next, &mv)?;
        self.board = next;

        let rules: [&mut dyn SpecialRule; 2] = [&mut self.castling, &mut self.en_passant];
        for rule in rules {
            rule.after_move(&mv, moved, &self.board);
        }

        if moved.kind == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if self.turn == Color::Black {
            self.fullmove_number += 1;
        }
        self.turn = self.turn.other();

        self.status = self.evaluate_status();
        let ended = match self.status {
            GameStatus::Active => None,
            GameStatus::Ended { reason, .. } => Some(reason),
        };

        Ok(MoveOutcome {
            moved,
            captured,
            check: self.is_in_check(self.turn),
            ended,
        })
    }

    /// Status of the position with `self.turn` to move. Checkmate and
    /// stalemate are decided first; the fifty-move rule only applies to a
    /// position that still has legal moves.
    pub(crate) fn evaluate_status(&self) -> GameStatus {
        let to_move = self.turn;
        if !self.has_legal_move(to_move) {
            return if self.is_in_check(to_move) {
                GameStatus::Ended {
                    reason: EndReason::Checkmate,
                    winner: Some(to_move.other()),
                }
            } else {
                GameStatus::Ended {
                    reason: EndReason::Stalemate,
                    winner: None,
                }
            };
        }
        if self.is_fifty_move_draw() {
            return GameStatus::Ended {
                reason: EndReason::FiftyMoveRule,
                winner: None,
            };
        }
        GameStatus::Active
    }

    /// `c` gives up; the opponent wins.
    pub fn resign(&mut self, c: Color) -> Result<(), ChessError> {
        if !self.is_active() {
            return Err(ChessError::GameEnded);
        }
        self.status = GameStatus::Ended {
            reason: EndReason::Resignation,
            winner: Some(c.other()),
        };
        Ok(())
    }

    pub fn is_in_check(&self, c: Color) -> bool {
        is_in_check(&self.board, c)
    }

    pub fn is_in_checkmate(&self, c: Color) -> bool {
        self.is_in_check(c) && !self.has_legal_move(c)
    }

    /// No legal move and not in check. The fifty-move rule is reported
    /// separately by [`Game::is_fifty_move_draw`].
    pub fn is_in_stalemate(&self, c: Color) -> bool {
        !self.is_in_check(c) && !self.has_legal_move(c)
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= FIFTY_MOVE_LIMIT
    }
}

#[cfg(test)]
#[path = "game_tests.rs"]
mod game_tests;
