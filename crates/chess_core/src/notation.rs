//! Text notations: algebraic squares (`e4`), coordinate moves (`e7e8q`) and
//! Forsyth-Edwards Notation for whole games.

use std::fmt;
use std::str::FromStr;

use crate::{
    board::Board,
    error::ChessError,
    game::Game,
    rules::{Castling, CastlingRights, EnPassant},
    types::*,
};

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.column() - 1) as char;
        write!(f, "{file}{}", self.row())
    }
}

impl FromStr for Position {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b = s.as_bytes();
        if b.len() != 2 {
            return Err(ChessError::InvalidNotation(s.to_string()));
        }
        let f = b[0].to_ascii_lowercase();
        let r = b[1];
        if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) {
            return Err(ChessError::InvalidNotation(s.to_string()));
        }
        Position::new((r - b'0') as i32, (f - b'a' + 1) as i32)
    }
}

fn promotion_char(kind: PieceKind) -> char {
    match kind {
        PieceKind::Queen => 'q',
        PieceKind::Rook => 'r',
        PieceKind::Bishop => 'b',
        PieceKind::Knight => 'n',
        PieceKind::King => 'k',
        PieceKind::Pawn => 'p',
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.end)?;
        if let Some(p) = self.promotion {
            write!(f, "{}", promotion_char(p))?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = ChessError;

    /// Parses `e2e4` or `e7e8q`. Any piece letter is accepted as a promotion
    /// here; the game rejects kings and pawns when the move is played.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(ChessError::InvalidNotation(s.to_string()));
        }
        let start: Position = s[0..2].parse()?;
        let end: Position = s[2..4].parse()?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(ch) => Some(
                Piece::from_symbol(ch)
                    .ok_or_else(|| ChessError::InvalidNotation(s.to_string()))?
                    .kind,
            ),
        };
        Ok(Move {
            start,
            end,
            promotion,
        })
    }
}

impl Game {
    /// Builds a game from a FEN record. The half-move clock and full-move
    /// number fields are optional and default to `0` and `1`.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let bad = |what: &str| ChessError::InvalidFen(format!("{what} in '{fen}'"));

        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(bad("expected at least 4 fields"));
        }
        let halfmove_part = parts.get(4).copied().unwrap_or("0");
        let fullmove_part = parts.get(5).copied().unwrap_or("1");

        let mut board = Board::empty();
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(bad("board section needs 8 ranks"));
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let row = 8 - rank_idx as i32; // FEN lists rank 8 .. 1
            let mut column: i32 = 1;
            for ch in rank_str.chars() {
                if let Some(d) = ch.to_digit(10) {
                    column += d as i32;
                } else {
                    let pc = Piece::from_symbol(ch).ok_or_else(|| bad("invalid piece letter"))?;
                    let pos = Position::new(row, column).map_err(|_| bad("too many files"))?;
                    board.set_piece(pos, Some(pc));
                    column += 1;
                }
                if column > 9 {
                    return Err(bad("too many files"));
                }
            }
            if column != 9 {
                return Err(bad("wrong number of files"));
            }
        }

        let turn = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(bad("invalid side to move")),
        };

        let mut rights = CastlingRights::NONE;
        if parts[2] != "-" {
            for c in parts[2].chars() {
                match c {
                    'K' => rights.white_king_side = true,
                    'Q' => rights.white_queen_side = true,
                    'k' => rights.black_king_side = true,
                    'q' => rights.black_queen_side = true,
                    _ => return Err(bad("invalid castling field")),
                }
            }
        }

        let en_passant = match parts[3] {
            "-" => None,
            sq => Some(sq.parse::<Position>().map_err(|_| bad("invalid en passant square"))?),
        };

        let halfmove_clock = halfmove_part
            .parse()
            .map_err(|_| bad("invalid halfmove clock"))?;
        let fullmove_number = fullmove_part
            .parse()
            .map_err(|_| bad("invalid fullmove number"))?;

        let mut game = Game::from_board(board, turn);
        game.castling = Castling::new(rights);
        game.en_passant = EnPassant::new(en_passant);
        game.halfmove_clock = halfmove_clock;
        game.fullmove_number = fullmove_number;
        game.status = game.evaluate_status();
        Ok(game)
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::new();
        for row in (1..=8).rev() {
            let mut empty = 0;
            for column in 1..=8 {
                let pc = Position::new(row, column)
                    .ok()
                    .and_then(|pos| self.board.piece_at(pos));
                match pc {
                    Some(pc) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(pc.symbol());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if row > 1 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.turn {
            Color::White => 'w',
            Color::Black => 'b',
        });

        let r = self.castling.rights();
        let mut castle = String::new();
        for (held, ch) in [
            (r.white_king_side, 'K'),
            (r.white_queen_side, 'Q'),
            (r.black_king_side, 'k'),
            (r.black_queen_side, 'q'),
        ] {
            if held {
                castle.push(ch);
            }
        }
        if castle.is_empty() {
            castle.push('-');
        }

        let ep = self
            .en_passant
            .target()
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{out} {castle} {ep} {} {}",
            self.halfmove_clock, self.fullmove_number
        )
    }
}

#[cfg(test)]
#[path = "notation_tests.rs"]
mod notation_tests;
