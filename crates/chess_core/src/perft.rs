use crate::game::Game;

/// Pure perft node count.
/// Counts all legal move sequences of length `depth` from the current game.
///
/// Every child is played on its own copy of the game, so the input is never
/// touched.
pub fn perft(game: &Game, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = game.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for mv in moves {
        let mut child = game.clone();
        if child.make_move(mv).is_ok() {
            nodes += perft(&child, depth - 1);
        }
    }
    nodes
}

/// Node count per root move, for locating generator bugs against a
/// reference engine.
pub fn perft_divide(game: &Game, depth: u8) -> Vec<(String, u64)> {
    let mut out: Vec<(String, u64)> = game
        .legal_moves()
        .into_iter()
        .map(|mv| {
            let mut child = game.clone();
            let nodes = match child.make_move(mv) {
                Ok(_) => perft(&child, depth.saturating_sub(1)),
                Err(_) => 0,
            };
            (mv.to_string(), nodes)
        })
        .collect();
    out.sort();
    out
}
