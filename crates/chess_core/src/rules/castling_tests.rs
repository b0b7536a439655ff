use super::*;

fn p(row: i32, column: i32) -> Position {
    Position::new(row, column).unwrap()
}

/// Kings and rooks on their home squares, nothing else.
fn castling_board() -> Board {
    let mut b = Board::empty();
    for c in [Color::White, Color::Black] {
        let row = c.home_row() as i32;
        b.set_piece(p(row, 5), Some(Piece::new(c, PieceKind::King)));
        b.set_piece(p(row, 1), Some(Piece::new(c, PieceKind::Rook)));
        b.set_piece(p(row, 8), Some(Piece::new(c, PieceKind::Rook)));
    }
    b
}

fn ends(moves: &[Move]) -> Vec<Position> {
    let mut v: Vec<Position> = moves.iter().map(|m| m.end).collect();
    v.sort();
    v
}

#[test]
fn test_both_sides_available() {
    let rule = Castling::default();
    let b = castling_board();
    assert_eq!(ends(&rule.candidate_moves(&b, p(1, 5))), vec![p(1, 3), p(1, 7)]);
    assert_eq!(ends(&rule.candidate_moves(&b, p(8, 5))), vec![p(8, 3), p(8, 7)]);
}

#[test]
fn test_blocked_between() {
    let rule = Castling::default();
    let mut b = castling_board();
    // b1 only matters for the queen side
    b.set_piece(p(1, 2), Some(Piece::new(Color::White, PieceKind::Knight)));
    assert_eq!(ends(&rule.candidate_moves(&b, p(1, 5))), vec![p(1, 7)]);
}

#[test]
fn test_not_out_of_check() {
    let rule = Castling::default();
    let mut b = castling_board();
    b.set_piece(p(4, 5), Some(Piece::new(Color::Black, PieceKind::Queen)));
    assert!(rule.candidate_moves(&b, p(1, 5)).is_empty());
}

#[test]
fn test_not_through_attacked_square() {
    let rule = Castling::default();
    let mut b = castling_board();
    // black rook on the f-file covers f1
    b.set_piece(p(8, 8), None);
    b.set_piece(p(5, 6), Some(Piece::new(Color::Black, PieceKind::Rook)));
    assert_eq!(ends(&rule.candidate_moves(&b, p(1, 5))), vec![p(1, 3)]);
}

#[test]
fn test_not_into_attacked_square() {
    let rule = Castling::default();
    let mut b = castling_board();
    b.set_piece(p(3, 4), Some(Piece::new(Color::Black, PieceKind::Knight)));
    // knight on d3 gives check
    assert!(rule.candidate_moves(&b, p(1, 5)).is_empty());

    b.set_piece(p(3, 4), None);
    b.set_piece(p(3, 2), Some(Piece::new(Color::Black, PieceKind::Knight)));
    // b3 knight covers c1 and d2
    assert_eq!(ends(&rule.candidate_moves(&b, p(1, 5))), vec![p(1, 7)]);
}

#[test]
fn test_rights_gate_generation() {
    let mut rights = CastlingRights::ALL;
    rights.revoke(Color::White, CastlingSide::KingSide);
    let rule = Castling::new(rights);
    assert_eq!(
        ends(&rule.candidate_moves(&castling_board(), p(1, 5))),
        vec![p(1, 3)]
    );
}

#[test]
fn test_perform_moves_rook() {
    let rule = Castling::default();
    let mut b = castling_board();
    let mv = Move::new(p(1, 5), p(1, 7));
    assert!(rule.matches(&b, &mv));
    assert_eq!(rule.perform(&mut b, &mv), Ok(None));
    assert_eq!(b.piece_at(p(1, 7)), Some(Piece::new(Color::White, PieceKind::King)));
    assert_eq!(b.piece_at(p(1, 6)), Some(Piece::new(Color::White, PieceKind::Rook)));
    assert!(b.piece_at(p(1, 8)).is_none());
    assert!(b.piece_at(p(1, 5)).is_none());

    let mv = Move::new(p(8, 5), p(8, 3));
    rule.perform(&mut b, &mv).unwrap();
    assert_eq!(b.piece_at(p(8, 4)), Some(Piece::new(Color::Black, PieceKind::Rook)));
    assert!(b.piece_at(p(8, 1)).is_none());
}

#[test]
fn test_after_move_revokes() {
    let mut rule = Castling::default();
    let b = castling_board();
    let rook = Piece::new(Color::White, PieceKind::Rook);
    rule.after_move(&Move::new(p(1, 8), p(2, 8)), rook, &b);
    assert!(!rule.rights().white_king_side);
    assert!(rule.rights().white_queen_side);

    // capture on a8 ends black's queen-side right
    rule.after_move(&Move::new(p(1, 1), p(8, 1)), rook, &b);
    assert!(!rule.rights().black_queen_side);
    assert!(!rule.rights().white_queen_side);
    assert!(rule.rights().black_king_side);

    let king = Piece::new(Color::Black, PieceKind::King);
    rule.after_move(&Move::new(p(8, 5), p(7, 5)), king, &b);
    assert_eq!(rule.rights(), CastlingRights::NONE);
}

#[test]
fn test_rights_from_board() {
    let mut b = castling_board();
    b.set_piece(p(8, 1), None);
    let rights = CastlingRights::from_board(&b);
    assert!(rights.white_king_side && rights.white_queen_side && rights.black_king_side);
    assert!(!rights.black_queen_side);
}
