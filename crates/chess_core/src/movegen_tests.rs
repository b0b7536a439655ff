use super::*;

fn p(row: i32, column: i32) -> Position {
    Position::new(row, column).unwrap()
}

fn lone(pos: Position, piece: Piece) -> Board {
    let mut b = Board::empty();
    b.set_piece(pos, Some(piece));
    b
}

fn ends(moves: &[Move]) -> Vec<Position> {
    let mut v: Vec<Position> = moves.iter().map(|m| m.end).collect();
    v.sort();
    v.dedup();
    v
}

#[test]
fn test_empty_square_has_no_moves() {
    assert!(pseudo_moves(&Board::startpos(), p(4, 4)).is_empty());
}

#[test]
fn test_startpos_pawn_moves() {
    let b = Board::startpos();
    for column in 1..=8 {
        let moves = pseudo_moves(&b, p(2, column));
        assert_eq!(ends(&moves), vec![p(3, column), p(4, column)]);
    }
}

#[test]
fn test_blocked_pawn() {
    let mut b = Board::startpos();
    b.set_piece(p(3, 5), Some(Piece::new(Color::Black, PieceKind::Knight)));
    // one-step blocked means the two-step is blocked too
    assert!(pseudo_moves(&b, p(2, 5)).is_empty());

    b.set_piece(p(3, 5), None);
    b.set_piece(p(4, 5), Some(Piece::new(Color::Black, PieceKind::Knight)));
    assert_eq!(ends(&pseudo_moves(&b, p(2, 5))), vec![p(3, 5)]);
}

#[test]
fn test_pawn_captures_only_enemies() {
    let mut b = lone(p(4, 4), Piece::new(Color::White, PieceKind::Pawn));
    b.set_piece(p(5, 3), Some(Piece::new(Color::Black, PieceKind::Bishop)));
    b.set_piece(p(5, 5), Some(Piece::new(Color::White, PieceKind::Bishop)));
    assert_eq!(ends(&pseudo_moves(&b, p(4, 4))), vec![p(5, 3), p(5, 4)]);
}

#[test]
fn test_black_pawn_moves_down() {
    let b = lone(p(7, 1), Piece::new(Color::Black, PieceKind::Pawn));
    assert_eq!(ends(&pseudo_moves(&b, p(7, 1))), vec![p(5, 1), p(6, 1)]);
}

#[test]
fn test_promotion_variants() {
    let mut b = lone(p(7, 2), Piece::new(Color::White, PieceKind::Pawn));
    b.set_piece(p(8, 1), Some(Piece::new(Color::Black, PieceKind::Rook)));
    let moves = pseudo_moves(&b, p(7, 2));
    // 4 pushes + 4 captures, never to king or pawn
    assert_eq!(moves.len(), 8);
    assert!(moves.iter().all(|m| m.promotion.is_some_and(|k| k.is_promotion_target())));
    assert_eq!(moves.iter().filter(|m| m.end == p(8, 1)).count(), 4);
}

#[test]
fn test_knight_in_corner() {
    let b = lone(p(1, 1), Piece::new(Color::White, PieceKind::Knight));
    assert_eq!(ends(&pseudo_moves(&b, p(1, 1))), vec![p(2, 3), p(3, 2)]);
}

#[test]
fn test_rook_ray_stops_at_pieces() {
    let mut b = lone(p(1, 1), Piece::new(Color::White, PieceKind::Rook));
    b.set_piece(p(1, 4), Some(Piece::new(Color::White, PieceKind::Knight)));
    b.set_piece(p(5, 1), Some(Piece::new(Color::Black, PieceKind::Knight)));
    assert_eq!(
        ends(&pseudo_moves(&b, p(1, 1))),
        vec![p(1, 2), p(1, 3), p(2, 1), p(3, 1), p(4, 1), p(5, 1)]
    );
}

#[test]
fn test_queen_center_count() {
    let b = lone(p(4, 4), Piece::new(Color::Black, PieceKind::Queen));
    assert_eq!(pseudo_moves(&b, p(4, 4)).len(), 27);
}

#[test]
fn test_bishop_center_count() {
    let b = lone(p(4, 4), Piece::new(Color::White, PieceKind::Bishop));
    assert_eq!(pseudo_moves(&b, p(4, 4)).len(), 13);
}

#[test]
fn test_king_edge_count() {
    let b = lone(p(1, 5), Piece::new(Color::White, PieceKind::King));
    assert_eq!(pseudo_moves(&b, p(1, 5)).len(), 5);
}

#[test]
fn test_check_detection() {
    let mut b = lone(p(1, 5), Piece::new(Color::White, PieceKind::King));
    b.set_piece(p(8, 5), Some(Piece::new(Color::Black, PieceKind::Rook)));
    assert!(is_in_check(&b, Color::White));

    b.set_piece(p(4, 5), Some(Piece::new(Color::White, PieceKind::Pawn)));
    assert!(!is_in_check(&b, Color::White));

    // no black king on the board at all
    assert!(!is_in_check(&b, Color::Black));
}

#[test]
fn test_pawn_gives_check_diagonally_only() {
    let mut b = lone(p(5, 5), Piece::new(Color::Black, PieceKind::King));
    b.set_piece(p(4, 5), Some(Piece::new(Color::White, PieceKind::Pawn)));
    assert!(!is_in_check(&b, Color::Black));

    b.set_piece(p(4, 4), Some(Piece::new(Color::White, PieceKind::Pawn)));
    assert!(is_in_check(&b, Color::Black));
}
