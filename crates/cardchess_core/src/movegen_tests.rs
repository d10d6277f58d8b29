use super::*;
use crate::effects::{EffectDefinition, EffectKind};
use crate::layout::Layout;

fn setup(placement: &str) -> (Board, Pieces) {
    Layout::parse(placement).unwrap().build().unwrap()
}

fn at(board: &Board, name: &str) -> PieceId {
    board.piece_at(Square::parse(name).unwrap()).unwrap()
}

fn give(pieces: &mut Pieces, id: PieceId, kind: EffectKind) {
    pieces
        .get_mut(id)
        .unwrap()
        .apply_effect(&EffectDefinition::new(kind), 1)
        .unwrap();
}

fn dests(board: &Board, pieces: &Pieces, id: PieceId) -> Vec<String> {
    let mut v: Vec<String> = legal_destinations(board, pieces, id)
        .into_iter()
        .map(Square::notation)
        .collect();
    v.sort();
    v
}

#[test]
fn test_pawn_first_move() {
    let (board, mut pieces) = setup("4k3/8/8/8/8/8/P7/4K3");
    let pawn = at(&board, "a2");
    assert_eq!(dests(&board, &pieces, pawn), vec!["A3", "A4"]);

    pieces.get_mut(pawn).unwrap().is_first_move = false;
    assert_eq!(dests(&board, &pieces, pawn), vec!["A3"]);
}

#[test]
fn test_pawn_blocked_and_captures() {
    // Own knight blocks e3, enemy pawns on d3 and f3
    let (board, pieces) = setup("4k3/8/8/8/8/3pNp2/4P3/4K3");
    let pawn = at(&board, "e2");
    assert_eq!(dests(&board, &pieces, pawn), vec!["D3", "F3"]);
}

#[test]
fn test_second_side_pawn_moves_down() {
    let (board, pieces) = setup("4k3/3p4/8/8/8/8/8/4K3");
    let pawn = at(&board, "d7");
    assert_eq!(dests(&board, &pieces, pawn), vec!["D5", "D6"]);
}

#[test]
fn test_pawn_sideways_step() {
    let (board, mut pieces) = setup("4k3/8/8/8/8/8/4P3/4K3");
    let pawn = at(&board, "e2");
    give(&mut pieces, pawn, EffectKind::SidewaysStep);
    assert_eq!(dests(&board, &pieces, pawn), vec!["D2", "E3", "E4", "F2"]);
}

#[test]
fn test_pawn_straight_attack() {
    let (board, mut pieces) = setup("4k3/8/8/8/8/4p3/4P3/4K3");
    let pawn = at(&board, "e2");
    assert!(dests(&board, &pieces, pawn).is_empty());

    give(&mut pieces, pawn, EffectKind::StraightAttack);
    assert_eq!(dests(&board, &pieces, pawn), vec!["E3"]);
}

#[test]
fn test_bishop_gains_rook_lines() {
    let (board, mut pieces) = setup("4k3/8/8/8/8/8/8/2B1K3");
    let bishop = at(&board, "c1");
    assert_eq!(legal_destinations(&board, &pieces, bishop).len(), 7);

    give(&mut pieces, bishop, EffectKind::StraightMove);
    let d = dests(&board, &pieces, bishop);
    assert_eq!(d.len(), 17);
    for sq in ["C8", "A1", "B1", "D1", "H6"] {
        assert!(d.contains(&sq.to_string()), "missing {sq}");
    }
    // Own king on e1 stops the line
    assert!(!d.contains(&"E1".to_string()));
}

#[test]
fn test_slider_stops_at_first_piece() {
    let (board, pieces) = setup("4k3/8/8/8/8/8/1p1P4/2B1K3");
    let bishop = at(&board, "c1");
    assert_eq!(dests(&board, &pieces, bishop), vec!["B2"]);
}

#[test]
fn test_jump_bypasses_allies_on_diagonals_only() {
    let (board, mut pieces) = setup("4k3/8/8/8/8/8/1p1P4/2B1K3");
    let bishop = at(&board, "c1");
    give(&mut pieces, bishop, EffectKind::Jump);

    // Hops over the own pawn on d2, but the enemy on b2 still blocks a3
    assert_eq!(
        dests(&board, &pieces, bishop),
        vec!["B2", "E3", "F4", "G5", "H6"]
    );

    // No effect on straight lines
    let (board, mut pieces) = setup("4k3/8/8/8/8/8/P7/R3K3");
    let rook = at(&board, "a1");
    give(&mut pieces, rook, EffectKind::Jump);
    assert!(!dests(&board, &pieces, rook).contains(&"A3".to_string()));
}

#[test]
fn test_ignore_blocking_passes_everything() {
    let (board, mut pieces) = setup("4k3/8/8/8/8/8/1p1P4/2B1K3");
    let bishop = at(&board, "c1");
    give(&mut pieces, bishop, EffectKind::IgnoreBlocking);
    assert_eq!(
        dests(&board, &pieces, bishop),
        vec!["A3", "B2", "E3", "F4", "G5", "H6"]
    );
}

#[test]
fn test_attack_only_direction() {
    let (board, mut pieces) = setup("4k3/8/8/8/8/2p5/8/R3K3");
    let rook = at(&board, "a1");
    give(&mut pieces, rook, EffectKind::DiagonalAttack);

    let d = dests(&board, &pieces, rook);
    assert!(d.contains(&"C3".to_string()));
    // Diagonal is attack-only: no quiet move onto b2
    assert!(!d.contains(&"B2".to_string()));
}

#[test]
fn test_light_protection_uses_strength() {
    let (board, mut pieces) = setup("4k3/8/8/8/3n4/8/8/B3K3");
    let bishop = at(&board, "a1");
    let knight = at(&board, "d4");
    let d4 = Square::parse("d4").unwrap();
    assert!(legal_destinations(&board, &pieces, bishop).contains(&d4));

    give(&mut pieces, knight, EffectKind::LightProtection);
    // Bishop (3) is not strictly stronger than knight (3)
    assert!(!can_capture(pieces.get(bishop).unwrap(), pieces.get(knight).unwrap()));
    assert!(!legal_destinations(&board, &pieces, bishop).contains(&d4));
    assert_eq!(
        diagnose(&board, &pieces, bishop, d4),
        RejectReason::ProtectionPrevents
    );

    // The white king (10) could take it
    let king = at(&board, "e1");
    assert!(can_capture(pieces.get(king).unwrap(), pieces.get(knight).unwrap()));
}

#[test]
fn test_full_protection_and_unstoppable() {
    let (board, mut pieces) = setup("4k3/8/8/8/3n4/8/8/Q3K3");
    let queen = at(&board, "a1");
    let knight = at(&board, "d4");
    give(&mut pieces, knight, EffectKind::FullProtection);
    assert!(!can_capture(pieces.get(queen).unwrap(), pieces.get(knight).unwrap()));

    give(&mut pieces, queen, EffectKind::Unstoppable);
    assert!(can_capture(pieces.get(queen).unwrap(), pieces.get(knight).unwrap()));
    assert!(dests(&board, &pieces, queen).contains(&"D4".to_string()));
}

#[test]
fn test_same_side_never_capturable() {
    let (board, pieces) = setup("4k3/8/8/8/8/8/8/R3K3");
    let rook = pieces.get(at(&board, "a1")).unwrap();
    let king = pieces.get(at(&board, "e1")).unwrap();
    assert!(!can_capture(rook, king));
}

#[test]
fn test_blockaded_piece_has_no_destinations() {
    let (board, mut pieces) = setup("4k3/8/8/8/8/8/8/R3K3");
    let rook = at(&board, "a1");
    give(&mut pieces, rook, EffectKind::Blockade);
    assert!(legal_destinations(&board, &pieces, rook).is_empty());
    assert_eq!(
        diagnose(&board, &pieces, rook, Square::parse("a5").unwrap()),
        RejectReason::Blockaded
    );
}

#[test]
fn test_forbidden_pattern_filters_destinations() {
    let (board, mut pieces) = setup("4k3/8/8/8/8/8/8/Q3K3");
    let queen = at(&board, "a1");
    pieces.get_mut(queen).unwrap().progress.forbidden_pattern = Some(MovePattern::Straight);
    assert_eq!(
        dests(&board, &pieces, queen),
        vec!["B2", "C3", "D4", "E5", "F6", "G7", "H8"]
    );
}

#[test]
fn test_knight_jumps_over_pieces() {
    let (board, pieces) = setup("4k3/8/8/8/8/8/PPP5/1N2K3");
    let knight = at(&board, "b1");
    assert_eq!(dests(&board, &pieces, knight), vec!["A3", "C3", "D2"]);
}

#[test]
fn test_diagnose_reasons() {
    let (board, pieces) = setup("4k3/8/8/p7/8/8/P7/R3K3");
    let rook = at(&board, "a1");
    let sq = |s: &str| Square::parse(s).unwrap();

    assert_eq!(diagnose(&board, &pieces, rook, sq("a5")), RejectReason::PathBlocked);
    assert_eq!(
        diagnose(&board, &pieces, rook, sq("a2")),
        RejectReason::SquareOccupiedByAlly
    );
    assert_eq!(
        diagnose(&board, &pieces, rook, sq("b3")),
        RejectReason::UnreachableSquare
    );
    assert_eq!(
        diagnose(&board, &pieces, rook, Square::new(8, 0)),
        RejectReason::OutOfBounds(Square::new(8, 0))
    );
}
