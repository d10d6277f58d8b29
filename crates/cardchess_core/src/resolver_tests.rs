use super::*;
use crate::effects::EffectDefinition;
use crate::layout::Layout;

struct Fixture {
    board: Board,
    pieces: Pieces,
    engine: EffectEngine,
    events: Vec<GameEvent>,
}

impl Fixture {
    fn new(placement: &str) -> Self {
        let (board, pieces) = Layout::parse(placement).unwrap().build().unwrap();
        Self {
            board,
            pieces,
            engine: EffectEngine::new(),
            events: Vec::new(),
        }
    }

    fn at(&self, name: &str) -> PieceId {
        self.board.piece_at(sq(name)).unwrap()
    }

    fn give(&mut self, id: PieceId, kind: EffectKind) {
        let def = EffectDefinition::new(kind);
        self.engine
            .apply_effect(&mut self.pieces, id, &def, 1, &mut self.events)
            .unwrap();
    }

    fn play(&mut self, id: PieceId, to: &str) -> ActionResult<MoveOutcome> {
        execute_move(
            &mut self.board,
            &mut self.pieces,
            &mut self.engine,
            id,
            sq(to),
            1,
            &mut self.events,
        )
    }
}

fn sq(name: &str) -> Square {
    Square::parse(name).unwrap()
}

// =============================================================================
// Plain moves and captures
// =============================================================================

#[test]
fn test_quiet_move_updates_piece_and_board() {
    let mut fx = Fixture::new("4k3/8/8/8/8/8/8/R3K3");
    let rook = fx.at("a1");
    let outcome = fx.play(rook, "a5").unwrap();

    assert_eq!(outcome.from, sq("a1"));
    assert_eq!(outcome.to, sq("a5"));
    assert_eq!(outcome.pattern, MovePattern::Straight);
    assert!(outcome.captured.is_empty());
    assert!(outcome.turn_ended);
    assert!(!outcome.moves_left);

    assert!(fx.board.is_empty(sq("a1")));
    assert_eq!(fx.board.piece_at(sq("a5")), Some(rook));
    let piece = fx.pieces.get(rook).unwrap();
    assert_eq!(piece.square, sq("a5"));
    assert_eq!(piece.previous_square, Some(sq("a1")));
    assert!(!piece.is_first_move);
    assert_eq!(piece.progress.moves_made, 1);
}

#[test]
fn test_capture_buries_defender() {
    let mut fx = Fixture::new("4k3/8/8/p7/8/8/8/R3K3");
    let rook = fx.at("a1");
    let pawn = fx.at("a5");
    let outcome = fx.play(rook, "a5").unwrap();

    assert_eq!(outcome.captured, vec![pawn]);
    assert!(!fx.pieces.get(pawn).unwrap().is_alive);
    assert_eq!(fx.pieces.graveyard().len(), 1);
    assert_eq!(fx.pieces.graveyard()[0].square, sq("a5"));
    assert_eq!(fx.board.piece_at(sq("a5")), Some(rook));
    assert!(fx.events.contains(&GameEvent::PieceCaptured {
        piece: pawn,
        by: rook,
        square: sq("a5")
    }));
}

#[test]
fn test_rejected_move_changes_nothing() {
    let mut fx = Fixture::new("4k3/8/8/p7/8/8/P7/R3K3");
    let rook = fx.at("a1");
    let before = fx.board.clone();

    assert_eq!(fx.play(rook, "a5"), Err(RejectReason::PathBlocked));
    assert_eq!(fx.play(rook, "a2"), Err(RejectReason::SquareOccupiedByAlly));
    assert_eq!(fx.play(rook, "b3"), Err(RejectReason::UnreachableSquare));
    assert_eq!(fx.board, before);
    assert!(fx.events.is_empty());
    assert_eq!(fx.pieces.get(rook).unwrap().progress.moves_made, 0);
}

#[test]
fn test_blockaded_and_spent_pieces_cannot_move() {
    let mut fx = Fixture::new("4k3/8/8/8/8/8/8/R3K3");
    let rook = fx.at("a1");
    fx.give(rook, EffectKind::Blockade);
    assert_eq!(fx.play(rook, "a3"), Err(RejectReason::Blockaded));

    let mut fx = Fixture::new("4k3/8/8/8/8/8/8/R3K3");
    let rook = fx.at("a1");
    fx.play(rook, "a3").unwrap();
    assert_eq!(fx.play(rook, "a4"), Err(RejectReason::NoRemainingMoves));
}

#[test]
fn test_king_capture_decides_game() {
    let mut fx = Fixture::new("4k3/8/8/8/8/8/8/4RK2");
    let rook = fx.at("e1");
    let outcome = fx.play(rook, "e8").unwrap();
    assert_eq!(outcome.winner, Some(Side::First));
    assert!(outcome.turn_ended);
}

// =============================================================================
// Triggered effects
// =============================================================================

#[test]
fn test_collision_captures_two_more_on_diagonal() {
    let mut fx = Fixture::new("4k3/8/8/6p1/5p2/4p3/8/2B1K3");
    let bishop = fx.at("c1");
    fx.give(bishop, EffectKind::DiagonalCollision);
    let before = fx.board.occupied().count();

    let outcome = fx.play(bishop, "e3").unwrap();
    assert_eq!(outcome.captured.len(), 3);
    assert_eq!(fx.board.occupied().count(), before - 3);
    assert!(fx.board.is_empty(sq("f4")));
    assert!(fx.board.is_empty(sq("g5")));
    assert_eq!(fx.board.piece_at(sq("e3")), Some(bishop));
}

#[test]
fn test_collision_stops_at_ally_and_skips_empty() {
    let mut fx = Fixture::new("4k3/8/7p/6P1/8/4p3/8/2B1K3");
    let bishop = fx.at("c1");
    fx.give(bishop, EffectKind::DiagonalCollision);

    let outcome = fx.play(bishop, "e3").unwrap();
    assert_eq!(outcome.captured.len(), 1);
    assert!(!fx.board.is_empty(sq("h6")));
}

#[test]
fn test_collision_needs_a_bishop() {
    let mut fx = Fixture::new("4k3/8/8/8/5p2/4p3/8/2Q1K3");
    let queen = fx.at("c1");
    fx.give(queen, EffectKind::DiagonalCollision);
    let outcome = fx.play(queen, "e3").unwrap();
    assert_eq!(outcome.captured.len(), 1);
}

#[test]
fn test_not_today_repels_attacker() {
    let mut fx = Fixture::new("4k3/8/8/8/4R3/8/8/K7");
    let rook = fx.at("e4");
    let king = fx.at("e8");
    fx.give(king, EffectKind::NotToday);

    let outcome = fx.play(rook, "e8").unwrap();
    assert!(outcome.repelled);
    assert!(outcome.captured.is_empty());
    assert_eq!(outcome.to, sq("e3"));
    assert!(outcome.turn_ended);

    assert!(fx.pieces.get(king).unwrap().is_alive);
    assert!(!fx.pieces.get(king).unwrap().has_effect(EffectKind::NotToday));
    assert_eq!(fx.board.piece_at(sq("e3")), Some(rook));
    assert!(fx.board.is_empty(sq("e4")));
    assert_eq!(
        fx.pieces.get(rook).unwrap().can_move_this_turn(),
        Err(RejectReason::NoRemainingMoves)
    );
}

#[test]
fn test_not_today_push_blocked_keeps_attacker_home() {
    let mut fx = Fixture::new("4k3/8/8/8/4R3/4P3/8/K7");
    let rook = fx.at("e4");
    let king = fx.at("e8");
    fx.give(king, EffectKind::NotToday);

    let outcome = fx.play(rook, "e8").unwrap();
    assert_eq!(outcome.to, sq("e4"));
    assert_eq!(fx.board.piece_at(sq("e4")), Some(rook));
}

#[test]
fn test_second_life_returns_piece_home() {
    let mut fx = Fixture::new("4k3/8/8/r7/8/8/8/R3K3");
    let rook = fx.at("a1");
    let victim = fx.at("a5");
    fx.pieces.get_mut(victim).unwrap().home = sq("a8");
    fx.give(victim, EffectKind::SecondLife);

    let outcome = fx.play(rook, "a5").unwrap();
    assert_eq!(outcome.captured, vec![victim]);
    assert_eq!(outcome.revived, vec![victim]);
    assert_eq!(fx.board.piece_at(sq("a8")), Some(victim));
    assert_eq!(fx.board.piece_at(sq("a5")), Some(rook));

    let revived = fx.pieces.get(victim).unwrap();
    assert!(revived.is_alive);
    assert!(revived.effects().is_empty());
    assert!(fx.pieces.graveyard().is_empty());
}

#[test]
fn test_second_life_returns_to_square_the_attacker_left() {
    let mut fx = Fixture::new("4k3/8/8/r7/8/8/8/R3K3");
    let rook = fx.at("a1");
    let victim = fx.at("a5");
    fx.pieces.get_mut(victim).unwrap().home = sq("a1");
    fx.give(victim, EffectKind::SecondLife);

    let outcome = fx.play(rook, "a5").unwrap();
    assert_eq!(outcome.revived, vec![victim]);
    assert_eq!(fx.board.piece_at(sq("a1")), Some(victim));
    assert_eq!(fx.board.piece_at(sq("a5")), Some(rook));
    assert!(fx.pieces.graveyard().is_empty());
}

#[test]
fn test_capture_reports_dropped_effects() {
    let mut fx = Fixture::new("4k3/8/8/r7/8/8/8/R3K3");
    let rook = fx.at("a1");
    let victim = fx.at("a5");
    fx.give(victim, EffectKind::DoubleMove);
    fx.events.clear();

    fx.play(rook, "a5").unwrap();
    assert!(fx.events.contains(&GameEvent::EffectExpired {
        piece: victim,
        kind: EffectKind::DoubleMove,
    }));
}

#[test]
fn test_far_rank_promotion() {
    let mut fx = Fixture::new("4k3/P7/8/8/8/8/8/4K3");
    let pawn = fx.at("a7");
    let outcome = fx.play(pawn, "a8").unwrap();
    assert_eq!(outcome.promoted_to, Some(PieceKind::Queen));
    assert_eq!(fx.pieces.get(pawn).unwrap().kind, PieceKind::Queen);
}

#[test]
fn test_in_place_promotion_on_next_move() {
    let mut fx = Fixture::new("4k3/8/8/8/8/8/4P3/4K3");
    let pawn = fx.at("e2");
    fx.give(pawn, EffectKind::InPlacePromotion);

    let outcome = fx.play(pawn, "e3").unwrap();
    assert_eq!(outcome.promoted_to, Some(PieceKind::Queen));
    let piece = fx.pieces.get(pawn).unwrap();
    assert_eq!(piece.kind, PieceKind::Queen);
    assert_eq!(piece.square, sq("e3"));
    assert!(!piece.has_effect(EffectKind::InPlacePromotion));
}

#[test]
fn test_double_move_allows_second_move() {
    let mut fx = Fixture::new("4k3/8/8/8/8/8/8/R3K3");
    let rook = fx.at("a1");
    fx.give(rook, EffectKind::DoubleMove);

    let first = fx.play(rook, "a3").unwrap();
    assert!(first.moves_left);
    assert!(!first.turn_ended);

    let second = fx.play(rook, "c3").unwrap();
    assert!(!second.moves_left);
    assert_eq!(fx.play(rook, "c4"), Err(RejectReason::NoRemainingMoves));
}

#[test]
fn test_nice_day_only_after_quiet_move() {
    let mut fx = Fixture::new("4k3/8/8/8/8/8/8/R3K3");
    let rook = fx.at("a1");
    fx.give(rook, EffectKind::NiceDay);
    assert!(fx.play(rook, "a3").unwrap().moves_left);

    let mut fx = Fixture::new("4k3/8/8/8/8/p7/8/R3K3");
    let rook = fx.at("a1");
    fx.give(rook, EffectKind::NiceDay);
    let outcome = fx.play(rook, "a3").unwrap();
    assert_eq!(outcome.captured.len(), 1);
    assert!(!outcome.moves_left);
}

#[test]
fn test_dance_bonus_requires_new_pattern() {
    let mut fx = Fixture::new("4k3/8/8/8/8/8/8/Q3K3");
    let queen = fx.at("a1");
    fx.give(queen, EffectKind::Dance);

    let first = fx.play(queen, "a4").unwrap();
    assert!(first.moves_left);
    assert_eq!(fx.play(queen, "a6"), Err(RejectReason::UnreachableSquare));

    let second = fx.play(queen, "c6").unwrap();
    assert_eq!(second.pattern, MovePattern::Diagonal);
    assert!(!second.moves_left);
}
