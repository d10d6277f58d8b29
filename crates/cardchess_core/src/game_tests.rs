use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::cards::card_by_name;
use crate::effects::TurnBucket;
use crate::piece::EffectApplication;

fn game(placement: &str) -> Game {
    let config = GameConfig {
        board_size: 8,
        layout: Some(placement.into()),
        deal_on_start: false,
        ..GameConfig::default()
    };
    Game::new(config).unwrap()
}

fn sq(name: &str) -> Square {
    Square::parse(name).unwrap()
}

/// Put a named card straight into `side`'s active list.
fn give_card(game: &mut Game, side: Side, name: &str) -> CardId {
    let id = card_by_name(game.hands().cards(), name).unwrap().id;
    game.add_card_to_storage(side, id).unwrap();
    game.activate_card(side, id).unwrap();
    id
}

#[derive(Default)]
struct Recorder {
    turns: Vec<(Side, u32)>,
    captured: Vec<PieceId>,
    all: usize,
}

struct Shared(Rc<RefCell<Recorder>>);

impl GameListener for Shared {
    fn on_turn_changed(&mut self, side: Side, turn: u32) {
        self.0.borrow_mut().turns.push((side, turn));
    }

    fn on_piece_captured(&mut self, piece: PieceId) {
        self.0.borrow_mut().captured.push(piece);
    }

    fn on_event(&mut self, _event: &GameEvent) {
        self.0.borrow_mut().all += 1;
    }
}

#[test]
fn test_new_game_deals_hands() {
    let game = Game::new(GameConfig::default()).unwrap();
    assert_eq!(game.pieces().alive().count(), 32);
    assert_eq!(game.current_side(), Side::First);
    assert_eq!(game.turn_number(), 1);
    for side in Side::ALL {
        assert_eq!(game.hand(side).active.len(), 3);
    }
    assert!(game.verify_occupancy());
}

#[test]
fn test_same_seed_same_hands() {
    let config = GameConfig {
        seed: 77,
        ..GameConfig::default()
    };
    let a = Game::new(config.clone()).unwrap();
    let b = Game::new(config).unwrap();
    assert_eq!(a.hand(Side::First), b.hand(Side::First));
    assert_eq!(a.hand(Side::Second), b.hand(Side::Second));
}

#[test]
fn test_move_passes_turn() {
    let mut game = Game::new(GameConfig::default()).unwrap();
    let e2 = game.piece_at(sq("e2")).unwrap();
    let e7 = game.piece_at(sq("e7")).unwrap();

    assert_eq!(game.try_move(e7, sq("e5")), Err(RejectReason::NotYourTurn));

    let outcome = game.try_move(e2, sq("e4")).unwrap();
    assert!(outcome.turn_ended);
    assert_eq!(game.current_side(), Side::Second);
    assert_eq!(game.turn_number(), 1);

    game.try_move(e7, sq("e5")).unwrap();
    assert_eq!(game.current_side(), Side::First);
    assert_eq!(game.turn_number(), 2);
    assert!(game.verify_occupancy());
}

#[test]
fn test_rejected_move_keeps_turn() {
    let mut game = Game::new(GameConfig::default()).unwrap();
    assert_eq!(
        game.drain_events(),
        vec![GameEvent::CardsRedistributed { turn: 1 }]
    );
    let rook = game.piece_at(sq("a1")).unwrap();
    assert_eq!(game.try_move(rook, sq("a4")), Err(RejectReason::PathBlocked));
    assert_eq!(game.phase(), TurnPhase::WaitingForAction);
    assert!(game.is_turn_of(Side::First));
    assert!(game.drain_events().is_empty());
}

#[test]
fn test_utility_card_keeps_turn() {
    let mut game = game("4k3/8/8/8/8/8/8/R3K3");
    let rook = game.piece_at(sq("a1")).unwrap();
    let card = give_card(&mut game, Side::First, "Double Step");

    let outcome = game
        .try_activate_card(Side::First, card, Target::Piece(rook))
        .unwrap();
    assert_eq!(outcome.bucket, TurnBucket::Utility);
    assert!(!outcome.turn_ended);
    assert!(game.is_turn_of(Side::First));
    assert!(game.hand(Side::First).active.is_empty());
    assert_eq!(game.hands().discard(), &[card]);
    assert_eq!(game.effective_capabilities(rook).unwrap().move_count_bonus, 2);
    assert_eq!(game.active_effects(rook).len(), 1);
}

#[test]
fn test_attack_card_ends_turn() {
    let mut game = game("4k3/8/8/8/8/8/8/R3K3");
    let king = game.piece_at(sq("e8")).unwrap();
    let card = give_card(&mut game, Side::First, "Blockade");

    let outcome = game
        .try_activate_card(Side::First, card, Target::Piece(king))
        .unwrap();
    assert!(outcome.turn_ended);
    assert_eq!(game.current_side(), Side::Second);
    assert!(game.legal_destinations(king).is_empty());
}

#[test]
fn test_rejected_card_stays_in_hand() {
    let mut game = game("4k3/8/8/8/8/8/8/R3K3");
    let rook = game.piece_at(sq("a1")).unwrap();
    let card = give_card(&mut game, Side::First, "Blockade");

    assert_eq!(
        game.try_activate_card(Side::First, card, Target::Piece(rook)),
        Err(RejectReason::InvalidTarget)
    );
    assert_eq!(game.hand(Side::First).active, vec![card]);
    assert!(game.is_turn_of(Side::First));

    assert_eq!(
        game.try_activate_card(Side::First, CardId(0), Target::Piece(rook)),
        Err(RejectReason::CardNotInHand)
    );
    assert_eq!(
        game.try_activate_card(Side::Second, card, Target::Piece(rook)),
        Err(RejectReason::NotYourTurn)
    );
}

#[test]
fn test_bonus_moves_lock_the_piece() {
    let mut game = game("4k3/8/8/8/8/8/P7/R3K3");
    let rook = game.piece_at(sq("a1")).unwrap();
    let pawn = game.piece_at(sq("a2")).unwrap();
    let card = give_card(&mut game, Side::First, "Double Step");
    game.try_activate_card(Side::First, card, Target::Piece(rook))
        .unwrap();

    let first = game.try_move(rook, sq("c1")).unwrap();
    assert!(first.moves_left);
    assert!(game.is_turn_of(Side::First));
    assert_eq!(
        game.try_move(pawn, sq("a3")),
        Err(RejectReason::PieceLocked(rook))
    );
    assert!(game.legal_actions().contains(&Action::EndTurn));

    game.try_move(rook, sq("c5")).unwrap();
    assert_eq!(game.current_side(), Side::Second);
    assert_eq!(game.turn_state().locked_piece, None);
}

#[test]
fn test_end_turn() {
    let mut game = game("4k3/8/8/8/8/8/8/R3K3");
    assert_eq!(game.try_end_turn(Side::Second), Err(RejectReason::NotYourTurn));
    game.try_end_turn(Side::First).unwrap();
    assert_eq!(game.current_side(), Side::Second);
}

#[test]
fn test_game_over_rejects_everything() {
    let mut game = game("4k3/8/8/8/8/8/8/4RK2");
    let rook = game.piece_at(sq("e1")).unwrap();
    let outcome = game.try_move(rook, sq("e8")).unwrap();
    assert_eq!(outcome.winner, Some(Side::First));
    assert_eq!(game.winner(), Some(Side::First));
    assert!(game.legal_actions().is_empty());

    assert_eq!(game.try_end_turn(Side::Second), Err(RejectReason::GameOver));
    assert_eq!(game.apply(Action::EndTurn), Err(RejectReason::GameOver));

    // Hand and effect commands are frozen too
    let card = card_by_name(game.hands().cards(), "Freeze").unwrap().id;
    assert_eq!(
        game.add_card_to_storage(Side::Second, card),
        Err(RejectReason::GameOver)
    );
    assert_eq!(
        game.activate_card(Side::Second, card),
        Err(RejectReason::GameOver)
    );
    assert_eq!(
        game.deactivate_card(Side::Second, card),
        Err(RejectReason::GameOver)
    );
    assert_eq!(game.tick_all_effects(), Err(RejectReason::GameOver));
    assert!(game.hand(Side::Second).storage.is_empty());
    assert!(game.hand(Side::Second).active.is_empty());
    assert!(
        game.drain_events()
            .contains(&GameEvent::GameOver { winner: Side::First })
    );
}

#[test]
fn test_listeners_see_events_after_the_command() {
    let mut game = game("4k3/8/8/p7/8/8/8/R3K3");
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    game.add_listener(Box::new(Shared(recorder.clone())));

    let rook = game.piece_at(sq("a1")).unwrap();
    let pawn = game.piece_at(sq("a5")).unwrap();
    game.try_move(rook, sq("a5")).unwrap();

    let seen = recorder.borrow();
    assert_eq!(seen.captured, vec![pawn]);
    assert_eq!(seen.turns, vec![(Side::Second, 1)]);

    let events = game.drain_events();
    assert_eq!(seen.all, events.len());
    assert!(game.drain_events().is_empty());
}

#[test]
fn test_card_targets() {
    let mut game = game("4k3/8/8/8/8/8/8/R3K3");
    let rook = game.piece_at(sq("a1")).unwrap();
    let king = game.piece_at(sq("e1")).unwrap();
    let enemy = game.piece_at(sq("e8")).unwrap();

    let double = give_card(&mut game, Side::First, "Double Step");
    let targets = game.card_targets(Side::First, double);
    assert_eq!(targets.len(), 2);
    assert!(targets.contains(&Target::Piece(rook)));
    assert!(targets.contains(&Target::Piece(king)));

    let freeze = give_card(&mut game, Side::First, "Freeze");
    assert_eq!(game.card_targets(Side::First, freeze), vec![Target::Piece(enemy)]);

    // Nothing in the graveyard yet
    let resurrection = give_card(&mut game, Side::First, "Resurrection");
    assert!(game.card_targets(Side::First, resurrection).is_empty());
}

#[test]
fn test_legal_actions_cover_moves_and_cards() {
    let mut game = game("4k3/8/8/8/8/8/8/R3K3");
    let rook = game.piece_at(sq("a1")).unwrap();
    give_card(&mut game, Side::First, "Double Step");

    let actions = game.legal_actions();
    assert!(actions.contains(&Action::Move {
        piece: rook,
        to: sq("a8")
    }));
    assert!(
        actions
            .iter()
            .any(|a| matches!(a, Action::PlayCard { .. }))
    );
    // Ending the turn only makes sense once the side has acted
    assert!(!actions.contains(&Action::EndTurn));

    for action in actions {
        if let Action::PlayCard { .. } = action {
            game.apply(action).unwrap();
            break;
        }
    }
    assert!(game.legal_actions().contains(&Action::EndTurn));
}

#[test]
fn test_snapshot_round_trip() {
    let mut game = game("4k3/8/8/8/8/8/8/R3K3");
    let rook = game.piece_at(sq("a1")).unwrap();
    let card = give_card(&mut game, Side::First, "Protected Ring");
    let outcome = game
        .try_activate_card(Side::First, card, Target::Piece(rook))
        .unwrap();
    assert_eq!(outcome.results[0].result, Ok(EffectApplication::Applied));

    let snap = game.snapshot();
    assert_eq!(snap.board_size, 8);
    assert_eq!(snap.placement, "4k3/8/8/8/8/8/8/R3K3");
    assert_eq!(snap.pieces.len(), 3);
    assert_eq!(snap.turn.current_side, Side::Second);

    let json = serde_json::to_string(&snap).unwrap();
    let back: GameSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snap);
}
