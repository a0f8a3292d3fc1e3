//! Rule engine property tests.

use std::sync::Arc;

use proptest::prelude::*;

use battle_engine::board::{BattleSetup, BoardState};
use battle_engine::cards::{CardCatalog, CardId};
use battle_engine::core::{BattleConfig, PlayerId};
use battle_engine::rules::RuleEngine;

// =============================================================================
// Helpers
// =============================================================================

/// Every card id in the standard catalog.
fn card_ids() -> Vec<CardId> {
    let mut ids: Vec<CardId> = CardCatalog::standard().iter().map(|card| card.id).collect();
    ids.sort();
    ids
}

/// Board with top to move, `held` cards dealt from the deck and the given weight.
fn board_from(picks: &[usize], held: usize, weight: i32, on_board: usize) -> BoardState {
    let ids = card_ids();
    let deck: Vec<CardId> = picks.iter().map(|&i| ids[i % ids.len()]).collect();
    let setup = BattleSetup::new(1, deck.clone(), deck);
    let mut board = BoardState::from_setup(&setup, &BattleConfig::headless());
    board.advance_turn();

    let top = board.player_mut(PlayerId::TOP);
    for _ in 0..held {
        if let Some(card) = top.deck.pop_front() {
            top.hand.push_back(card);
        }
    }
    for _ in 0..on_board {
        if let Some(card) = top.deck.pop_front() {
            top.board.push_back(card);
        }
    }
    top.current_weight = weight;
    board
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Test that legality checks are pure: same answer twice, board untouched.
    #[test]
    fn test_can_card_be_played_is_pure(
        picks in prop::collection::vec(0usize..64, 4..20),
        held in 0usize..8,
        weight in -2i32..12,
        on_board in 0usize..6,
    ) {
        let catalog = Arc::new(CardCatalog::standard());
        let rules = RuleEngine::new(catalog.clone(), &BattleConfig::headless());
        let board = board_from(&picks, held, weight, on_board);
        let before = board.snapshot().unwrap();

        let hand_len = board.player(PlayerId::TOP).hand.len();
        for index in 0..hand_len + 1 {
            let card = board
                .player(PlayerId::TOP)
                .hand
                .get(index)
                .and_then(|held| catalog.get(held.card));
            let first = rules.can_card_be_played(card, index, PlayerId::TOP, &board);
            let second = rules.can_card_be_played(card, index, PlayerId::TOP, &board);
            prop_assert_eq!(first, second);
            prop_assert_eq!(first, rules.can_play_held(index, PlayerId::TOP, &board));
        }

        prop_assert_eq!(board.snapshot().unwrap(), before);
    }

    /// Test that a card the player cannot afford is never playable.
    #[test]
    fn test_unaffordable_cards_refused(
        picks in prop::collection::vec(0usize..64, 4..20),
        held in 1usize..8,
    ) {
        let catalog = Arc::new(CardCatalog::standard());
        let rules = RuleEngine::new(catalog.clone(), &BattleConfig::headless());
        let board = board_from(&picks, held, -1, 0);

        for index in rules.playable_indices(PlayerId::TOP, &board) {
            let held = &board.player(PlayerId::TOP).hand[index];
            let data = catalog.get(held.card).unwrap();
            let weight = rules.effective_weight(data, held, board.player(PlayerId::TOP));
            prop_assert!(weight <= -1);
        }
    }
}

/// Test that nothing is playable once the battle is over.
#[test]
fn test_finished_battle_refuses_plays() {
    let catalog = Arc::new(CardCatalog::standard());
    let rules = RuleEngine::new(catalog, &BattleConfig::headless());
    let mut board = board_from(&[0, 1, 2, 3, 4, 5], 3, 10, 0);
    assert!(!rules.playable_indices(PlayerId::TOP, &board).is_empty());

    board.declare_winner(PlayerId::BOT);

    assert!(rules.playable_indices(PlayerId::TOP, &board).is_empty());
}
