//! Battle log integration tests.
//!
//! These tests verify that every action survives the log format and that a
//! recorded battle replays to the same final board.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use battle_engine::actions::names;
use battle_engine::actions::{validate_params, ActionDescriptor, ActionFactory, ActionParams};
use battle_engine::battle_log::{BattleDeserializer, BattleSerializer, LogLine, LogTarget, BATTLE_LOG_EXTENSION};
use battle_engine::board::{BattleSetup, BoardState};
use battle_engine::cards::{CardCatalog, CardFamily};
use battle_engine::core::{BattleConfig, LogError, PlayerId};
use battle_engine::engine::ActionEngine;
use battle_engine::simulation::{GeneratorKind, SimulationConfig, SimulationRunner};

// =============================================================================
// Helpers
// =============================================================================

fn catalog() -> Arc<CardCatalog> {
    Arc::new(CardCatalog::standard())
}

fn runner(config: SimulationConfig) -> SimulationRunner {
    SimulationRunner::new(config.with_max_turns(30), catalog())
}

/// Replay a log on a fresh headless engine.
fn replay(log: &BattleDeserializer) -> ActionEngine {
    let mut engine = ActionEngine::new(log.setup(), catalog(), BattleConfig::headless());
    log.replay_actions(&mut engine).unwrap();
    engine.run_until_idle().unwrap();
    engine
}

/// Scratch directory unique to this test process.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("battle-engine-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

// =============================================================================
// Format
// =============================================================================

/// Test that every registered action survives a trip through a log line.
#[test]
fn test_every_action_round_trips() {
    let factory = ActionFactory::standard();
    assert!(factory.len() >= 27);

    for name in factory.registered_actions() {
        let original = factory.create_game_action(name).unwrap();
        let mut params = ActionParams::new();
        for (i, &param) in original.required_extra_param_names().iter().enumerate() {
            params.insert(param, i);
        }

        let line = serde_json::to_string(&LogLine::action(&ActionDescriptor::new(name, params.clone()))).unwrap();
        let parsed: LogLine = serde_json::from_str(&line).unwrap();
        let LogLine::Action { action_type, params: parsed_params } = parsed else {
            panic!("{name} did not come back as an action record");
        };

        assert_eq!(action_type, name);
        assert_eq!(parsed_params, params, "{name} parameters changed");
        let rebuilt = factory.create_game_action(&action_type).unwrap();
        assert_eq!(
            rebuilt.required_extra_param_names(),
            original.required_extra_param_names(),
            "{name} required parameters changed"
        );
        assert!(validate_params(rebuilt.as_ref(), &parsed_params).is_ok());
    }
}

/// Test that a log with actions before its header is rejected.
#[test]
fn test_log_without_header_rejected() {
    let text = r#"{"kind":"action","action_type":"NextPlayer","params":[]}"#;

    let err = text.parse::<BattleDeserializer>().unwrap_err();

    assert!(matches!(err, LogError::Format(_)));
}

// =============================================================================
// Replay
// =============================================================================

/// Test that replaying a recorded battle reproduces its final board.
#[test]
fn test_replay_reproduces_battle() {
    let runner = runner(SimulationConfig::default());

    for seed in [1, 2, 3, 17] {
        let (outcome, text) = runner.run_recorded_battle(seed).unwrap();
        assert!(!outcome.aborted);

        let log: BattleDeserializer = text.parse().unwrap();
        assert_eq!(log.seed(), seed);
        assert!(!log.actions().is_empty());
        assert!(!log.checkpoints().is_empty());

        let engine = replay(&log);
        log.verify_final_state(engine.board()).unwrap();
        assert_eq!(engine.winner(), outcome.winner);
        assert_eq!(engine.board().turn_counter(), outcome.turns);
        assert_eq!(engine.board().digest().ok(), outcome.digest);
    }
}

/// Test that optimised generators are replayed just as faithfully.
#[test]
fn test_replay_with_optimised_generators() {
    let config = SimulationConfig::default()
        .with_decks(
            CardCatalog::standard().family_deck(CardFamily::Demons),
            CardCatalog::standard().family_deck(CardFamily::Rodents),
        )
        .with_generators(GeneratorKind::Optimised, GeneratorKind::Optimised);
    let (outcome, text) = runner(config).run_recorded_battle(99).unwrap();

    let log: BattleDeserializer = text.parse().unwrap();
    let engine = replay(&log);

    log.verify_final_state(engine.board()).unwrap();
    assert_eq!(engine.winner(), outcome.winner);
}

/// Test that a board differing from the log is reported as divergence.
#[test]
fn test_divergence_detected() {
    let (_, text) = runner(SimulationConfig::default()).run_recorded_battle(4).unwrap();
    let log: BattleDeserializer = text.parse().unwrap();
    let engine = replay(&log);

    let mut board: BoardState = engine.board().clone();
    board.player_mut(PlayerId::TOP).armor += 1;
    let err = log.verify_final_state(&board).unwrap_err();

    let (last_turn, expected) = *log.checkpoints().last().unwrap();
    match err {
        LogError::ReplayDivergence { expected: e, turn, .. } => {
            assert_eq!(e, expected);
            assert_eq!(turn, last_turn);
        }
        other => panic!("expected divergence, got {other}"),
    }
}

/// Record one `NextPlayer` from `setup`, then replay the log on a fresh engine.
fn record_and_replay(setup: &BattleSetup) -> (BattleDeserializer, ActionEngine, ActionEngine) {
    let mut engine = ActionEngine::new(setup, catalog(), BattleConfig::headless()).with_log("prepared", LogTarget::Memory);
    engine.add_game_action(names::NEXT_PLAYER, ActionParams::new()).unwrap();
    engine.run_until_idle().unwrap();
    engine.finish_log().unwrap();

    let text = engine.take_serializer().unwrap().contents();
    let log: BattleDeserializer = text.parse().unwrap();
    let replayed = replay(&log);
    (log, engine, replayed)
}

/// Test that a battle started from a prepared board replays from that board.
#[test]
fn test_prepared_board_replays() {
    let base = BattleSetup::new(8, CardCatalog::standard().family_deck(CardFamily::Insects), Vec::new());
    let mut board = BoardState::from_setup(&base, &BattleConfig::headless());
    board.player_mut(PlayerId::TOP).health = 1;
    board.player_mut(PlayerId::BOT).armor = 6;
    let setup = base.with_start_board(board.clone());

    let (log, recorded, replayed) = record_and_replay(&setup);

    assert_eq!(log.setup().start_board.as_ref(), Some(&board));
    log.verify_final_state(replayed.board()).unwrap();
    assert_eq!(replayed.board(), recorded.board());
    assert_eq!(replayed.board().player(PlayerId::TOP).health, 1);
}

/// Test that the log header is the engine's own setup, so a battle with a
/// non-default seed and healths replays to the same board.
#[test]
fn test_log_header_follows_engine_setup() {
    let setup = BattleSetup::new(
        1,
        CardCatalog::standard().family_deck(CardFamily::Insects),
        CardCatalog::standard().family_deck(CardFamily::Dinosaurs),
    )
    .with_health(1, 12);

    let (log, recorded, replayed) = record_and_replay(&setup);

    assert_eq!(log.setup(), recorded.setup());
    assert_eq!(log.seed(), 1);
    assert_eq!(log.top_health(), 1);
    assert_eq!(log.bot_health(), 12);
    log.verify_final_state(replayed.board()).unwrap();
    assert_eq!(replayed.board(), recorded.board());
}

/// Test that resurrection and armor recharge travel in the header.
#[test]
fn test_header_carries_player_flags() {
    let setup = BattleSetup::new(
        9,
        CardCatalog::standard().family_deck(CardFamily::Rodents),
        CardCatalog::standard().family_deck(CardFamily::Demons),
    )
    .with_resurrection(true, false)
    .with_armor_recharge(0, 3);

    let (log, recorded, replayed) = record_and_replay(&setup);

    assert_eq!(log.setup(), &setup);
    log.verify_final_state(replayed.board()).unwrap();
    assert!(replayed.board().player(PlayerId::TOP).has_resurrection_active);
    assert_eq!(replayed.board().player(PlayerId::BOT).armor_recharge, 3);
    assert_eq!(replayed.board(), recorded.board());
}

/// Test that the header only grows the optional fields when they are used.
#[test]
fn test_plain_header_has_no_start_board() {
    let setup = BattleSetup::new(1, Vec::new(), Vec::new());
    let line = serde_json::to_string(&LogLine::Header(setup)).unwrap();

    assert!(!line.contains("start_board"));
    assert!(line.contains(r#""top_resurrection":false"#));
}

// =============================================================================
// Files
// =============================================================================

/// Test that simulation logs written to disk replay from disk.
#[test]
fn test_file_logs_replay() {
    let dir = scratch_dir("sim-logs");
    let config = SimulationConfig::default().with_iterations(2).with_log_dir(&dir);
    runner(config).run(|_| {});

    let mut logs: Vec<PathBuf> = fs::read_dir(&dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.to_string_lossy().ends_with(BATTLE_LOG_EXTENSION))
        .collect();
    logs.sort();
    assert_eq!(logs.len(), 2);

    for path in &logs {
        let log = BattleDeserializer::open(path).unwrap();
        let engine = replay(&log);
        log.verify_final_state(engine.board()).unwrap();
    }

    fs::remove_dir_all(&dir).unwrap();
}

/// Test that a failed flush keeps its lines and a later flush writes them.
#[test]
fn test_flush_retries_after_failure() {
    let root = scratch_dir("flush-retry");
    fs::create_dir_all(&root).unwrap();
    // A file where the log directory should be.
    let blocked = root.join("logs");
    fs::write(&blocked, b"not a directory").unwrap();

    let setup = BattleSetup::new(3, Vec::new(), Vec::new());
    let mut serializer = BattleSerializer::new("retry", &setup, LogTarget::File(blocked.clone()));
    serializer.record(&ActionDescriptor::new("NextPlayer", ActionParams::new()));

    assert!(serializer.flush().is_err());
    assert_eq!(serializer.pending_len(), 2);

    fs::remove_file(&blocked).unwrap();
    serializer.flush().unwrap();
    assert_eq!(serializer.pending_len(), 0);

    let path = serializer.path().unwrap();
    let log = BattleDeserializer::open(&path).unwrap();
    assert_eq!(log.setup(), &setup);
    assert_eq!(log.actions().len(), 1);

    drop(serializer);
    fs::remove_dir_all(&root).unwrap();
}
