use std::time::{Duration, Instant};

use dotdash::config::Config;
use dotdash::engine::ledger::{MasteryLedger, QuizGate};
use dotdash::engine::unlock::PracticeSet;
use dotdash::morse::MorseSymbol;
use dotdash::session::input::{InputEvent, InputQueue};
use dotdash::session::picker::TargetPicker;
use dotdash::session::practice::{PracticeMode, PracticeSession, RoundOutcome, SessionState};
use dotdash::store::json_store::JsonStore;
use dotdash::store::schema::{AttemptHistoryData, ProfileData};
use tempfile::TempDir;

fn start(mode: PracticeMode, set: Vec<char>, seed: u64) -> PracticeSession {
    let config = Config::default();
    PracticeSession::new(
        mode,
        config.mode_rules(mode),
        config.round_delays(),
        set,
        TargetPicker::with_seed(seed),
    )
    .unwrap()
}

/// Keys the current target's code through the input queue.
fn answer(
    session: &mut PracticeSession,
    queue: &InputQueue,
    correct: bool,
    now: Instant,
) -> Vec<RoundOutcome> {
    let code = session.target().unwrap().code().as_str().to_string();
    for ch in code.chars() {
        let symbol = MorseSymbol::from_char(ch).unwrap();
        let symbol = if correct {
            symbol
        } else if symbol == MorseSymbol::Dot {
            MorseSymbol::Dash
        } else {
            MorseSymbol::Dot
        };
        queue.push(InputEvent::Symbol(symbol));
    }
    queue
        .drain()
        .into_iter()
        .filter_map(|event| session.handle_input(event, now))
        .collect()
}

#[test]
fn mastering_the_starting_set_unlocks_the_next_character() {
    let config = Config::default();
    let thresholds = config.mastery_thresholds();
    let queue = InputQueue::new();
    let mut ledger = MasteryLedger::new();
    let mut set = PracticeSet::new();
    let mut session = start(PracticeMode::Drill, set.included.clone(), 42);

    let mut now = Instant::now();
    let mut unlocked = None;
    for _ in 0..200 {
        for outcome in answer(&mut session, &queue, true, now) {
            ledger.report_outcome(outcome.character, outcome.success);
            if let Some(ch) = set.update(&ledger, &thresholds) {
                unlocked = Some(ch);
            }
            session.set_practice_set(set.included.clone());
        }
        if unlocked.is_some() {
            break;
        }
        now += Duration::from_secs(1);
        assert!(session.poll(now));
    }

    assert_eq!(unlocked, Some('E'));
    assert!(set.is_unlocked('E'));
    assert_eq!(
        ledger.quiz_gate(&thresholds, config.quiz_unlock_count),
        QuizGate::Unlocked
    );
}

#[test]
fn drill_failure_retries_the_same_character() {
    let queue = InputQueue::new();
    let mut session = start(PracticeMode::Drill, vec!['A', 'B', 'C', 'D'], 7);
    let target = session.target().unwrap().character();
    let now = Instant::now();

    let outcomes = answer(&mut session, &queue, false, now);
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].success);
    assert_eq!(session.state(), SessionState::LockedFailure);

    assert!(session.poll(now + Duration::from_secs(2)));
    assert_eq!(session.target().unwrap().character(), target);
    assert_eq!(session.buffer(), "");
}

#[test]
fn outcomes_persist_and_rebuild_identically() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let queue = InputQueue::new();
    let mut ledger = MasteryLedger::new();
    let mut session = start(PracticeMode::FreeType, vec!['K', 'M', 'R'], 3);

    let mut now = Instant::now();
    for round in 0..12 {
        for outcome in answer(&mut session, &queue, round % 4 != 0, now) {
            ledger.report_outcome(outcome.character, outcome.success);
        }
        now += Duration::from_secs(2);
        session.poll(now);
    }
    assert_eq!(ledger.history().len(), 12);

    store
        .save_history(&AttemptHistoryData {
            attempts: ledger.history().to_vec(),
            ..Default::default()
        })
        .unwrap();
    store
        .save_profile(&ProfileData {
            unlocked: vec!['K', 'M', 'R'],
            ..Default::default()
        })
        .unwrap();

    let reloaded = MasteryLedger::from_history(store.load_history().attempts);
    assert_eq!(reloaded.stats(), ledger.stats());

    let set = PracticeSet::from_included(store.load_profile().unwrap().unlocked);
    // Restored sets are topped up to the minimum size
    assert_eq!(set.unlocked_count(), 4);
    assert!(set.is_unlocked('K'));
}

#[test]
fn export_import_moves_progress_between_stores() {
    let src_dir = TempDir::new().unwrap();
    let dst_dir = TempDir::new().unwrap();
    let src = JsonStore::with_base_dir(src_dir.path().to_path_buf()).unwrap();
    let dst = JsonStore::with_base_dir(dst_dir.path().to_path_buf()).unwrap();

    let mut ledger = MasteryLedger::new();
    for _ in 0..5 {
        ledger.report_outcome('A', true);
    }
    src.save_history(&AttemptHistoryData {
        attempts: ledger.history().to_vec(),
        ..Default::default()
    })
    .unwrap();

    let file = src_dir.path().join("export.json");
    src.export_to_file(&Config::default(), &file).unwrap();
    dst.import_from_file(&file).unwrap();

    let imported = MasteryLedger::from_history(dst.load_history().attempts);
    assert_eq!(imported.accuracy('A'), 100.0);
    assert_eq!(imported.history().len(), 5);
}
