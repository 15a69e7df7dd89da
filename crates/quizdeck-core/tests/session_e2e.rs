//! End-to-end session scenarios.
//!
//! Drives the engine and the snapshot store together the way the CLI
//! does: commands mutate in-memory state, the snapshot mirror lands in a
//! real (temporary) SQLite file, and a later "process" restores from it.

use proptest::prelude::*;
use tempfile::TempDir;

use quizdeck_core::{
    AdvanceCause, Answer, Database, Event, Question, QuestionSet, SessionEngine, SessionPhase,
    SessionSnapshot, SnapshotStore,
};

fn bank_answer_b(n: usize) -> QuestionSet {
    let questions = (0..n)
        .map(|i| Question {
            id: i as u32 + 1,
            question: format!("Question {}?", i + 1),
            options: vec!["A".into(), "B".into(), "C".into()],
            answer: "B".into(),
            difficulty: None,
        })
        .collect();
    QuestionSet::new(questions).unwrap()
}

fn temp_db() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db = Database::open_at(&dir.path().join("quizdeck.db")).unwrap();
    (dir, db)
}

#[test]
fn scenario_manual_answers_score_two_of_three() {
    let mut engine = SessionEngine::new(bank_answer_b(3));

    engine.select_option("B").unwrap();
    engine.advance(AdvanceCause::Manual).unwrap();
    engine.select_option("A").unwrap();
    engine.advance(AdvanceCause::Manual).unwrap();
    engine.select_option("B").unwrap();
    let event = engine.advance(AdvanceCause::Manual).unwrap();

    assert!(engine.show_results());
    assert_eq!(engine.score(), 2);
    assert!(matches!(
        event,
        Event::QuizFinished { score: 2, total: 3, .. }
    ));
}

#[test]
fn scenario_timeout_locks_first_question() {
    let mut engine = SessionEngine::new(bank_answer_b(3));
    let mut advances = 0;
    for _ in 0..30 {
        if engine.tick().is_some() {
            advances += 1;
        }
    }
    assert_eq!(advances, 1);
    assert_eq!(engine.current_index(), 1);
    assert_eq!(engine.answers(), &[Answer::Skipped]);
    // The exhausted question is locked against backward navigation.
    assert!(engine.go_back().is_none());
    assert_eq!(engine.current_index(), 1);
}

#[test]
fn scenario_finish_then_ticks_are_inert() {
    let mut engine = SessionEngine::new(bank_answer_b(2));
    engine.select_option("B").unwrap();
    engine.advance(AdvanceCause::Manual).unwrap();
    engine.tick();
    engine.select_option("C").unwrap();
    engine.advance(AdvanceCause::Manual).unwrap();

    assert_eq!(engine.phase(), SessionPhase::Finished);
    let timers = engine.time_lefts().to_vec();
    for _ in 0..10 {
        assert!(engine.tick().is_none());
    }
    assert_eq!(engine.time_lefts(), &timers[..]);
    assert_eq!(engine.score(), 1);
}

#[test]
fn state_survives_a_restart_of_the_process() {
    let (_dir, db) = temp_db();
    let store = SnapshotStore::new(&db);

    let mut engine = SessionEngine::new(bank_answer_b(3));
    engine.toggle_theme();
    engine.select_option("B");
    engine.advance(AdvanceCause::Manual);
    for _ in 0..7 {
        engine.tick();
    }
    store.save(&engine.to_snapshot()).unwrap();

    // "Reload": a new engine restored from storage.
    let restored = SessionEngine::restore(bank_answer_b(3), store.load().unwrap());
    assert_eq!(restored.current_index(), 1);
    assert_eq!(restored.answers(), engine.answers());
    assert_eq!(restored.time_lefts(), engine.time_lefts());
    assert!(restored.dark_mode());
}

#[test]
fn legacy_blob_is_readable() {
    let (_dir, db) = temp_db();
    db.kv_set(
        "quiz_state",
        r#"{"currentIndex":1,"userAnswers":["B",null],"timeLefts":[0,25,30],"darkMode":true}"#,
    )
    .unwrap();

    let snapshot = SnapshotStore::new(&db).load().unwrap();
    let engine = SessionEngine::restore(bank_answer_b(3), snapshot);
    assert_eq!(engine.current_index(), 1);
    assert_eq!(engine.answers()[0], Answer::Choice("B".into()));
    assert!(engine.dark_mode());
    assert!(engine.is_locked(0));
}

#[test]
fn corrupt_blob_falls_back_to_fresh_state() {
    let (_dir, db) = temp_db();
    db.kv_set("quiz_state", "\u{1}garbage\u{2}").unwrap();
    assert!(SnapshotStore::new(&db).load().is_none());
}

#[test]
fn mismatched_timer_count_resets_timers_only() {
    let snapshot = SessionSnapshot {
        current_index: 2,
        user_answers: vec![Answer::Choice("B".into()), Answer::Skipped],
        time_lefts: vec![3, 3, 3, 3, 3],
        dark_mode: true,
    };
    let engine = SessionEngine::restore(bank_answer_b(3), snapshot);
    assert_eq!(engine.time_lefts(), &[30, 30, 30]);
    assert_eq!(engine.current_index(), 2);
    assert_eq!(engine.answers().len(), 2);
    assert!(engine.dark_mode());
}

#[test]
fn restart_clears_the_stored_snapshot() {
    let (_dir, db) = temp_db();
    let store = SnapshotStore::new(&db);

    let mut engine = SessionEngine::new(bank_answer_b(3));
    engine.select_option("A");
    engine.advance(AdvanceCause::Manual);
    store.save(&engine.to_snapshot()).unwrap();
    assert!(store.load().is_some());

    engine.restart();
    store.clear().unwrap();
    assert!(store.load().is_none());
    assert_eq!(engine.current_index(), 0);
}

proptest! {
    /// Arbitrary command sequences never break the core invariants:
    /// timers never underflow or grow, a locked question stays locked,
    /// the index stays in range, and the score is bounded by the bank.
    #[test]
    fn command_sequences_preserve_invariants(ops in proptest::collection::vec(0u8..5, 0..120)) {
        let n = 4;
        let mut engine = SessionEngine::new(bank_answer_b(n));
        let mut ever_locked = vec![false; n];

        for op in ops {
            match op {
                0 => { engine.tick(); }
                1 => { engine.select_option("B"); }
                2 => { engine.select_option("A"); }
                3 => { engine.advance(AdvanceCause::Manual); }
                _ => { engine.go_back(); }
            }

            prop_assert_eq!(engine.time_lefts().len(), n);
            for (i, &t) in engine.time_lefts().iter().enumerate() {
                prop_assert!(t <= 30);
                if ever_locked[i] {
                    prop_assert_eq!(t, 0);
                }
                if t == 0 {
                    ever_locked[i] = true;
                }
            }
            prop_assert!(engine.score() <= n);
            prop_assert!(engine.answers().len() <= n);
            if engine.phase() == SessionPhase::Active {
                prop_assert!(engine.current_index() < n);
                prop_assert!(engine.time_lefts()[engine.current_index()] > 0);
            }
        }
    }

    /// Score is a pure function of answers: recomputing never changes it.
    #[test]
    fn score_is_stable_across_reads(ticks in 0usize..70) {
        let mut engine = SessionEngine::new(bank_answer_b(2));
        engine.select_option("B");
        for _ in 0..ticks {
            engine.tick();
        }
        let first = engine.score();
        prop_assert_eq!(engine.score(), first);
        prop_assert_eq!(engine.score(), first);
    }
}
