//! Live session driver.
//!
//! [`SessionRunner`] wraps a [`SessionEngine`] with the one piece of real
//! concurrency in the system: the once-per-second countdown. The runner
//! owns a single ticker task handle; every transition that moves to a
//! different question or ends the session cancels the old ticker before
//! a new one may start, so at most one countdown is ever live and a stale
//! one can never decrement the wrong question.
//!
//! Each accepted command mutates the engine under its lock, mirrors the
//! snapshot to storage (best-effort, failures ignored), and emits the
//! event to subscribers. The ticker reads the engine state it acts on
//! under the same lock, so an expiry always submits the latest selection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::events::Event;
use crate::session::{AdvanceCause, QuestionReview, SessionEngine, SessionPhase};
use crate::storage::{Database, SnapshotStore};

struct Shared {
    engine: Mutex<SessionEngine>,
    db: std::sync::Mutex<Database>,
    /// Bumped on every rearm; an aborted-but-still-running ticker task
    /// sees a stale value under the engine lock and exits without acting.
    generation: AtomicU64,
    events: mpsc::UnboundedSender<Event>,
}

impl Shared {
    fn persist(&self, engine: &SessionEngine) {
        let snapshot = engine.to_snapshot();
        if let Ok(db) = self.db.lock() {
            let _ = SnapshotStore::new(&db).save(&snapshot);
        }
    }

    fn clear_saved(&self) {
        if let Ok(db) = self.db.lock() {
            let _ = SnapshotStore::new(&db).clear();
        }
    }

    fn emit(&self, event: Event) {
        let _ = self.events.send(event);
    }
}

/// Async driver owning the engine, its persistence mirror, and the live
/// countdown task.
pub struct SessionRunner {
    shared: Arc<Shared>,
    ticker: Option<JoinHandle<()>>,
}

impl SessionRunner {
    /// Wrap an engine and a database. Returns the runner and the event
    /// stream subscribers read from.
    pub fn new(
        engine: SessionEngine,
        db: Database,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            engine: Mutex::new(engine),
            db: std::sync::Mutex::new(db),
            generation: AtomicU64::new(0),
            events: tx,
        });
        (
            Self {
                shared,
                ticker: None,
            },
            rx,
        )
    }

    /// Arm the countdown for the current question.
    pub async fn start(&mut self) {
        self.rearm().await;
    }

    /// Choose an option on the current question. Selection does not move
    /// the countdown, so the ticker is left running.
    pub async fn select_option(&mut self, option: &str) -> Option<Event> {
        let event = {
            let mut engine = self.shared.engine.lock().await;
            let event = engine.select_option(option)?;
            self.shared.persist(&engine);
            event
        };
        self.shared.emit(event.clone());
        Some(event)
    }

    /// Submit the current selection and move to the next question.
    pub async fn advance(&mut self) -> Option<Event> {
        let event = {
            let mut engine = self.shared.engine.lock().await;
            let event = engine.advance(AdvanceCause::Manual)?;
            self.shared.persist(&engine);
            event
        };
        self.shared.emit(event.clone());
        self.rearm().await;
        Some(event)
    }

    /// Return to the previous question.
    pub async fn go_back(&mut self) -> Option<Event> {
        let event = {
            let mut engine = self.shared.engine.lock().await;
            let event = engine.go_back()?;
            self.shared.persist(&engine);
            event
        };
        self.shared.emit(event.clone());
        self.rearm().await;
        Some(event)
    }

    /// Flip the theme.
    pub async fn toggle_theme(&mut self) -> Option<Event> {
        let event = {
            let mut engine = self.shared.engine.lock().await;
            let event = engine.toggle_theme()?;
            self.shared.persist(&engine);
            event
        };
        self.shared.emit(event.clone());
        Some(event)
    }

    /// Reset the session and delete the saved snapshot. The next
    /// state-affecting command (or tick) writes a fresh one.
    pub async fn restart(&mut self) -> Option<Event> {
        let event = {
            let mut engine = self.shared.engine.lock().await;
            let event = engine.restart()?;
            self.shared.clear_saved();
            event
        };
        self.shared.emit(event.clone());
        self.rearm().await;
        Some(event)
    }

    /// Read-only snapshot of the current state.
    pub async fn snapshot(&self) -> Event {
        self.shared.engine.lock().await.snapshot()
    }

    pub async fn results(&self) -> Vec<QuestionReview> {
        self.shared.engine.lock().await.results()
    }

    pub async fn score(&self) -> usize {
        self.shared.engine.lock().await.score()
    }

    pub async fn is_finished(&self) -> bool {
        self.shared.engine.lock().await.phase() == SessionPhase::Finished
    }

    /// Cancel the ticker and drop the runner. No periodic work survives.
    pub fn shutdown(mut self) {
        self.cancel_ticker();
    }

    fn cancel_ticker(&mut self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    /// Cancel-then-restart the countdown. Cancellation always comes
    /// first; a new ticker is spawned only while a question is live.
    async fn rearm(&mut self) {
        self.cancel_ticker();
        let generation = self.shared.generation.load(Ordering::SeqCst);
        if self.shared.engine.lock().await.phase() != SessionPhase::Active {
            return;
        }
        let shared = Arc::clone(&self.shared);
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first interval tick completes immediately; skip it.
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut engine = shared.engine.lock().await;
                if shared.generation.load(Ordering::SeqCst) != generation {
                    break;
                }
                if engine.phase() != SessionPhase::Active {
                    break;
                }
                let event = engine.tick();
                shared.persist(&engine);
                let snapshot = engine.snapshot();
                let finished = engine.phase() == SessionPhase::Finished;
                drop(engine);
                if let Some(event) = event {
                    shared.emit(event);
                }
                shared.emit(snapshot);
                if finished {
                    break;
                }
            }
        }));
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Answer, Question, QuestionSet};

    fn bank(n: usize) -> QuestionSet {
        let questions = (0..n)
            .map(|i| Question {
                id: i as u32 + 1,
                question: format!("Question {}?", i + 1),
                options: vec!["A".into(), "B".into()],
                answer: "B".into(),
                difficulty: None,
            })
            .collect();
        QuestionSet::new(questions).unwrap()
    }

    fn runner_with(
        n: usize,
        limit: u32,
    ) -> (SessionRunner, mpsc::UnboundedReceiver<Event>) {
        let engine = SessionEngine::with_time_limit(bank(n), limit);
        let db = Database::open_memory().unwrap();
        SessionRunner::new(engine, db)
    }

    async fn saved_snapshot(runner: &SessionRunner) -> Option<crate::storage::SessionSnapshot> {
        let db = runner.shared.db.lock().unwrap();
        SnapshotStore::new(&db).load()
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_counts_down_current_question_only() {
        let (mut runner, _rx) = runner_with(3, 30);
        runner.start().await;
        tokio::time::sleep(Duration::from_millis(3_100)).await;
        let engine = runner.shared.engine.lock().await;
        assert_eq!(engine.time_lefts(), &[27, 30, 30]);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_advances_and_persists() {
        let (mut runner, mut rx) = runner_with(2, 2);
        runner.start().await;
        tokio::time::sleep(Duration::from_millis(2_100)).await;
        {
            let engine = runner.shared.engine.lock().await;
            assert_eq!(engine.current_index(), 1);
            assert_eq!(engine.answers(), &[Answer::Skipped]);
        }
        let saved = saved_snapshot(&runner).await.unwrap();
        assert_eq!(saved.current_index, 1);
        assert_eq!(saved.time_lefts[0], 0);

        let mut saw_auto_advance = false;
        while let Ok(event) = rx.try_recv() {
            if let Event::Advanced { auto: true, .. } = event {
                saw_auto_advance = true;
            }
        }
        assert!(saw_auto_advance);
    }

    #[tokio::test(start_paused = true)]
    async fn finish_stops_the_ticker() {
        let (mut runner, mut rx) = runner_with(1, 1);
        runner.start().await;
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert!(runner.is_finished().await);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(runner.ticker.as_ref().unwrap().is_finished());

        let mut finished_events = 0;
        while let Ok(event) = rx.try_recv() {
            if let Event::QuizFinished { .. } = event {
                finished_events += 1;
            }
        }
        assert_eq!(finished_events, 1);
        // Nothing ticked after the finish.
        let engine = runner.shared.engine.lock().await;
        assert_eq!(engine.time_lefts(), &[0]);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_advance_rearms_the_countdown() {
        let (mut runner, _rx) = runner_with(3, 5);
        runner.start().await;
        tokio::time::sleep(Duration::from_millis(2_100)).await;
        runner.select_option("B").await.unwrap();
        runner.advance().await.unwrap();
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        let engine = runner.shared.engine.lock().await;
        assert_eq!(engine.time_lefts(), &[3, 4, 5]);
        assert_eq!(engine.current_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_clears_saved_state() {
        let (mut runner, _rx) = runner_with(2, 30);
        runner.start().await;
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert!(saved_snapshot(&runner).await.is_some());
        runner.restart().await.unwrap();
        assert!(saved_snapshot(&runner).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_periodic_work() {
        let (mut runner, _rx) = runner_with(2, 30);
        runner.start().await;
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        let shared = Arc::clone(&runner.shared);
        runner.shutdown();
        tokio::time::sleep(Duration::from_secs(5)).await;
        let engine = shared.engine.lock().await;
        // Only the pre-shutdown tick landed.
        assert_eq!(engine.time_left(), 29);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_commands_emit_nothing() {
        let (mut runner, mut rx) = runner_with(2, 30);
        runner.start().await;
        assert!(runner.advance().await.is_none());
        assert!(runner.go_back().await.is_none());
        assert!(runner.select_option("nope").await.is_none());
        assert!(rx.try_recv().is_err());
    }
}
