//! Quiz session engine.
//!
//! The engine is a caller-driven state machine. It does not use internal
//! threads or timers - the caller (the async runner, the CLI, or a test)
//! is responsible for calling `tick()` once per logical second.
//!
//! ## State Transitions
//!
//! ```text
//! Loading -> Active -> Finished
//! ```
//!
//! `Active` self-loops across questions. Commands return `Some(Event)` for
//! an accepted transition and `None` for a rejected one; rejections are
//! disallowed UI states, not errors.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new(QuestionSet::default_bank());
//! engine.select_option("Canberra");
//! engine.advance(AdvanceCause::Manual);
//! // In a loop, once per second:
//! engine.tick(); // Returns Some(Event) when the countdown expires
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::question::{Question, QuestionSet};
use crate::events::Event;
use crate::storage::SessionSnapshot;

/// Countdown allotted to every question, in seconds.
pub const DEFAULT_SECONDS_PER_QUESTION: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// No questions available yet; navigation and timers are inert.
    Loading,
    /// One question is current and its countdown may be running.
    Active,
    /// The last question was submitted; results are shown.
    Finished,
}

/// A submitted answer. "Not yet submitted" is the absence of an entry,
/// not a variant: the answers list only covers visited questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Answer {
    Choice(String),
    Skipped,
}

impl From<Option<String>> for Answer {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(option) => Answer::Choice(option),
            None => Answer::Skipped,
        }
    }
}

impl From<Answer> for Option<String> {
    fn from(value: Answer) -> Self {
        match value {
            Answer::Choice(option) => Some(option),
            Answer::Skipped => None,
        }
    }
}

/// Why an advance happened. `Timeout` submits whatever is currently
/// selected (possibly nothing); `Manual` requires a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceCause {
    Manual,
    Timeout,
}

/// One row of the final results view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionReview {
    pub index: usize,
    pub question: String,
    pub your_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Core quiz session state machine.
///
/// Owns the question list, the current position, per-question countdowns,
/// submitted answers, and the navigation/lock rules. Everything here is
/// synchronous and in-memory; persistence and scheduling live elsewhere.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    questions: QuestionSet,
    current_index: usize,
    /// In-progress, unsubmitted choice for the current question.
    selected: Option<String>,
    /// Submitted answers for visited questions, index-aligned.
    answers: Vec<Answer>,
    /// Remaining seconds per question. A zero entry is a permanent lock.
    time_lefts: Vec<u32>,
    show_results: bool,
    dark_mode: bool,
    seconds_per_question: u32,
}

impl SessionEngine {
    /// Create a fresh session over the given bank.
    ///
    /// Starts at the first question with full timers, or in `Loading`
    /// when the bank is empty.
    pub fn new(questions: QuestionSet) -> Self {
        Self::with_time_limit(questions, DEFAULT_SECONDS_PER_QUESTION)
    }

    /// Create a fresh session with a custom per-question allotment.
    pub fn with_time_limit(questions: QuestionSet, seconds_per_question: u32) -> Self {
        let time_lefts = vec![seconds_per_question; questions.len()];
        Self {
            questions,
            current_index: 0,
            selected: None,
            answers: Vec::new(),
            time_lefts,
            show_results: false,
            dark_mode: false,
            seconds_per_question,
        }
    }

    /// Rebuild a session from a persisted snapshot.
    ///
    /// The snapshot's timers are adopted only when their length matches
    /// the bank; otherwise every timer resets to the full allotment while
    /// the other fields are still honored. A stored index past the end of
    /// the bank is clamped. If the restored current question has already
    /// run out of time it is skipped forward exactly as live expiry would
    /// have done, which may finish the session outright.
    pub fn restore(questions: QuestionSet, snapshot: SessionSnapshot) -> Self {
        Self::restore_with_time_limit(questions, snapshot, DEFAULT_SECONDS_PER_QUESTION)
    }

    /// As [`SessionEngine::restore`] with a custom per-question allotment.
    pub fn restore_with_time_limit(
        questions: QuestionSet,
        snapshot: SessionSnapshot,
        seconds_per_question: u32,
    ) -> Self {
        let mut engine = Self::with_time_limit(questions, seconds_per_question);
        engine.adopt(snapshot);
        engine
    }

    fn adopt(&mut self, snapshot: SessionSnapshot) {
        if snapshot.time_lefts.len() == self.questions.len() {
            self.time_lefts = snapshot.time_lefts;
        }
        self.current_index = snapshot
            .current_index
            .min(self.questions.len().saturating_sub(1));
        self.answers = snapshot.user_answers;
        self.answers.truncate(self.questions.len());
        self.dark_mode = snapshot.dark_mode;
        self.selected = self.recorded_choice(self.current_index);
        if self.phase() == SessionPhase::Active && self.time_lefts[self.current_index] == 0 {
            // A question restored with an exhausted timer is auto-skipped
            // without user interaction.
            self.advance(AdvanceCause::Timeout);
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        if self.questions.is_empty() {
            SessionPhase::Loading
        } else if self.show_results {
            SessionPhase::Finished
        } else {
            SessionPhase::Active
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Remaining seconds for the current question.
    pub fn time_left(&self) -> u32 {
        self.time_lefts.get(self.current_index).copied().unwrap_or(0)
    }

    pub fn time_lefts(&self) -> &[u32] {
        &self.time_lefts
    }

    /// Whether a question's countdown has expired, freezing its answer.
    pub fn is_locked(&self, index: usize) -> bool {
        self.time_lefts.get(index).copied() == Some(0)
    }

    pub fn show_results(&self) -> bool {
        self.show_results
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn seconds_per_question(&self) -> u32 {
        self.seconds_per_question
    }

    /// Number of questions with a submitted (non-skipped) answer.
    pub fn answered_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|a| matches!(a, Answer::Choice(_)))
            .count()
    }

    /// Count of submitted answers matching their question's answer.
    /// Derived, never stored; safe to call any number of times.
    pub fn score(&self) -> usize {
        self.answers
            .iter()
            .enumerate()
            .filter(|(i, answer)| match answer {
                Answer::Choice(option) => {
                    self.questions.get(*i).map(|q| &q.answer) == Some(option)
                }
                Answer::Skipped => false,
            })
            .count()
    }

    /// Per-question review rows for the results view.
    pub fn results(&self) -> Vec<QuestionReview> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let your_answer = self.recorded_choice(i);
                let is_correct = your_answer.as_deref() == Some(q.answer.as_str());
                QuestionReview {
                    index: i,
                    question: q.question.clone(),
                    your_answer,
                    correct_answer: q.answer.clone(),
                    is_correct,
                }
            })
            .collect()
    }

    /// 0.0 .. 100.0 position within the quiz, one-based like the view.
    pub fn progress_pct(&self) -> f64 {
        let total = self.questions.len();
        if total == 0 {
            return 0.0;
        }
        if self.show_results {
            return 100.0;
        }
        (self.current_index + 1) as f64 / total as f64 * 100.0
    }

    /// Build a full read-only snapshot event for rendering.
    pub fn snapshot(&self) -> Event {
        let question = self.current_question();
        Event::StateSnapshot {
            phase: self.phase(),
            current_index: self.current_index,
            total_questions: self.questions.len(),
            question: question.map(|q| q.question.clone()),
            difficulty: question.and_then(|q| q.difficulty),
            options: question.map(|q| q.options.clone()).unwrap_or_default(),
            selected_option: self.selected.clone(),
            remaining_secs: self.time_left(),
            total_secs: self.seconds_per_question,
            answered: self.answered_count(),
            dark_mode: self.dark_mode,
            progress_pct: self.progress_pct(),
            at: Utc::now(),
        }
    }

    /// The subset of state that is persisted across restarts.
    pub fn to_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_index: self.current_index,
            user_answers: self.answers.clone(),
            time_lefts: self.time_lefts.clone(),
            dark_mode: self.dark_mode,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Call once per logical second while a question is live.
    ///
    /// Decrements the current countdown, floored at zero. Reaching zero
    /// triggers the auto-advance within the same call, so no further tick
    /// can decrement below zero or advance a second time.
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase() != SessionPhase::Active {
            return None;
        }
        let remaining = &mut self.time_lefts[self.current_index];
        if *remaining == 0 {
            return None;
        }
        *remaining -= 1;
        if *remaining == 0 {
            return self.advance(AdvanceCause::Timeout);
        }
        None
    }

    /// Choose an option on the current question.
    ///
    /// Rejected once the question's countdown has expired, outside the
    /// active phase, or for an option the question does not offer.
    /// Re-selecting the same option is accepted and leaves state unchanged.
    pub fn select_option(&mut self, option: &str) -> Option<Event> {
        if self.phase() != SessionPhase::Active {
            return None;
        }
        if self.time_lefts[self.current_index] == 0 {
            return None;
        }
        let question = self.current_question()?;
        if !question.options.iter().any(|o| o == option) {
            return None;
        }
        self.selected = Some(option.to_string());
        Some(Event::OptionSelected {
            index: self.current_index,
            option: option.to_string(),
            at: Utc::now(),
        })
    }

    /// Submit the current question and move on.
    ///
    /// A manual advance with nothing selected is rejected. The submitted
    /// answer is whatever is selected at this moment, read from the
    /// authoritative state rather than captured earlier. Questions whose
    /// countdown already expired are skipped through without interaction,
    /// each recording its previously stored answer. Advancing from the
    /// last question finishes the session.
    pub fn advance(&mut self, cause: AdvanceCause) -> Option<Event> {
        if self.phase() != SessionPhase::Active {
            return None;
        }
        if cause == AdvanceCause::Manual && self.selected.is_none() {
            return None;
        }
        let from = self.current_index;
        let auto = cause == AdvanceCause::Timeout;
        loop {
            self.record_current_answer();
            if self.current_index + 1 >= self.questions.len() {
                self.show_results = true;
                return Some(Event::QuizFinished {
                    score: self.score(),
                    total: self.questions.len(),
                    at: Utc::now(),
                });
            }
            self.current_index += 1;
            self.selected = self.recorded_choice(self.current_index);
            if self.time_lefts[self.current_index] > 0 {
                return Some(Event::Advanced {
                    from,
                    to: self.current_index,
                    auto,
                    at: Utc::now(),
                });
            }
            // Exhausted question: fall through and submit it as-is.
        }
    }

    /// Return to the previous question.
    ///
    /// Rejected at the first question and when the destination question's
    /// countdown has expired. Timers are untouched; the destination's
    /// countdown resumes from its stored value once it is current again.
    pub fn go_back(&mut self) -> Option<Event> {
        if self.phase() != SessionPhase::Active {
            return None;
        }
        if self.current_index == 0 || self.time_lefts[self.current_index - 1] == 0 {
            return None;
        }
        let from = self.current_index;
        self.current_index -= 1;
        self.selected = self.recorded_choice(self.current_index);
        Some(Event::WentBack {
            from,
            to: self.current_index,
            at: Utc::now(),
        })
    }

    /// Flip the light/dark theme. Independent of quiz progress and
    /// allowed in every phase.
    pub fn toggle_theme(&mut self) -> Option<Event> {
        self.dark_mode = !self.dark_mode;
        Some(Event::ThemeToggled {
            dark_mode: self.dark_mode,
            at: Utc::now(),
        })
    }

    /// Reset to a fresh session over the same bank.
    ///
    /// The theme survives a restart; everything else returns to its
    /// initial value. Clearing persisted state is the caller's job.
    pub fn restart(&mut self) -> Option<Event> {
        self.current_index = 0;
        self.selected = None;
        self.answers.clear();
        self.show_results = false;
        self.time_lefts = vec![self.seconds_per_question; self.questions.len()];
        Some(Event::SessionRestarted { at: Utc::now() })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn record_current_answer(&mut self) {
        let answer = match self.selected.take() {
            Some(option) => Answer::Choice(option),
            None => Answer::Skipped,
        };
        if self.answers.len() <= self.current_index {
            self.answers.resize(self.current_index + 1, Answer::Skipped);
        }
        self.answers[self.current_index] = answer;
    }

    fn recorded_choice(&self, index: usize) -> Option<String> {
        match self.answers.get(index) {
            Some(Answer::Choice(option)) => Some(option.clone()),
            _ => None,
        }
    }
}
