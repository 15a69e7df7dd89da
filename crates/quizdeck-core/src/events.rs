use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{Difficulty, SessionPhase};

/// Every accepted session command produces an Event.
/// The CLI polls snapshots; the interactive runner streams them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    OptionSelected {
        index: usize,
        option: String,
        at: DateTime<Utc>,
    },
    /// Moved forward to another question. `auto` is set when the move was
    /// triggered by timer expiry rather than an explicit "next".
    Advanced {
        from: usize,
        to: usize,
        auto: bool,
        at: DateTime<Utc>,
    },
    WentBack {
        from: usize,
        to: usize,
        at: DateTime<Utc>,
    },
    ThemeToggled {
        dark_mode: bool,
        at: DateTime<Utc>,
    },
    SessionRestarted {
        at: DateTime<Utc>,
    },
    /// The last question was submitted; results are available.
    QuizFinished {
        score: usize,
        total: usize,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: SessionPhase,
        current_index: usize,
        total_questions: usize,
        question: Option<String>,
        difficulty: Option<Difficulty>,
        options: Vec<String>,
        selected_option: Option<String>,
        remaining_secs: u32,
        total_secs: u32,
        answered: usize,
        dark_mode: bool,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}
