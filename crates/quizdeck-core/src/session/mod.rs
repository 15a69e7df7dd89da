mod engine;
mod question;
mod runner;

pub use engine::{
    AdvanceCause, Answer, QuestionReview, SessionEngine, SessionPhase,
    DEFAULT_SECONDS_PER_QUESTION,
};
pub use question::{Difficulty, Question, QuestionSet};
pub use runner::SessionRunner;
