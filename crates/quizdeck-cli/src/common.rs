use quizdeck_core::{Config, Database, QuestionSet, SessionEngine, SnapshotStore};

/// The active bank: the configured questions file, or the built-in bank.
pub fn load_questions(config: &Config) -> Result<QuestionSet, Box<dyn std::error::Error>> {
    match &config.quiz.questions_file {
        Some(path) => Ok(QuestionSet::from_json_file(path)?),
        None => Ok(QuestionSet::default_bank()),
    }
}

/// Restore the saved session, or start a fresh one seeded with the
/// configured theme.
pub fn load_engine(db: &Database, config: &Config, questions: QuestionSet) -> SessionEngine {
    let limit = config.quiz.seconds_per_question;
    match SnapshotStore::new(db).load() {
        Some(snapshot) => SessionEngine::restore_with_time_limit(questions, snapshot, limit),
        None => {
            let mut engine = SessionEngine::with_time_limit(questions, limit);
            if config.ui.dark_mode {
                engine.toggle_theme();
            }
            engine
        }
    }
}
