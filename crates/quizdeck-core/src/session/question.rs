use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// One multiple-choice question. Immutable once the bank is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    /// Must match exactly one entry in `options`.
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// An ordered, validated question bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    /// Validate and wrap a list of questions.
    ///
    /// # Errors
    /// Rejects an empty bank, questions with empty text, fewer than two
    /// options, duplicate options, an answer missing from the options,
    /// and duplicate ids.
    pub fn new(questions: Vec<Question>) -> Result<Self, ValidationError> {
        if questions.is_empty() {
            return Err(ValidationError::EmptyBank);
        }
        let mut seen_ids = Vec::with_capacity(questions.len());
        for q in &questions {
            if q.question.trim().is_empty() {
                return Err(ValidationError::EmptyText { id: q.id });
            }
            if q.options.len() < 2 {
                return Err(ValidationError::TooFewOptions { id: q.id });
            }
            for (i, option) in q.options.iter().enumerate() {
                if q.options[..i].contains(option) {
                    return Err(ValidationError::DuplicateOption {
                        id: q.id,
                        option: option.clone(),
                    });
                }
            }
            if !q.options.contains(&q.answer) {
                return Err(ValidationError::AnswerNotInOptions { id: q.id });
            }
            if seen_ids.contains(&q.id) {
                return Err(ValidationError::DuplicateId(q.id));
            }
            seen_ids.push(q.id);
        }
        Ok(Self { questions })
    }

    /// An empty bank. A session built on it stays in the loading phase.
    pub fn empty() -> Self {
        Self {
            questions: Vec::new(),
        }
    }

    /// The built-in bank used when no custom questions file is configured.
    pub fn default_bank() -> Self {
        let q = |id: u32, text: &str, options: &[&str], answer: &str, difficulty| Question {
            id,
            question: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer: answer.to_string(),
            difficulty,
        };
        Self {
            questions: vec![
                q(
                    1,
                    "What is the capital of Australia?",
                    &["Sydney", "Melbourne", "Canberra", "Perth"],
                    "Canberra",
                    Some(Difficulty::Easy),
                ),
                q(
                    2,
                    "Which element has the chemical symbol 'Au'?",
                    &["Silver", "Gold", "Copper", "Aluminium"],
                    "Gold",
                    Some(Difficulty::Easy),
                ),
                q(
                    3,
                    "How many bits are in a byte?",
                    &["4", "8", "16", "32"],
                    "8",
                    Some(Difficulty::Easy),
                ),
                q(
                    4,
                    "Which planet has the most confirmed moons?",
                    &["Jupiter", "Saturn", "Uranus", "Neptune"],
                    "Saturn",
                    Some(Difficulty::Medium),
                ),
                q(
                    5,
                    "Who composed the Brandenburg Concertos?",
                    &["Mozart", "Beethoven", "Bach", "Vivaldi"],
                    "Bach",
                    Some(Difficulty::Medium),
                ),
                q(
                    6,
                    "In which year did the World Wide Web open to the public?",
                    &["1989", "1991", "1993", "1995"],
                    "1991",
                    Some(Difficulty::Hard),
                ),
                q(
                    7,
                    "What is the largest desert on Earth?",
                    &["Sahara", "Gobi", "Antarctic", "Arabian"],
                    "Antarctic",
                    Some(Difficulty::Hard),
                ),
                q(
                    8,
                    "What does CPU stand for?",
                    &[
                        "Central Processing Unit",
                        "Computer Personal Unit",
                        "Central Program Utility",
                        "Core Processing Unit",
                    ],
                    "Central Processing Unit",
                    Some(Difficulty::Easy),
                ),
            ],
        }
    }

    /// Parse a bank from a JSON array of question records.
    ///
    /// # Errors
    /// Returns a JSON error for malformed input or a validation error for
    /// a structurally invalid bank.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Ok(Self::new(questions)?)
    }

    /// Load a bank from a JSON file.
    ///
    /// # Errors
    /// Returns an IO error if the file cannot be read, otherwise as
    /// [`QuestionSet::from_json_str`].
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn by_id(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}
