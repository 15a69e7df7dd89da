//! Terminal rendering for interactive play.
//!
//! The view layer: question text, numbered options with a selection
//! marker, a progress bar, the countdown line, and the final results.

use quizdeck_core::{Difficulty, QuestionReview};

pub const HELP_LINE: &str = "commands: 1-9 select, n next, p prev, t theme, r restart, q quit";

pub fn progress_bar(position: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (position * width / total).min(width)
    };
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn countdown_line(remaining: u32) -> String {
    format!("Time left: {remaining:>2}s  ")
}

#[allow(clippy::too_many_arguments)]
pub fn question_block(
    index: usize,
    total: usize,
    question: &str,
    difficulty: Option<Difficulty>,
    options: &[String],
    selected: Option<&str>,
    remaining: u32,
    dark_mode: bool,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Question {} of {}  {}  theme: {}\n",
        index + 1,
        total,
        progress_bar(index + 1, total, 20),
        if dark_mode { "dark" } else { "light" },
    ));
    out.push('\n');
    out.push_str(&format!("  {question}\n"));
    if let Some(difficulty) = difficulty {
        out.push_str(&format!("  Difficulty: {difficulty}\n"));
    }
    out.push('\n');
    for (i, option) in options.iter().enumerate() {
        let marker = if selected == Some(option.as_str()) {
            '>'
        } else {
            ' '
        };
        out.push_str(&format!(" {marker} {}) {option}\n", i + 1));
    }
    out.push('\n');
    out.push_str(&countdown_line(remaining));
    out
}

pub fn results_view(reviews: &[QuestionReview], score: usize) -> String {
    let total = reviews.len();
    let mut out = String::new();
    out.push_str("Your Results\n");
    out.push_str(&format!("You scored {score} / {total}\n\n"));
    for review in reviews {
        out.push_str(&format!("Q{}: {}\n", review.index + 1, review.question));
        match &review.your_answer {
            Some(answer) if review.is_correct => {
                out.push_str(&format!("    your answer: {answer} (correct)\n"));
            }
            Some(answer) => {
                out.push_str(&format!("    your answer: {answer} (wrong)\n"));
            }
            None => out.push_str("    no answer\n"),
        }
        if !review.is_correct {
            out.push_str(&format!("    correct answer: {}\n", review.correct_answer));
        }
    }
    out
}
