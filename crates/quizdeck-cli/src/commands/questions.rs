use clap::Subcommand;
use quizdeck_core::Config;

use crate::common::load_questions;

#[derive(Subcommand)]
pub enum QuestionsAction {
    /// List the active question bank
    List,
    /// Show one question as JSON, including its answer
    Show {
        /// Question id
        id: u32,
    },
}

pub fn run(action: QuestionsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let questions = load_questions(&config)?;

    match action {
        QuestionsAction::List => {
            for q in questions.iter() {
                let difficulty = q
                    .difficulty
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{:>3}  {:<8} {}", q.id, difficulty, q.question);
            }
        }
        QuestionsAction::Show { id } => match questions.by_id(id) {
            Some(q) => println!("{}", serde_json::to_string_pretty(q)?),
            None => {
                eprintln!("unknown question id: {id}");
                std::process::exit(1);
            }
        },
    }
    Ok(())
}
