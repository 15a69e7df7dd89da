use clap::Subcommand;
use quizdeck_core::{
    AdvanceCause, Config, Database, Event, SessionEngine, SessionPhase, SessionRunner,
    SnapshotStore,
};
use tokio::io::AsyncBufReadExt;

use crate::common::{load_engine, load_questions};
use crate::render;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start or resume a session and print its state
    Start,
    /// Print the current session state as JSON
    Status,
    /// Answer the current question (option text or 1-based number)
    Answer {
        /// Option to submit
        option: String,
    },
    /// Submit the current selection and move to the next question
    Next,
    /// Go back to the previous question
    Prev,
    /// Toggle the light/dark theme
    Theme,
    /// Reset the session and clear saved state
    Restart,
    /// Print the per-question results as JSON
    Results,
    /// Play interactively with a live countdown
    Play,
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    if matches!(action, SessionAction::Play) {
        return play();
    }

    let config = Config::load_or_default();
    let questions = load_questions(&config)?;
    let db = Database::open()?;
    let mut engine = load_engine(&db, &config, questions);

    match &action {
        SessionAction::Start | SessionAction::Status => {
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        SessionAction::Answer { option } => {
            let selected = resolve_option(&engine, option);
            let accepted = selected.and_then(|o| engine.select_option(&o));
            let event = match accepted {
                Some(_) => engine.advance(AdvanceCause::Manual),
                None => None,
            };
            print_event_or_snapshot(event, &engine)?;
        }
        SessionAction::Next => {
            let event = engine.advance(AdvanceCause::Manual);
            print_event_or_snapshot(event, &engine)?;
        }
        SessionAction::Prev => {
            let event = engine.go_back();
            print_event_or_snapshot(event, &engine)?;
        }
        SessionAction::Theme => {
            let event = engine.toggle_theme();
            print_event_or_snapshot(event, &engine)?;
        }
        SessionAction::Restart => {
            let event = engine.restart();
            SnapshotStore::new(&db).clear()?;
            print_event_or_snapshot(event, &engine)?;
        }
        SessionAction::Results => {
            let summary = serde_json::json!({
                "score": engine.score(),
                "total": engine.questions().len(),
                "questions": engine.results(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        SessionAction::Play => unreachable!(),
    }

    // Mirror the (possibly auto-advanced) state. A restart leaves the
    // slot empty until the next state-affecting command.
    if !matches!(action, SessionAction::Restart) {
        let _ = SnapshotStore::new(&db).save(&engine.to_snapshot());
    }
    Ok(())
}

/// A rejected command is not an error; print the unchanged state instead.
fn print_event_or_snapshot(
    event: Option<Event>,
    engine: &SessionEngine,
) -> Result<(), Box<dyn std::error::Error>> {
    match event {
        Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
        None => println!("{}", serde_json::to_string_pretty(&engine.snapshot())?),
    }
    Ok(())
}

fn resolve_option(engine: &SessionEngine, raw: &str) -> Option<String> {
    let question = engine.current_question()?;
    pick(&question.options, raw)
}

fn pick(options: &[String], raw: &str) -> Option<String> {
    if let Some(found) = options.iter().find(|o| o.as_str() == raw) {
        return Some(found.clone());
    }
    let n: usize = raw.parse().ok()?;
    options.get(n.checked_sub(1)?).cloned()
}

// ── Interactive mode ─────────────────────────────────────────────────

fn play() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(play_session())
}

async fn play_session() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let questions = load_questions(&config)?;
    let db = Database::open()?;
    let engine = load_engine(&db, &config, questions);

    if engine.phase() == SessionPhase::Loading {
        println!("No questions available.");
        return Ok(());
    }

    let (mut runner, mut events) = SessionRunner::new(engine, db);

    if runner.is_finished().await {
        let reviews = runner.results().await;
        let score = runner.score().await;
        println!("{}", render::results_view(&reviews, score));
        println!("Run `quizdeck session restart` to play again.");
        return Ok(());
    }

    println!("{}", render::HELP_LINE);
    let mut last_index = usize::MAX;
    draw(&runner.snapshot().await, &mut last_index);
    runner.start().await;

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    Event::QuizFinished { .. } => {
                        let reviews = runner.results().await;
                        let score = runner.score().await;
                        println!();
                        println!("{}", render::results_view(&reviews, score));
                        break;
                    }
                    snapshot @ Event::StateSnapshot { .. } => {
                        draw(&snapshot, &mut last_index);
                    }
                    _ => {}
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_input(line.trim(), &mut runner).await {
                    break;
                }
                // Redraw in full after every command.
                last_index = usize::MAX;
                draw(&runner.snapshot().await, &mut last_index);
            }
        }
    }

    runner.shutdown();
    Ok(())
}

/// Returns `false` when the user quits.
async fn handle_input(input: &str, runner: &mut SessionRunner) -> bool {
    match input {
        "q" | "quit" => return false,
        "n" | "next" => {
            runner.advance().await;
        }
        "p" | "prev" => {
            runner.go_back().await;
        }
        "t" | "theme" => {
            runner.toggle_theme().await;
        }
        "r" | "restart" => {
            runner.restart().await;
        }
        "" => {}
        other => {
            let option = match runner.snapshot().await {
                Event::StateSnapshot { options, .. } => pick(&options, other),
                _ => None,
            };
            match option {
                Some(option) => {
                    runner.select_option(&option).await;
                }
                None => println!("unrecognized input: {other}"),
            }
        }
    }
    true
}

fn draw(snapshot: &Event, last_index: &mut usize) {
    let Event::StateSnapshot {
        phase,
        current_index,
        total_questions,
        question,
        difficulty,
        options,
        selected_option,
        remaining_secs,
        dark_mode,
        ..
    } = snapshot
    else {
        return;
    };
    if *phase != SessionPhase::Active {
        return;
    }
    if *current_index == *last_index {
        // Same question: only the countdown moved.
        print!("\r{}", render::countdown_line(*remaining_secs));
        let _ = std::io::Write::flush(&mut std::io::stdout());
        return;
    }
    *last_index = *current_index;
    let Some(question) = question else { return };
    println!();
    print!(
        "{}",
        render::question_block(
            *current_index,
            *total_questions,
            question,
            *difficulty,
            options,
            selected_option.as_deref(),
            *remaining_secs,
            *dark_mode,
        )
    );
    let _ = std::io::Write::flush(&mut std::io::stdout());
}
