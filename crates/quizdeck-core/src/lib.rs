//! # Quizdeck Core Library
//!
//! This library provides the core logic for Quizdeck, a timed
//! multiple-choice quiz. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary, with any richer
//! front end being a thin view layer over the same core library.
//!
//! ## Architecture
//!
//! - **Session Engine**: A caller-driven state machine that requires the
//!   caller to invoke `tick()` once per second for countdown progress
//! - **Session Runner**: Async wrapper owning the live once-per-second
//!   ticker task and the persistence mirror
//! - **Storage**: SQLite key-value snapshot storage and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Core quiz session state machine
//! - [`SessionRunner`]: Live countdown driver
//! - [`SnapshotStore`]: Crash-resilient session snapshot persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod session;
pub mod storage;

pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use session::{
    AdvanceCause, Answer, Difficulty, Question, QuestionReview, QuestionSet, SessionEngine,
    SessionPhase, SessionRunner,
};
pub use storage::{Config, Database, SessionSnapshot, SnapshotStore};
