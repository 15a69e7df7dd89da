//! Persisted session snapshots.
//!
//! A single key in the kv store mirrors the live session: current
//! position, submitted answers, remaining timers, and the theme flag.
//! Anything unreadable in that slot is treated as "no saved state" so a
//! corrupt blob can never break startup.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::session::Answer;

use super::Database;

const QUIZ_STATE_KEY: &str = "quiz_state";

/// The serialized subset of session state that survives restarts.
///
/// Wire format (camelCase, answers as string-or-null):
///
/// ```json
/// {"currentIndex":1,"userAnswers":["B",null],"timeLefts":[0,25,30],"darkMode":true}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub current_index: usize,
    #[serde(default)]
    pub user_answers: Vec<Answer>,
    #[serde(default)]
    pub time_lefts: Vec<u32>,
    #[serde(default)]
    pub dark_mode: bool,
}

/// Load/save/clear access to the persisted snapshot slot.
pub struct SnapshotStore<'a> {
    db: &'a Database,
}

impl<'a> SnapshotStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Read the stored snapshot.
    ///
    /// Returns `None` when nothing is stored or the blob does not parse;
    /// a malformed blob is swallowed, never fatal.
    pub fn load(&self) -> Option<SessionSnapshot> {
        let json = self.db.kv_get(QUIZ_STATE_KEY).ok()??;
        serde_json::from_str(&json).ok()
    }

    /// Overwrite the stored snapshot.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails. Callers that
    /// treat persistence as best-effort may ignore it.
    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StorageError> {
        let json = serde_json::to_string(snapshot)
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.db.kv_set(QUIZ_STATE_KEY, &json)
    }

    /// Delete the stored snapshot. Only a restart does this.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.db.kv_delete(QUIZ_STATE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            current_index: 1,
            user_answers: vec![Answer::Choice("B".into()), Answer::Skipped],
            time_lefts: vec![0, 25, 30],
            dark_mode: true,
        }
    }

    #[test]
    fn save_load_roundtrip() {
        let db = Database::open_memory().unwrap();
        let store = SnapshotStore::new(&db);
        assert!(store.load().is_none());
        store.save(&snapshot()).unwrap();
        assert_eq!(store.load().unwrap(), snapshot());
    }

    #[test]
    fn clear_removes_snapshot() {
        let db = Database::open_memory().unwrap();
        let store = SnapshotStore::new(&db);
        store.save(&snapshot()).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn corrupt_blob_loads_as_absent() {
        let db = Database::open_memory().unwrap();
        db.kv_set("quiz_state", "{not json").unwrap();
        assert!(SnapshotStore::new(&db).load().is_none());
    }

    #[test]
    fn wire_format_is_camel_case_with_null_answers() {
        let json = serde_json::to_string(&snapshot()).unwrap();
        assert_eq!(
            json,
            r#"{"currentIndex":1,"userAnswers":["B",null],"timeLefts":[0,25,30],"darkMode":true}"#
        );
    }

    #[test]
    fn missing_optional_fields_default() {
        let parsed: SessionSnapshot =
            serde_json::from_str(r#"{"currentIndex":0,"userAnswers":[],"timeLefts":[]}"#).unwrap();
        assert!(!parsed.dark_mode);
    }
}
