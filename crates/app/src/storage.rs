//! Persistent cart storage.
//!
//! Durable mirror of the in-memory cart, one slot per store. Loads never
//! fail: an absent slot, unreadable storage or malformed content all
//! degrade to an empty cart, so a shopper starts fresh instead of being
//! locked out. Saves are full overwrites of the slot.

use std::{fs, io, path::PathBuf};

use mockall::automock;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::warn;

use trolley::items::LineItem;

/// Errors raised when a cart slot cannot be written.
#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error("cart slot is not writable: {0}")]
    Io(#[from] io::Error),

    #[error("cart lines could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable store for the current cart lines.
#[automock]
pub trait CartStore: Send + Sync {
    /// Loads the stored line sequence.
    ///
    /// Absent slots and corrupt content both yield an empty sequence;
    /// reads never surface an error.
    fn load(&self) -> Vec<LineItem>;

    /// Overwrites the slot with the full current line sequence.
    ///
    /// # Errors
    ///
    /// Returns a `CartStoreError` when the slot cannot be written.
    /// Callers are expected to log and continue with in-memory state.
    fn save(&self, lines: &[LineItem]) -> Result<(), CartStoreError>;
}

/// File-backed store holding one JSON document per slot.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store over `path`; the file appears on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CartStore for JsonFileStore {
    fn load(&self) -> Vec<LineItem> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(error) => {
                warn!(path = %self.path.display(), "cart slot unreadable, starting empty: {error}");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(lines) => lines,
            Err(error) => {
                warn!(path = %self.path.display(), "cart slot corrupt, starting empty: {error}");
                Vec::new()
            }
        }
    }

    fn save(&self, lines: &[LineItem]) -> Result<(), CartStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let payload = serde_json::to_string(lines)?;
        fs::write(&self.path, payload)?;

        Ok(())
    }
}

/// In-memory store for tests and examples.
///
/// The slot holds the serialized JSON document rather than the lines
/// themselves, so the parse-or-degrade path is exercised the same way
/// the file store exercises it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Creates a store with an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose slot already holds `raw`, valid or not.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }
}

impl CartStore for MemoryStore {
    fn load(&self) -> Vec<LineItem> {
        let slot = self.slot.lock();

        let Some(raw) = slot.as_deref() else {
            return Vec::new();
        };

        match serde_json::from_str(raw) {
            Ok(lines) => lines,
            Err(error) => {
                warn!("cart slot corrupt, starting empty: {error}");
                Vec::new()
            }
        }
    }

    fn save(&self, lines: &[LineItem]) -> Result<(), CartStoreError> {
        let payload = serde_json::to_string(lines)?;
        *self.slot.lock() = Some(payload);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use trolley::{fixtures, items::LineItem};

    use super::*;

    fn lines() -> Vec<LineItem> {
        vec![
            LineItem::try_from(fixtures::socks(2)).expect("fixture should validate"),
            LineItem::try_from(fixtures::lamp(1)).expect("fixture should validate"),
        ]
    }

    #[test]
    fn file_store_round_trips_lines() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path().join("cart.json"));
        let lines = lines();

        store.save(&lines)?;

        assert_eq!(store.load(), lines);

        Ok(())
    }

    #[test]
    fn file_store_loads_empty_when_no_slot_exists() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path().join("missing.json"));

        assert_eq!(store.load(), Vec::new());

        Ok(())
    }

    #[test]
    fn file_store_treats_corrupt_content_as_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cart.json");
        std::fs::write(&path, "{not json")?;

        let store = JsonFileStore::new(path);

        assert_eq!(store.load(), Vec::new());

        Ok(())
    }

    #[test]
    fn file_store_treats_wrong_shape_as_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cart.json");
        std::fs::write(&path, r#"{"cart": "not a sequence"}"#)?;

        let store = JsonFileStore::new(path);

        assert_eq!(store.load(), Vec::new());

        Ok(())
    }

    #[test]
    fn file_store_save_creates_missing_parent_directories() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path().join("nested/slots/cart.json"));

        store.save(&lines())?;

        assert_eq!(store.load().len(), 2);

        Ok(())
    }

    #[test]
    fn save_overwrites_the_previous_slot_contents() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path().join("cart.json"));

        store.save(&lines())?;
        store.save(&[])?;

        assert_eq!(store.load(), Vec::new());

        Ok(())
    }

    #[test]
    fn memory_store_round_trips_lines() -> TestResult {
        let store = MemoryStore::new();
        let lines = lines();

        store.save(&lines)?;

        assert_eq!(store.load(), lines);

        Ok(())
    }

    #[test]
    fn memory_store_treats_corrupt_content_as_empty() {
        let store = MemoryStore::with_raw("]]");

        assert_eq!(store.load(), Vec::new());
    }
}
