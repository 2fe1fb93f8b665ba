use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use crate::*;

/// Minimal string key-value store the session persists into, e.g. the browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> core::result::Result<(), StoreError>;
}

/// Keys used for persisted session data.
pub mod keys {
    use crate::Mode;

    pub const MODE: &str = "concentration:mode";

    pub const fn game(mode: Mode) -> &'static str {
        match mode {
            Mode::Normal => "concentration:game:normal",
            Mode::Hard => "concentration:game:hard",
        }
    }

    pub const fn ledger(mode: Mode) -> &'static str {
        match mode {
            Mode::Normal => "concentration:ledger:normal",
            Mode::Hard => "concentration:ledger:hard",
        }
    }

    pub const fn last_score(mode: Mode) -> &'static str {
        match mode {
            Mode::Normal => "concentration:last-score:normal",
            Mode::Hard => "concentration:last-score:hard",
        }
    }
}

/// JSON helpers shared by every [`KeyValueStore`].
pub trait StoreExt: KeyValueStore {
    /// `Ok(None)` when nothing is stored under `key`.
    fn load<T: DeserializeOwned>(&self, key: &str) -> core::result::Result<Option<T>, StoreError> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            })
    }

    /// Loads `key`, falling back to `default` when the entry is missing or unreadable.
    fn load_or_else<T: DeserializeOwned>(&self, key: &str, default: impl FnOnce() -> T) -> T {
        match self.load(key) {
            Ok(Some(value)) => value,
            Ok(None) => default(),
            Err(err) => {
                log::warn!("{}, using a fresh default", err);
                default()
            }
        }
    }

    fn save<T: Serialize>(&mut self, key: &str, value: &T) -> core::result::Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &raw)
    }

    /// Like [`StoreExt::save`], but only logs failures; losing a save never interrupts play.
    fn save_or_log<T: Serialize>(&mut self, key: &str, value: &T) {
        if let Err(err) = self.save(key, value) {
            log::error!("Could not save to storage: {}", err);
        }
    }
}

impl<S: KeyValueStore + ?Sized> StoreExt for S {}

/// In-memory store, used for tests and whenever no persistent storage is available.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> core::result::Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> core::result::Result<(), StoreError> {
        (**self).set(key, value)
    }
}
