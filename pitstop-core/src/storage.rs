//! JSON-encoded preference storage on top of a string key-value store.
//!
//! Browsers expose `localStorage`; tests and the tester use [`MemoryStore`].
//! Every failure is logged and surfaces as an absent value, never as a panic.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Key under which the root font-size percentage is persisted.
pub const FONT_SIZE_KEY: &str = "fontSize";
/// Key under which the theme preference is persisted.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage access failed for '{key}': {reason}")]
    Access { key: String, reason: String },
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode value for '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw string key-value persistence.
pub trait KeyValueStore {
    /// Fetch the raw string stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be accessed.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the entry for `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be accessed.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// What [`Preferences::read_or_write`] should do with a key.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageOp {
    Read,
    Remove,
    Write(Value),
}

/// JSON layer over a [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct Preferences<S> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Decode the value stored under `key`.
    ///
    /// Missing entries, access failures and malformed JSON all yield `None`.
    #[must_use]
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_read(key) {
            Ok(value) => value,
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }

    /// Encode and persist `value` under `key`. Returns the value when the write lands.
    pub fn write<T: Serialize>(&self, key: &str, value: T) -> Option<T> {
        match self.try_write(key, &value) {
            Ok(()) => {
                log::info!("Item '{key}' saved to storage.");
                Some(value)
            }
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }

    /// Delete the entry for `key`.
    pub fn remove(&self, key: &str) {
        match self.store.remove_item(key) {
            Ok(()) => log::info!("Item '{key}' removed from storage."),
            Err(err) => log::error!("{err}"),
        }
    }

    /// Single entry point mirroring the page script API: read, remove, or write.
    ///
    /// Reads return the decoded value, removals return `None`, writes echo the
    /// stored value back. Any failure yields `None`.
    pub fn read_or_write(&self, key: &str, op: StorageOp) -> Option<Value> {
        match op {
            StorageOp::Read => self.read(key),
            StorageOp::Remove => {
                self.remove(key);
                None
            }
            StorageOp::Write(value) => self.write(key, value),
        }
    }

    fn try_read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.store.get_item(key)? else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                key: key.to_string(),
                source,
            })
    }

    fn try_write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set_item(key, &encoded)
    }
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw string currently stored under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Access {
                key: key.to_string(),
                reason: "quota".into(),
            })
        }

        fn set_item(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Access {
                key: key.to_string(),
                reason: "quota".into(),
            })
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("private mode".into()))
        }
    }

    #[test]
    fn font_size_round_trips() {
        let prefs = Preferences::new(MemoryStore::new());
        assert_eq!(prefs.write(FONT_SIZE_KEY, 120), Some(120));
        assert_eq!(prefs.read::<i64>(FONT_SIZE_KEY), Some(120));
        assert_eq!(prefs.store().raw(FONT_SIZE_KEY).as_deref(), Some("120"));
    }

    #[test]
    fn theme_round_trips_as_json_string() {
        let prefs = Preferences::new(MemoryStore::new());
        prefs.write(THEME_KEY, "dark");
        assert_eq!(prefs.store().raw(THEME_KEY).as_deref(), Some("\"dark\""));
        assert_eq!(prefs.read::<String>(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn read_or_write_dispatches_each_op() {
        let prefs = Preferences::new(MemoryStore::new());
        assert_eq!(prefs.read_or_write("k", StorageOp::Read), None);
        assert_eq!(
            prefs.read_or_write("k", StorageOp::Write(json!({"a": 1}))),
            Some(json!({"a": 1}))
        );
        assert_eq!(prefs.read_or_write("k", StorageOp::Read), Some(json!({"a": 1})));
        assert_eq!(prefs.read_or_write("k", StorageOp::Remove), None);
        assert!(prefs.store().is_empty());
    }

    #[test]
    fn malformed_json_reads_as_absent() {
        let store = MemoryStore::new();
        store.set_item(THEME_KEY, "{not json").unwrap();
        let prefs = Preferences::new(store);
        assert_eq!(prefs.read::<String>(THEME_KEY), None);
    }

    #[test]
    fn store_failures_never_escape() {
        let prefs = Preferences::new(BrokenStore);
        assert_eq!(prefs.read::<String>(THEME_KEY), None);
        assert_eq!(prefs.write(THEME_KEY, "dark"), None);
        prefs.remove(THEME_KEY);
        assert_eq!(
            prefs.read_or_write(THEME_KEY, StorageOp::Write(json!("light"))),
            None
        );
    }
}
