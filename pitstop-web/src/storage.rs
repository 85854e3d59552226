use crate::dom::{js_error_message, window};
use pitstop_core::{KeyValueStore, StorageError};
use web_sys::Storage;

/// `localStorage`, looked up on every access so a revoked store degrades per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

impl BrowserStore {
    fn storage() -> Result<Storage, StorageError> {
        let win = window().ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        win.local_storage()
            .map_err(|err| StorageError::Unavailable(js_error_message(&err)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage unavailable".into()))
    }
}

fn access_error(key: &str, err: &wasm_bindgen::JsValue) -> StorageError {
    StorageError::Access {
        key: key.to_string(),
        reason: js_error_message(err),
    }
}

impl KeyValueStore for BrowserStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|err| access_error(key, &err))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|err| access_error(key, &err))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|err| access_error(key, &err))
    }
}
