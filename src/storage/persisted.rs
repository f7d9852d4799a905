//! One storage key exposed as a typed, in-memory value.
//!
//! Values are written as `{"version": N, "data": ...}`. A bare value (the
//! unversioned layout written by earlier builds) is still accepted on read
//! and gets upgraded on the next write.

use super::{KeyValueStore, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Stored<T> {
    Versioned { version: u32, data: T },
    Legacy(T),
}

pub(crate) fn backup_key(key: &str) -> String {
    format!("{key}::corrupt")
}

pub(crate) fn read_value<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StorageResult<Option<T>> {
    let Some(raw) = store.get_item(key)? else {
        return Ok(None);
    };

    let stored: Stored<T> = serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
        key: key.to_string(),
        source,
    })?;

    match stored {
        Stored::Versioned { version, data } if version <= SCHEMA_VERSION => Ok(Some(data)),
        Stored::Versioned { version, .. } => Err(StorageError::UnsupportedVersion {
            key: key.to_string(),
            found: version,
            supported: SCHEMA_VERSION,
        }),
        Stored::Legacy(data) => Ok(Some(data)),
    }
}

pub(crate) fn write_value<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let json = serde_json::to_string(&Envelope {
        version: SCHEMA_VERSION,
        data: value,
    })
    .map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set_item(key, &json)
}

/// Copy whatever is stored at `key` aside so a reset does not lose it.
fn backup_raw(store: &dyn KeyValueStore, key: &str) {
    let raw = match store.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return,
        Err(e) => {
            log::warn!("{e}");
            return;
        }
    };
    if let Err(e) = store.set_item(&backup_key(key), &raw) {
        log::warn!("{e}");
    }
}

fn load_or_init<T: Serialize + DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
    default: impl FnOnce() -> T,
) -> T {
    match read_value::<T>(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => {
            let value = default();
            if let Err(e) = write_value(store, key, &value) {
                log::warn!("{e}");
            }
            value
        }
        Err(e @ (StorageError::Corrupt { .. } | StorageError::UnsupportedVersion { .. })) => {
            log::warn!(
                "{e}; resetting `{key}` (previous value kept under `{}`)",
                backup_key(key)
            );
            backup_raw(store, key);
            let value = default();
            if let Err(e) = write_value(store, key, &value) {
                log::warn!("{e}");
            }
            value
        }
        Err(e) => {
            // Backend failure: leave storage alone.
            log::warn!("{e}; using default for this session");
            default()
        }
    }
}

/// A value mirrored to one key of a [`KeyValueStore`].
///
/// Each `set` swaps in a new `Rc`, so `Rc::ptr_eq` on two `get()` results
/// tells whether the value changed in between.
pub struct PersistedValue<T> {
    store: Rc<dyn KeyValueStore>,
    key: String,
    value: Rc<T>,
}

impl<T> PersistedValue<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Read `key`, falling back to `default` when it is missing or unreadable.
    ///
    /// Never fails: a corrupt value is backed up and replaced.
    pub fn load(
        store: Rc<dyn KeyValueStore>,
        key: impl Into<String>,
        default: impl FnOnce() -> T,
    ) -> Self {
        let key = key.into();
        let value = load_or_init(&*store, &key, default);
        Self {
            store,
            key,
            value: Rc::new(value),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> Rc<T> {
        Rc::clone(&self.value)
    }

    /// Replace the value and write it back.
    ///
    /// The in-memory value is replaced even if the write fails.
    pub fn set(&mut self, value: T) -> StorageResult<()> {
        self.value = Rc::new(value);
        match write_value(&*self.store, &self.key, &*self.value) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::error!("{e}");
                Err(e)
            }
        }
    }

    pub fn update(&mut self, f: impl FnOnce(&T) -> T) -> StorageResult<()> {
        let next = f(&self.value);
        self.set(next)
    }

    /// Re-read the key, e.g. after another tab wrote to it.
    pub fn reload(&mut self, default: impl FnOnce() -> T) {
        let value = load_or_init(&*self.store, &self.key, default);
        self.value = Rc::new(value);
    }
}
