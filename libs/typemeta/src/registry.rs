//! Two-level metadata map: type identity → key → value.
//!
//! - Writers (`register`, `reset`) take the write lock; readers (`lookup`,
//!   `list`, `len`) share the read lock.
//! - No method calls back into the registry while holding the lock.
//! - The fatal `require_*` paths abort the process only after the read guard
//!   is dropped, so a missing key never leaves the map half-written.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::{self, Write};

use crate::{MetadataEntry, TypeKey, TypeMetaError};

/// Per-type bucket of key → value.
type Bucket = HashMap<String, String>;

/// Internal map type for the registry.
type MetadataMap = HashMap<TypeKey, Bucket>;

/// Last line written to stderr by [`MetadataRegistry::require_lookup_logged`]
/// before it aborts.
pub const LOGGED_EXIT_MESSAGE: &str = "exiting due to missing typemeta";

/// Thread-safe registry of string metadata keyed by Rust type.
///
/// Most programs use the process-wide instance through the free functions at
/// the crate root. Separate instances are handy in tests that must not share
/// state.
pub struct MetadataRegistry {
    map: RwLock<MetadataMap>,
}

impl MetadataRegistry {
    /// Empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MetadataRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataRegistry {
    /// Attach `value` under `key` to type `T`, replacing any previous value.
    pub fn register<T>(&self, key: impl Into<String>, value: impl Into<String>)
    where
        T: ?Sized + 'static,
    {
        self.register_key(TypeKey::of::<T>(), key, value);
    }

    /// Same as [`register`](Self::register), for a type known only by its key.
    pub fn register_key(
        &self,
        type_key: TypeKey,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        let key = key.into();
        if key.is_empty() {
            tracing::debug!(type_name = %type_key, "registering type metadata with an empty key");
        }

        let mut w = self.map.write();
        let bucket = w.entry(type_key).or_default();
        if let Some(slot) = bucket.get_mut(&key) {
            let previous = std::mem::replace(slot, value.into());
            tracing::debug!(
                type_name = %type_key,
                key = %key,
                previous = %previous,
                "overwrote type metadata"
            );
        } else {
            tracing::debug!(type_name = %type_key, key = %key, "registered type metadata");
            bucket.insert(key, value.into());
        }
    }

    /// Value of `key` for `T`, with a found flag.
    ///
    /// Returns `("", false)` both when `T` has no metadata at all and when
    /// `T` has metadata but not this key.
    #[must_use]
    pub fn lookup<T>(&self, key: &str) -> (String, bool)
    where
        T: ?Sized + 'static,
    {
        match self.get::<T>(key) {
            Some(value) => (value, true),
            None => (String::new(), false),
        }
    }

    /// Value of `key` for `T`, if registered.
    #[must_use]
    pub fn get<T>(&self, key: &str) -> Option<String>
    where
        T: ?Sized + 'static,
    {
        self.get_for(&TypeKey::of::<T>(), key)
    }

    /// Value of `key` for `T`, or [`TypeMetaError::MissingKey`].
    ///
    /// # Errors
    /// Returns [`TypeMetaError::MissingKey`] when `T` has no value under `key`.
    pub fn fetch<T>(&self, key: &str) -> Result<String, TypeMetaError>
    where
        T: ?Sized + 'static,
    {
        let type_key = TypeKey::of::<T>();
        self.get_for(&type_key, key)
            .ok_or_else(|| TypeMetaError::missing_key(&type_key, key))
    }

    /// Whether `T` has a value under `key`.
    #[must_use]
    pub fn contains<T>(&self, key: &str) -> bool
    where
        T: ?Sized + 'static,
    {
        let r = self.map.read();
        r.get(&TypeKey::of::<T>())
            .is_some_and(|bucket| bucket.contains_key(key))
    }

    /// Value of `key` for `T`. A missing key is a programming defect.
    ///
    /// When `T` has no value under `key`, writes
    /// `typemeta: key "<key>" not found for type <Type>` to stderr and aborts
    /// the whole process, whichever thread made the call. Nothing can catch
    /// this: register the key during initialization instead.
    #[must_use]
    pub fn require_lookup<T>(&self, key: &str) -> String
    where
        T: ?Sized + 'static,
    {
        let type_key = TypeKey::of::<T>();
        match self.get_for(&type_key, key) {
            Some(value) => value,
            None => {
                tracing::error!(type_name = %type_key, key, "required type metadata is missing");
                terminate(&TypeMetaError::missing_key(&type_key, key).to_string());
            }
        }
    }

    /// Like [`require_lookup`](Self::require_lookup), but first writes
    /// `typemeta: missing metadata key "<key>" for type <Type>` to stdout and
    /// flushes it, then writes [`LOGGED_EXIT_MESSAGE`] to stderr and aborts.
    #[must_use]
    pub fn require_lookup_logged<T>(&self, key: &str) -> String
    where
        T: ?Sized + 'static,
    {
        let type_key = TypeKey::of::<T>();
        if let Some(value) = self.get_for(&type_key, key) {
            return value;
        }

        tracing::error!(type_name = %type_key, key, "required type metadata is missing");
        if let Err(err) = print_missing_key_line(&type_key, key) {
            tracing::warn!(error = %err, "failed to write typemeta diagnostic to stdout");
        }
        terminate(LOGGED_EXIT_MESSAGE);
    }

    /// Snapshot of every entry, in no particular order.
    #[must_use]
    pub fn list(&self) -> Vec<MetadataEntry> {
        let r = self.map.read();
        let mut entries = Vec::with_capacity(r.values().map(HashMap::len).sum());
        for (type_key, bucket) in &*r {
            entries.extend(
                bucket
                    .iter()
                    .map(|(k, v)| MetadataEntry::new(*type_key, k.clone(), v.clone())),
            );
        }
        entries
    }

    /// Drop every entry (mainly for test setup and teardown).
    pub fn reset(&self) {
        let removed = {
            let mut w = self.map.write();
            std::mem::take(&mut *w)
        };
        tracing::debug!(types = removed.len(), "reset type metadata registry");
    }

    /// Total number of `(type, key)` entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.read().values().map(HashMap::len).sum()
    }

    /// Check if the registry holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.read().values().all(HashMap::is_empty)
    }

    fn get_for(&self, type_key: &TypeKey, key: &str) -> Option<String> {
        let r = self.map.read();
        r.get(type_key).and_then(|bucket| bucket.get(key)).cloned()
    }
}

fn terminate(message: &str) -> ! {
    eprintln!("{message}");
    std::process::abort()
}

fn print_missing_key_line(type_key: &TypeKey, key: &str) -> io::Result<()> {
    println!("typemeta: missing metadata key {key:?} for type {type_key}");
    io::stdout().flush()
}
