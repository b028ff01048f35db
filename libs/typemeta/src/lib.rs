#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Type-keyed string metadata.
//!
//! Attach out-of-band facts (a table name, a display label, a route prefix) to
//! a Rust type without touching its definition, then read them back from
//! anywhere in the process:
//!
//! ```
//! struct User;
//!
//! typemeta::register::<User>("table", "user");
//!
//! assert_eq!(typemeta::lookup::<User>("table"), ("user".to_owned(), true));
//! assert_eq!(typemeta::require_lookup::<User>("table"), "user");
//! ```
//!
//! The free functions operate on a process-wide [`MetadataRegistry`] that
//! starts empty and lives for the whole process. Independent registries can be
//! created with [`MetadataRegistry::new`].
//!
//! Missing keys:
//! - [`lookup`], [`get`] and [`fetch`] report a miss to the caller.
//! - [`require_lookup`] and [`require_lookup_logged`] treat a miss as a
//!   programming defect and abort the process, from any thread.

use std::sync::LazyLock;

mod declare;
mod entry;
mod error;
mod registry;
mod type_key;

pub use declare::{DeclaredMetadata, declared};
pub use entry::MetadataEntry;
pub use error::TypeMetaError;
pub use registry::{LOGGED_EXIT_MESSAGE, MetadataRegistry};
pub use type_key::TypeKey;

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}

static GLOBAL: LazyLock<MetadataRegistry> = LazyLock::new(MetadataRegistry::new);

/// The process-wide registry used by the free functions.
#[must_use]
pub fn global() -> &'static MetadataRegistry {
    &GLOBAL
}

/// Attach `value` under `key` to type `T` in the global registry.
pub fn register<T>(key: impl Into<String>, value: impl Into<String>)
where
    T: ?Sized + 'static,
{
    GLOBAL.register::<T>(key, value);
}

/// See [`MetadataRegistry::lookup`].
#[must_use]
pub fn lookup<T>(key: &str) -> (String, bool)
where
    T: ?Sized + 'static,
{
    GLOBAL.lookup::<T>(key)
}

/// See [`MetadataRegistry::get`].
#[must_use]
pub fn get<T>(key: &str) -> Option<String>
where
    T: ?Sized + 'static,
{
    GLOBAL.get::<T>(key)
}

/// See [`MetadataRegistry::fetch`].
///
/// # Errors
/// Returns [`TypeMetaError::MissingKey`] when `T` has no value under `key`.
pub fn fetch<T>(key: &str) -> Result<String, TypeMetaError>
where
    T: ?Sized + 'static,
{
    GLOBAL.fetch::<T>(key)
}

/// See [`MetadataRegistry::contains`].
#[must_use]
pub fn contains<T>(key: &str) -> bool
where
    T: ?Sized + 'static,
{
    GLOBAL.contains::<T>(key)
}

/// See [`MetadataRegistry::require_lookup`]. Aborts the process when `T` has
/// no value under `key`.
#[must_use]
pub fn require_lookup<T>(key: &str) -> String
where
    T: ?Sized + 'static,
{
    GLOBAL.require_lookup::<T>(key)
}

/// See [`MetadataRegistry::require_lookup_logged`]. Prints a diagnostic line
/// to stdout, then aborts the process, when `T` has no value under `key`.
#[must_use]
pub fn require_lookup_logged<T>(key: &str) -> String
where
    T: ?Sized + 'static,
{
    GLOBAL.require_lookup_logged::<T>(key)
}

/// Snapshot of every entry in the global registry.
#[must_use]
pub fn list() -> Vec<MetadataEntry> {
    GLOBAL.list()
}

/// Empty the global registry. Meant for test isolation.
pub fn reset() {
    GLOBAL.reset();
}

/// See [`MetadataRegistry::len`].
#[must_use]
pub fn len() -> usize {
    GLOBAL.len()
}

/// See [`MetadataRegistry::is_empty`].
#[must_use]
pub fn is_empty() -> bool {
    GLOBAL.is_empty()
}

/// Apply every `declare_metadata!` record to the global registry.
pub fn load_declared() -> usize {
    GLOBAL.load_declared()
}
