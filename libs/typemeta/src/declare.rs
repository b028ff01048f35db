//! Compile-time metadata declarations.
//!
//! `declare_metadata!` submits `(type, key, value)` records to an `inventory`
//! collection at link time. Nothing is applied until
//! [`MetadataRegistry::load_declared`] runs, usually once during startup.

use crate::{MetadataEntry, MetadataRegistry, TypeKey};

/// A single declaration collected by [`declare_metadata!`](crate::declare_metadata).
pub struct DeclaredMetadata {
    type_key: fn() -> TypeKey,
    key: &'static str,
    value: &'static str,
}

impl DeclaredMetadata {
    #[must_use]
    pub const fn new(type_key: fn() -> TypeKey, key: &'static str, value: &'static str) -> Self {
        Self {
            type_key,
            key,
            value,
        }
    }

    #[must_use]
    pub fn type_key(&self) -> TypeKey {
        (self.type_key)()
    }

    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    #[must_use]
    pub fn value(&self) -> &'static str {
        self.value
    }
}

inventory::collect!(DeclaredMetadata);

/// Declare metadata for a type next to its definition.
///
/// ```
/// struct User;
///
/// typemeta::declare_metadata!(User, "table" => "user", "plural" => "users");
///
/// let registry = typemeta::MetadataRegistry::new();
/// registry.load_declared();
/// assert_eq!(registry.require_lookup::<User>("table"), "user");
/// ```
#[macro_export]
macro_rules! declare_metadata {
    ($ty:ty, $($key:literal => $value:literal),+ $(,)?) => {
        $(
            $crate::__private::inventory::submit! {
                $crate::DeclaredMetadata::new($crate::TypeKey::of::<$ty>, $key, $value)
            }
        )+
    };
}

/// Every declaration linked into the binary, as detached entries.
#[must_use]
pub fn declared() -> Vec<MetadataEntry> {
    inventory::iter::<DeclaredMetadata>
        .into_iter()
        .map(|decl| MetadataEntry::new(decl.type_key(), decl.key(), decl.value()))
        .collect()
}

impl MetadataRegistry {
    /// Register every [`declare_metadata!`](crate::declare_metadata) record and
    /// return how many were applied.
    ///
    /// Declarations go through the normal register path, so calling this again
    /// after runtime overrides restores the declared values.
    pub fn load_declared(&self) -> usize {
        let declarations: Vec<&DeclaredMetadata> =
            inventory::iter::<DeclaredMetadata>.into_iter().collect();

        for decl in &declarations {
            self.register_key(decl.type_key(), decl.key(), decl.value());
        }

        tracing::debug!(applied = declarations.len(), "loaded declared type metadata");
        declarations.len()
    }
}
