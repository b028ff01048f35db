use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::TypeKey;

/// One `(type, key, value)` fact, as returned by [`crate::MetadataRegistry::list`].
///
/// Entries are detached copies; holding or mutating them has no effect on the
/// registry they came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataEntry {
    type_key: TypeKey,
    key: String,
    value: String,
}

impl MetadataEntry {
    #[must_use]
    pub fn new(type_key: TypeKey, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_key,
            key: key.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// Short type name, without module paths.
    #[must_use]
    pub fn type_name(&self) -> String {
        self.type_key.short_name()
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether this entry describes type `T`.
    #[must_use]
    pub fn is_for<T: ?Sized + 'static>(&self) -> bool {
        self.type_key == TypeKey::of::<T>()
    }
}

impl Serialize for MetadataEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MetadataEntry", 3)?;
        state.serialize_field("type_name", &self.type_name())?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}
