use crate::TypeKey;

/// Errors returned by the recoverable registry accessors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeMetaError {
    #[error("typemeta: key {key:?} not found for type {type_name}")]
    MissingKey { key: String, type_name: String },
}

impl TypeMetaError {
    #[must_use]
    pub fn missing_key(type_key: &TypeKey, key: &str) -> Self {
        TypeMetaError::MissingKey {
            key: key.to_owned(),
            type_name: type_key.short_name(),
        }
    }
}
