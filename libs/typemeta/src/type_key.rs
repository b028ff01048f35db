//! Type identity used as the top-level registry key.
//!
//! Equality and hashing use [`TypeId`], so two distinct types never share a
//! bucket even when their names render identically (e.g. two `User` structs in
//! different modules). The `type_name::<T>()` string is carried alongside for
//! diagnostics only.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Process-stable identity of a Rust type.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key of `T`. Works for unsized types such as `dyn Trait` or `str`.
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeKey {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified name, as reported by [`std::any::type_name`].
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name with module paths stripped, generic arguments included:
    /// `alloc::vec::Vec<app::model::User>` becomes `Vec<User>`.
    #[must_use]
    pub fn short_name(&self) -> String {
        strip_module_paths(self.name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

fn strip_module_paths(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    // Start of the path segment currently being written into `out`.
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            if out.len() == segment_start {
                // Qualified associated item, e.g. `<T as Trait>::Assoc`.
                out.push_str("::");
                segment_start = out.len();
            } else {
                out.truncate(segment_start);
            }
        } else if c.is_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push(c);
            segment_start = out.len();
        }
    }
    out
}
