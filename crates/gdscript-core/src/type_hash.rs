//! Deterministic hash-based identity for named types.
//!
//! Class inheritance chains are compared by fully-qualified class name. Hashing
//! the name once with XXHash64 turns every comparison in a chain walk into an
//! integer compare and gives the constant pool a stable key for type operands.

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for enum hashes.
    pub const ENUM: u64 = 0x7d3c8b4a92e15f6d;

    /// Separator mixed between the owner and the enum name.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;
}

/// A deterministic 64-bit hash identifying a named type.
///
/// # Examples
///
/// ```
/// use gdscript_core::TypeHash;
///
/// let a = TypeHash::from_name("res://player.gd::Stats");
/// let b = TypeHash::from_name("res://player.gd::Stats");
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a fully-qualified type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a hash for an enum declared on `owner`.
    ///
    /// Two enums with the same name on different owners hash differently.
    #[inline]
    pub fn from_enum(owner: &str, name: &str) -> Self {
        let owner_hash = xxh64(owner.as_bytes(), 0);
        let name_hash = xxh64(name.as_bytes(), 0);
        TypeHash(
            hash_constants::ENUM
                ^ owner_hash.wrapping_mul(hash_constants::SEP).wrapping_add(name_hash),
        )
    }

    /// Whether this is the empty hash.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_hash() {
        assert_eq!(TypeHash::from_name("Node"), TypeHash::from_name("Node"));
        assert_ne!(TypeHash::from_name("Node"), TypeHash::from_name("Node2D"));
    }

    #[test]
    fn enum_hash_depends_on_owner() {
        let a = TypeHash::from_enum("Node", "ProcessMode");
        let b = TypeHash::from_enum("res://a.gd", "ProcessMode");
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }
}
