//! Identifiers for compilation units and the classes defined inside them.
//!
//! A compilation unit is one parsed script file. Classes are addressed by
//! their index inside the unit's parse tree arena, so a `(UnitId, ClassId)`
//! pair names a class uniquely for the lifetime of an analysis session.

use std::fmt;

/// Identifies a script compilation unit within an analysis session.
///
/// # Example
///
/// ```
/// use gdscript_core::UnitId;
///
/// let unit = UnitId::new(0);
/// assert_eq!(unit.index(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct UnitId(u32);

impl UnitId {
    /// Create a new unit ID with the given index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit_{}", self.0)
    }
}

impl From<u32> for UnitId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}

/// Index of a class node inside a parse tree.
///
/// The head (file-level) class of every tree is always `ClassId::HEAD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ClassId(pub u32);

impl ClassId {
    /// The implicit file-level class.
    pub const HEAD: ClassId = ClassId(0);

    /// Position of this class in the tree's class arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class_{}", self.0)
    }
}
