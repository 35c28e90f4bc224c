//! Typed arena indices.
//!
//! Nodes refer to each other through these ids instead of pointers, so the
//! analyzer can hold an id while mutating the node it names.

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub u32);

        impl $name {
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

arena_id!(
    /// A function declaration, including synthetic accessor functions.
    FunctionId,
    "fn"
);
arena_id!(
    /// A block of statements.
    SuiteId,
    "suite"
);
arena_id!(StmtId, "stmt");
arena_id!(ExprId, "expr");
arena_id!(PatternId, "pattern");
arena_id!(
    /// A written type annotation.
    TypeRefId,
    "type"
);
