//! Operand addresses.
//!
//! Every instruction operand names a slot in one of a few address spaces.
//! Parameters, locals and temporaries live on the function stack; temporaries
//! follow a strict LIFO discipline (see [`TempStack`](crate::emit::TempStack)).

use std::fmt;

/// Bits used by the index part of an encoded address.
const INDEX_BITS: u32 = 28;
const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    /// The instance the function runs on.
    SelfRef,
    /// The script class itself, for static calls.
    Class,
    Nil,
    Parameter(u32),
    Local(u32),
    Temporary(u32),
    /// Instance field, by field index.
    Member(u32),
    /// Named entry of the class constant table.
    ClassConstant(u32),
    /// Constant pool entry.
    Constant(u32),
    /// Entry of the function's global table.
    Global(u32),
}

impl Address {
    pub fn is_temporary(self) -> bool {
        matches!(self, Address::Temporary(_))
    }

    fn parts(self) -> (u32, u32) {
        match self {
            Address::SelfRef => (0, 0),
            Address::Class => (1, 0),
            Address::Nil => (2, 0),
            Address::Parameter(i) => (3, i),
            Address::Local(i) => (4, i),
            Address::Temporary(i) => (5, i),
            Address::Member(i) => (6, i),
            Address::ClassConstant(i) => (7, i),
            Address::Constant(i) => (8, i),
            Address::Global(i) => (9, i),
        }
    }

    /// One word: the address space in the top four bits, the index below.
    pub fn encode(self) -> u32 {
        let (tag, index) = self.parts();
        (tag << INDEX_BITS) | (index & INDEX_MASK)
    }

    pub fn decode(word: u32) -> Option<Self> {
        let index = word & INDEX_MASK;
        let address = match word >> INDEX_BITS {
            0 => Address::SelfRef,
            1 => Address::Class,
            2 => Address::Nil,
            3 => Address::Parameter(index),
            4 => Address::Local(index),
            5 => Address::Temporary(index),
            6 => Address::Member(index),
            7 => Address::ClassConstant(index),
            8 => Address::Constant(index),
            9 => Address::Global(index),
            _ => return None,
        };
        Some(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::SelfRef => write!(f, "self"),
            Address::Class => write!(f, "class"),
            Address::Nil => write!(f, "nil"),
            Address::Parameter(i) => write!(f, "param[{i}]"),
            Address::Local(i) => write!(f, "local[{i}]"),
            Address::Temporary(i) => write!(f, "temp[{i}]"),
            Address::Member(i) => write!(f, "member[{i}]"),
            Address::ClassConstant(i) => write!(f, "class_const[{i}]"),
            Address::Constant(i) => write!(f, "const[{i}]"),
            Address::Global(i) => write!(f, "global[{i}]"),
        }
    }
}

/// What a [`Address::Global`] refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GlobalRef {
    /// Native class, autoload or global class, looked up by name.
    Named(String),
    /// A user class by fully-qualified name.
    Script(String),
    /// Static variable of a user class.
    Static { class: String, index: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_survive_encoding() {
        for address in [
            Address::SelfRef,
            Address::Nil,
            Address::Parameter(3),
            Address::Temporary(0),
            Address::Member(17),
            Address::Global(INDEX_MASK),
        ] {
            assert_eq!(Address::decode(address.encode()), Some(address));
        }
        assert_eq!(Address::decode(0xF000_0000), None);
    }
}
