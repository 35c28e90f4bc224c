//! Constant pool for compiled scripts.
//!
//! Folded values, member and method names and literal data are stored once
//! per script and referenced by index from every function.

use gdscript_core::Variant;
use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

/// Script-level constant pool with deduplication.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    constants: Vec<Variant>,
    index: FxHashMap<ConstantKey, u32>,
}

/// Hashable form of the scalar values; composite values are not deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstantKey {
    Nil,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    String(String),
    StringName(String),
    NodePath(String),
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or get an existing constant, returning its index.
    pub fn add(&mut self, value: Variant) -> u32 {
        let key = Self::to_key(&value);
        if let Some(key) = &key {
            if let Some(&idx) = self.index.get(key) {
                return idx;
            }
        }

        let idx = self.constants.len() as u32;
        self.constants.push(value);
        if let Some(key) = key {
            self.index.insert(key, idx);
        }
        idx
    }

    /// Add a method, property or function name.
    pub fn add_name(&mut self, name: &str) -> u32 {
        self.add(Variant::StringName(name.to_string()))
    }

    pub fn get(&self, index: u32) -> Option<&Variant> {
        self.constants.get(index as usize)
    }

    pub fn constants(&self) -> &[Variant] {
        &self.constants
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    fn to_key(value: &Variant) -> Option<ConstantKey> {
        let key = match value {
            Variant::Nil => ConstantKey::Nil,
            Variant::Bool(b) => ConstantKey::Bool(*b),
            Variant::Int(i) => ConstantKey::Int(*i),
            Variant::Float(f) => ConstantKey::Float(OrderedFloat(*f)),
            Variant::String(s) => ConstantKey::String(s.clone()),
            Variant::StringName(s) => ConstantKey::StringName(s.clone()),
            Variant::NodePath(s) => ConstantKey::NodePath(s.clone()),
            _ => return None,
        };
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_deduplicated() {
        let mut pool = ConstantPool::new();
        let a = pool.add(Variant::Int(42));
        let b = pool.add(Variant::Float(1.5));
        assert_eq!(pool.add(Variant::Int(42)), a);
        assert_eq!(pool.add(Variant::Float(1.5)), b);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn names_and_strings_are_distinct() {
        let mut pool = ConstantPool::new();
        let name = pool.add_name("size");
        let string = pool.add(Variant::from("size"));
        assert_ne!(name, string);
        assert_eq!(pool.add_name("size"), name);
    }

    #[test]
    fn composite_values_are_appended() {
        let mut pool = ConstantPool::new();
        let array = Variant::Array(vec![Variant::Int(1)]);
        let a = pool.add(array.clone());
        let b = pool.add(array);
        assert_ne!(a, b);
        assert_eq!(pool.get(a), pool.get(b));
    }

    #[test]
    fn nan_has_one_entry() {
        let mut pool = ConstantPool::new();
        let a = pool.add(Variant::Float(f64::NAN));
        assert_eq!(pool.add(Variant::Float(f64::NAN)), a);
    }
}
