//! The host value model.
//!
//! [`Variant`] is the dynamically typed value the scripting language operates
//! on. The analyzer uses it for constant folding and, through placeholder
//! values, as an oracle for operator result types.

mod access;
mod construct;
pub mod math;
mod ops;

use std::fmt;

pub use access::{builtin_property_names, get_indexed, get_named};
pub use construct::{
    can_convert, can_convert_strict, construct, constructor_signatures, convert, default_for,
    placeholder_for, ConstructorSignature,
};
pub use math::{format_real, Color, Rect2, Transform2D, Vector2, Vector2i, Vector3, Vector3i};
pub use ops::{evaluate, evaluate_unary};

/// The fixed set of builtin value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum VariantType {
    Nil = 0,
    Bool,
    Int,
    Float,
    String,
    Vector2,
    Vector2i,
    Rect2,
    Vector3,
    Vector3i,
    Transform2D,
    Color,
    StringName,
    NodePath,
    Rid,
    Object,
    Callable,
    Signal,
    Dictionary,
    Array,
    PackedByteArray,
    PackedInt32Array,
    PackedInt64Array,
    PackedFloat32Array,
    PackedFloat64Array,
    PackedStringArray,
    PackedVector2Array,
    PackedVector3Array,
    PackedColorArray,
}

impl VariantType {
    /// Every builtin type, in discriminant order.
    pub const ALL: [VariantType; 29] = [
        VariantType::Nil,
        VariantType::Bool,
        VariantType::Int,
        VariantType::Float,
        VariantType::String,
        VariantType::Vector2,
        VariantType::Vector2i,
        VariantType::Rect2,
        VariantType::Vector3,
        VariantType::Vector3i,
        VariantType::Transform2D,
        VariantType::Color,
        VariantType::StringName,
        VariantType::NodePath,
        VariantType::Rid,
        VariantType::Object,
        VariantType::Callable,
        VariantType::Signal,
        VariantType::Dictionary,
        VariantType::Array,
        VariantType::PackedByteArray,
        VariantType::PackedInt32Array,
        VariantType::PackedInt64Array,
        VariantType::PackedFloat32Array,
        VariantType::PackedFloat64Array,
        VariantType::PackedStringArray,
        VariantType::PackedVector2Array,
        VariantType::PackedVector3Array,
        VariantType::PackedColorArray,
    ];

    /// Name as written in scripts.
    pub fn name(self) -> &'static str {
        match self {
            VariantType::Nil => "Nil",
            VariantType::Bool => "bool",
            VariantType::Int => "int",
            VariantType::Float => "float",
            VariantType::String => "String",
            VariantType::Vector2 => "Vector2",
            VariantType::Vector2i => "Vector2i",
            VariantType::Rect2 => "Rect2",
            VariantType::Vector3 => "Vector3",
            VariantType::Vector3i => "Vector3i",
            VariantType::Transform2D => "Transform2D",
            VariantType::Color => "Color",
            VariantType::StringName => "StringName",
            VariantType::NodePath => "NodePath",
            VariantType::Rid => "RID",
            VariantType::Object => "Object",
            VariantType::Callable => "Callable",
            VariantType::Signal => "Signal",
            VariantType::Dictionary => "Dictionary",
            VariantType::Array => "Array",
            VariantType::PackedByteArray => "PackedByteArray",
            VariantType::PackedInt32Array => "PackedInt32Array",
            VariantType::PackedInt64Array => "PackedInt64Array",
            VariantType::PackedFloat32Array => "PackedFloat32Array",
            VariantType::PackedFloat64Array => "PackedFloat64Array",
            VariantType::PackedStringArray => "PackedStringArray",
            VariantType::PackedVector2Array => "PackedVector2Array",
            VariantType::PackedVector3Array => "PackedVector3Array",
            VariantType::PackedColorArray => "PackedColorArray",
        }
    }

    /// Look up a builtin type usable in annotations.
    ///
    /// `Nil` and `Object` are not returned: `null` is not a type name and
    /// `Object` is the root of the native class hierarchy.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .filter(|t| !matches!(t, VariantType::Nil | VariantType::Object))
            .find(|t| t.name() == name)
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, VariantType::Int | VariantType::Float)
    }

    pub fn is_packed_array(self) -> bool {
        self.packed_element().is_some()
    }

    /// Element type of a packed array type.
    pub fn packed_element(self) -> Option<VariantType> {
        match self {
            VariantType::PackedByteArray
            | VariantType::PackedInt32Array
            | VariantType::PackedInt64Array => Some(VariantType::Int),
            VariantType::PackedFloat32Array | VariantType::PackedFloat64Array => {
                Some(VariantType::Float)
            }
            VariantType::PackedStringArray => Some(VariantType::String),
            VariantType::PackedVector2Array => Some(VariantType::Vector2),
            VariantType::PackedVector3Array => Some(VariantType::Vector3),
            VariantType::PackedColorArray => Some(VariantType::Color),
            _ => None,
        }
    }

    /// Types that are shared by reference rather than copied on assignment.
    pub fn is_reference_type(self) -> bool {
        matches!(
            self,
            VariantType::Object | VariantType::Dictionary | VariantType::Array
        )
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compile-time stand-in for an engine object.
///
/// Only resources produced by `preload` and placeholders for the operator
/// dry run ever exist during compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRef {
    /// Native class of the object (`GDScript`, `PackedScene`, ...).
    pub class: String,
    /// Resource path when the object was loaded from one.
    pub path: Option<String>,
}

impl ObjectRef {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            path: None,
        }
    }

    pub fn resource(class: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            path: Some(path.into()),
        }
    }
}

/// Insertion-ordered dictionary keyed by [`Variant`] equality.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dictionary {
    entries: Vec<(Variant, Variant)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Variant) -> Option<&Variant> {
        self.entries
            .iter()
            .find(|(k, _)| k.equals(key))
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Variant) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace the value under `key`.
    pub fn insert(&mut self, key: Variant, value: Variant) {
        match self.entries.iter_mut().find(|(k, _)| k.equals(&key)) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Variant, Variant)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Variant> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl FromIterator<(Variant, Variant)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (Variant, Variant)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Variant {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Vector2(Vector2),
    Vector2i(Vector2i),
    Rect2(Rect2),
    Vector3(Vector3),
    Vector3i(Vector3i),
    Transform2D(Transform2D),
    Color(Color),
    StringName(String),
    NodePath(String),
    Rid(u64),
    Object(ObjectRef),
    /// Method reference by name.
    Callable(String),
    /// Signal reference by name.
    Signal(String),
    Dictionary(Dictionary),
    Array(Vec<Variant>),
    PackedByteArray(Vec<u8>),
    PackedInt32Array(Vec<i32>),
    PackedInt64Array(Vec<i64>),
    PackedFloat32Array(Vec<f32>),
    PackedFloat64Array(Vec<f64>),
    PackedStringArray(Vec<String>),
    PackedVector2Array(Vec<Vector2>),
    PackedVector3Array(Vec<Vector3>),
    PackedColorArray(Vec<Color>),
}

impl Variant {
    pub fn get_type(&self) -> VariantType {
        match self {
            Variant::Nil => VariantType::Nil,
            Variant::Bool(_) => VariantType::Bool,
            Variant::Int(_) => VariantType::Int,
            Variant::Float(_) => VariantType::Float,
            Variant::String(_) => VariantType::String,
            Variant::Vector2(_) => VariantType::Vector2,
            Variant::Vector2i(_) => VariantType::Vector2i,
            Variant::Rect2(_) => VariantType::Rect2,
            Variant::Vector3(_) => VariantType::Vector3,
            Variant::Vector3i(_) => VariantType::Vector3i,
            Variant::Transform2D(_) => VariantType::Transform2D,
            Variant::Color(_) => VariantType::Color,
            Variant::StringName(_) => VariantType::StringName,
            Variant::NodePath(_) => VariantType::NodePath,
            Variant::Rid(_) => VariantType::Rid,
            Variant::Object(_) => VariantType::Object,
            Variant::Callable(_) => VariantType::Callable,
            Variant::Signal(_) => VariantType::Signal,
            Variant::Dictionary(_) => VariantType::Dictionary,
            Variant::Array(_) => VariantType::Array,
            Variant::PackedByteArray(_) => VariantType::PackedByteArray,
            Variant::PackedInt32Array(_) => VariantType::PackedInt32Array,
            Variant::PackedInt64Array(_) => VariantType::PackedInt64Array,
            Variant::PackedFloat32Array(_) => VariantType::PackedFloat32Array,
            Variant::PackedFloat64Array(_) => VariantType::PackedFloat64Array,
            Variant::PackedStringArray(_) => VariantType::PackedStringArray,
            Variant::PackedVector2Array(_) => VariantType::PackedVector2Array,
            Variant::PackedVector3Array(_) => VariantType::PackedVector3Array,
            Variant::PackedColorArray(_) => VariantType::PackedColorArray,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Variant::Nil)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Variant::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value widened to `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Variant::Int(i) => Some(*i as f64),
            Variant::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String content of `String` and `StringName` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::String(s) | Variant::StringName(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness used by conditions and logical operators.
    pub fn booleanize(&self) -> bool {
        match self {
            Variant::Nil => false,
            Variant::Bool(b) => *b,
            Variant::Int(i) => *i != 0,
            Variant::Float(f) => *f != 0.0,
            Variant::String(s) | Variant::StringName(s) | Variant::NodePath(s) => !s.is_empty(),
            Variant::Vector2(v) => !v.is_zero(),
            Variant::Vector2i(v) => v.x != 0 || v.y != 0,
            Variant::Rect2(r) => !r.position.is_zero() || !r.size.is_zero(),
            Variant::Vector3(v) => *v != Vector3::ZERO,
            Variant::Vector3i(v) => v.x != 0 || v.y != 0 || v.z != 0,
            Variant::Transform2D(t) => *t != Transform2D::IDENTITY,
            Variant::Color(c) => *c != Color::default(),
            Variant::Rid(id) => *id != 0,
            Variant::Object(_) => true,
            Variant::Callable(name) | Variant::Signal(name) => !name.is_empty(),
            Variant::Dictionary(d) => !d.is_empty(),
            Variant::Array(a) => !a.is_empty(),
            Variant::PackedByteArray(a) => !a.is_empty(),
            Variant::PackedInt32Array(a) => !a.is_empty(),
            Variant::PackedInt64Array(a) => !a.is_empty(),
            Variant::PackedFloat32Array(a) => !a.is_empty(),
            Variant::PackedFloat64Array(a) => !a.is_empty(),
            Variant::PackedStringArray(a) => !a.is_empty(),
            Variant::PackedVector2Array(a) => !a.is_empty(),
            Variant::PackedVector3Array(a) => !a.is_empty(),
            Variant::PackedColorArray(a) => !a.is_empty(),
        }
    }

    /// Equality with numeric and string-like cross-type comparison.
    pub fn equals(&self, other: &Variant) -> bool {
        match (self, other) {
            (Variant::Int(a), Variant::Float(b)) | (Variant::Float(b), Variant::Int(a)) => {
                (*a as f64) == *b
            }
            (Variant::String(a) | Variant::StringName(a), Variant::String(b) | Variant::StringName(b)) => {
                a == b
            }
            _ => self == other,
        }
    }

    /// Number of elements of a container or characters of a string.
    pub fn len(&self) -> Option<usize> {
        Some(match self {
            Variant::String(s) | Variant::StringName(s) => s.chars().count(),
            Variant::Dictionary(d) => d.len(),
            Variant::Array(a) => a.len(),
            Variant::PackedByteArray(a) => a.len(),
            Variant::PackedInt32Array(a) => a.len(),
            Variant::PackedInt64Array(a) => a.len(),
            Variant::PackedFloat32Array(a) => a.len(),
            Variant::PackedFloat64Array(a) => a.len(),
            Variant::PackedStringArray(a) => a.len(),
            Variant::PackedVector2Array(a) => a.len(),
            Variant::PackedVector3Array(a) => a.len(),
            Variant::PackedColorArray(a) => a.len(),
            _ => return None,
        })
    }

    /// Elements of an array or packed array as variants.
    pub fn array_elements(&self) -> Option<Vec<Variant>> {
        Some(match self {
            Variant::Array(a) => a.clone(),
            Variant::PackedByteArray(a) => a.iter().map(|v| Variant::Int(*v as i64)).collect(),
            Variant::PackedInt32Array(a) => a.iter().map(|v| Variant::Int(*v as i64)).collect(),
            Variant::PackedInt64Array(a) => a.iter().map(|v| Variant::Int(*v)).collect(),
            Variant::PackedFloat32Array(a) => a.iter().map(|v| Variant::Float(*v as f64)).collect(),
            Variant::PackedFloat64Array(a) => a.iter().map(|v| Variant::Float(*v)).collect(),
            Variant::PackedStringArray(a) => a.iter().cloned().map(Variant::String).collect(),
            Variant::PackedVector2Array(a) => a.iter().copied().map(Variant::Vector2).collect(),
            Variant::PackedVector3Array(a) => a.iter().copied().map(Variant::Vector3).collect(),
            Variant::PackedColorArray(a) => a.iter().copied().map(Variant::Color).collect(),
            _ => return None,
        })
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Variant::Int(value)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Variant::Float(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::String(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::String(value)
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("]")
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Nil => f.write_str("<null>"),
            Variant::Bool(b) => write!(f, "{}", b),
            Variant::Int(i) => write!(f, "{}", i),
            Variant::Float(v) => f.write_str(&format_real(*v)),
            Variant::String(s) | Variant::StringName(s) | Variant::NodePath(s) => f.write_str(s),
            Variant::Vector2(v) => write!(f, "{}", v),
            Variant::Vector2i(v) => write!(f, "{}", v),
            Variant::Rect2(r) => write!(f, "{}", r),
            Variant::Vector3(v) => write!(f, "{}", v),
            Variant::Vector3i(v) => write!(f, "{}", v),
            Variant::Transform2D(t) => write!(f, "{}", t),
            Variant::Color(c) => write!(f, "{}", c),
            Variant::Rid(id) => write!(f, "RID({})", id),
            Variant::Object(obj) => match &obj.path {
                Some(path) => write!(f, "<{}:{}>", obj.class, path),
                None => write!(f, "<{}>", obj.class),
            },
            Variant::Callable(name) => write!(f, "Callable({})", name),
            Variant::Signal(name) => write!(f, "Signal({})", name),
            Variant::Dictionary(d) => {
                f.write_str("{ ")?;
                for (i, (k, v)) in d.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match k {
                        Variant::String(s) => write!(f, "\"{}\": ", s)?,
                        _ => write!(f, "{}: ", k)?,
                    }
                    match v {
                        Variant::String(s) => write!(f, "\"{}\"", s)?,
                        _ => write!(f, "{}", v)?,
                    }
                }
                f.write_str(" }")
            }
            Variant::Array(a) => write_list(f, a),
            Variant::PackedByteArray(a) => write_list(f, a),
            Variant::PackedInt32Array(a) => write_list(f, a),
            Variant::PackedInt64Array(a) => write_list(f, a),
            Variant::PackedFloat32Array(a) => {
                let items: Vec<String> = a.iter().map(|v| format_real(*v as f64)).collect();
                write_list(f, &items)
            }
            Variant::PackedFloat64Array(a) => {
                let items: Vec<String> = a.iter().map(|v| format_real(*v)).collect();
                write_list(f, &items)
            }
            Variant::PackedStringArray(a) => write_list(f, a),
            Variant::PackedVector2Array(a) => write_list(f, a),
            Variant::PackedVector3Array(a) => write_list(f, a),
            Variant::PackedColorArray(a) => write_list(f, a),
        }
    }
}
