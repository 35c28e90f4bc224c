//! The canonical static type used after resolution.
//!
//! Every expression, member and statement of the parse tree has a
//! [`DataType`] slot. It starts as [`TypeKind::Unresolved`] and is filled in
//! exactly once by the analyzer.

use std::fmt;

use crate::{ClassId, TypeHash, UnitId, Variant, VariantType};

/// How a type was determined. Ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum TypeSource {
    /// Nothing is known; the value is dynamic.
    #[default]
    Undetected,
    /// Deduced from an initializer or assignment. May change later.
    Inferred,
    /// Declared with `:=`, fixed to the initializer's type.
    AnnotatedInferred,
    /// Written out as an annotation.
    AnnotatedExplicit,
}

/// Link to a user-defined class.
///
/// Equality and hashing use the `(unit, class)` pair: two nested classes with
/// the same name in different files are different types.
#[derive(Debug, Clone)]
pub struct ClassRef {
    pub unit: UnitId,
    pub class: ClassId,
    /// `res://path.gd` for a head class, `outer::Name` for nested ones.
    pub fqcn: String,
    /// Name used in messages: the identifier, or the path for anonymous heads.
    pub name: String,
}

impl ClassRef {
    pub fn new(unit: UnitId, class: ClassId, fqcn: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            unit,
            class,
            fqcn: fqcn.into(),
            name: name.into(),
        }
    }

    pub fn hash(&self) -> TypeHash {
        TypeHash::from_name(&self.fqcn)
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit && self.class == other.class
    }
}

impl Eq for ClassRef {}

impl std::hash::Hash for ClassRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.unit.hash(state);
        self.class.hash(state);
    }
}

/// A named integer domain.
#[derive(Debug, Clone)]
pub struct EnumType {
    /// Declaring class: native class name or a user class fqcn. Empty for
    /// global enums.
    pub owner: String,
    pub name: String,
    /// Values in declaration order.
    pub values: Vec<(String, i64)>,
}

impl EnumType {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, values: Vec<(String, i64)>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            values,
        }
    }

    pub fn hash(&self) -> TypeHash {
        TypeHash::from_enum(&self.owner, &self.name)
    }

    pub fn value(&self, name: &str) -> Option<i64> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn contains_value(&self, value: i64) -> bool {
        self.values.iter().any(|(_, v)| *v == value)
    }

    /// The enum as a dictionary value, `{ "A": 0, "B": 1 }`.
    pub fn to_dictionary(&self) -> Variant {
        Variant::Dictionary(
            self.values
                .iter()
                .map(|(n, v)| (Variant::String(n.clone()), Variant::Int(*v)))
                .collect(),
        )
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}

impl Eq for EnumType {}

/// The kind of a [`DataType`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeKind {
    /// Not yet resolved. Must never reach code generation.
    #[default]
    Unresolved,
    /// Dynamic-any.
    Variant,
    Builtin(VariantType),
    /// A class known to the host oracle.
    Native(String),
    /// A user-defined class in this or another compilation unit.
    Class(ClassRef),
    Enum(EnumType),
}

/// A resolved static type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataType {
    pub kind: TypeKind,
    pub source: TypeSource,
    pub is_constant: bool,
    /// The type itself used as a value (`Node`, `Vector2`, `MyEnum`).
    pub is_meta_type: bool,
    /// The value is produced by a suspending call.
    pub is_coroutine: bool,
}

impl DataType {
    pub fn new(kind: TypeKind, source: TypeSource) -> Self {
        Self {
            kind,
            source,
            ..Self::default()
        }
    }

    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Dynamic-any with nothing known about it.
    pub fn variant() -> Self {
        Self::new(TypeKind::Variant, TypeSource::Undetected)
    }

    pub fn builtin(ty: VariantType) -> Self {
        Self::new(TypeKind::Builtin(ty), TypeSource::AnnotatedExplicit)
    }

    /// The `void` return type.
    pub fn void() -> Self {
        Self::builtin(VariantType::Nil)
    }

    pub fn native(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Native(name.into()), TypeSource::AnnotatedExplicit)
    }

    pub fn class(class: ClassRef) -> Self {
        Self::new(TypeKind::Class(class), TypeSource::AnnotatedExplicit)
    }

    /// A value of the enum.
    pub fn enum_value(ty: EnumType) -> Self {
        Self::new(TypeKind::Enum(ty), TypeSource::AnnotatedExplicit)
    }

    /// Hard type of a constant value.
    pub fn from_variant(value: &Variant) -> Self {
        match value {
            Variant::Object(obj) => Self::native(obj.class.clone()),
            _ => Self::builtin(value.get_type()),
        }
    }

    pub fn with_source(mut self, source: TypeSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_constant(mut self, is_constant: bool) -> Self {
        self.is_constant = is_constant;
        self
    }

    pub fn into_meta(mut self) -> Self {
        self.is_meta_type = true;
        self
    }

    /// Instance type of a meta type.
    pub fn into_instance(mut self) -> Self {
        self.is_meta_type = false;
        self
    }

    pub fn is_set(&self) -> bool {
        self.kind != TypeKind::Unresolved
    }

    pub fn is_hard_type(&self) -> bool {
        self.source >= TypeSource::AnnotatedInferred
    }

    /// Dynamic-any, or not resolved at all.
    pub fn is_variant(&self) -> bool {
        matches!(self.kind, TypeKind::Variant | TypeKind::Unresolved)
    }

    pub fn is_void(&self) -> bool {
        self.kind == TypeKind::Builtin(VariantType::Nil) && !self.is_meta_type
    }

    pub fn builtin_type(&self) -> Option<VariantType> {
        match self.kind {
            TypeKind::Builtin(ty) if !self.is_meta_type => Some(ty),
            _ => None,
        }
    }

    pub fn is_builtin(&self, ty: VariantType) -> bool {
        self.builtin_type() == Some(ty)
    }

    /// Native class, user class, or `null`.
    pub fn is_object_family(&self) -> bool {
        matches!(self.kind, TypeKind::Native(_) | TypeKind::Class(_))
    }

    pub fn class_ref(&self) -> Option<&ClassRef> {
        match &self.kind {
            TypeKind::Class(class) => Some(class),
            _ => None,
        }
    }

    /// The builtin type a value of this type has at run time.
    ///
    /// Enum values are integers and objects are `Object`.
    pub fn runtime_type(&self) -> Option<VariantType> {
        if self.is_meta_type {
            return match self.kind {
                TypeKind::Enum(_) => Some(VariantType::Dictionary),
                TypeKind::Unresolved | TypeKind::Variant => None,
                _ => Some(VariantType::Object),
            };
        }
        match &self.kind {
            TypeKind::Builtin(ty) => Some(*ty),
            TypeKind::Enum(_) => Some(VariantType::Int),
            TypeKind::Native(_) | TypeKind::Class(_) => Some(VariantType::Object),
            TypeKind::Variant | TypeKind::Unresolved => None,
        }
    }

    /// Same kind, ignoring source and flags.
    pub fn same_type(&self, other: &DataType) -> bool {
        self.kind == other.kind && self.is_meta_type == other.is_meta_type
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Unresolved => f.write_str("<unresolved type>"),
            TypeKind::Variant => f.write_str("Variant"),
            TypeKind::Builtin(VariantType::Nil) if !self.is_meta_type => f.write_str("void"),
            TypeKind::Builtin(ty) => f.write_str(ty.name()),
            TypeKind::Native(name) => f.write_str(name),
            TypeKind::Class(class) => f.write_str(&class.name),
            TypeKind::Enum(e) if e.owner.is_empty() => f.write_str(&e.name),
            TypeKind::Enum(e) => write!(f, "{}.{}", short_owner(&e.owner), e.name),
        }
    }
}

fn short_owner(owner: &str) -> &str {
    owner.rsplit("::").next().unwrap_or(owner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_types() {
        assert!(DataType::builtin(VariantType::Int).is_hard_type());
        assert!(
            DataType::builtin(VariantType::Int)
                .with_source(TypeSource::AnnotatedInferred)
                .is_hard_type()
        );
        assert!(
            !DataType::builtin(VariantType::Int)
                .with_source(TypeSource::Inferred)
                .is_hard_type()
        );
        assert!(!DataType::variant().is_hard_type());
        assert!(!DataType::unresolved().is_set());
    }

    #[test]
    fn class_ref_equality_ignores_names() {
        let a = ClassRef::new(UnitId::new(0), ClassId(1), "res://a.gd::Inner", "Inner");
        let b = ClassRef::new(UnitId::new(0), ClassId(1), "other", "Other");
        let c = ClassRef::new(UnitId::new(1), ClassId(1), "res://a.gd::Inner", "Inner");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display_names() {
        assert_eq!(DataType::void().to_string(), "void");
        assert_eq!(DataType::builtin(VariantType::Float).to_string(), "float");
        let e = EnumType::new("res://a.gd::Inner", "Mode", vec![("A".into(), 0)]);
        assert_eq!(DataType::enum_value(e).to_string(), "Inner.Mode");
    }

    #[test]
    fn runtime_types() {
        let e = EnumType::new("Node", "ProcessMode", vec![]);
        assert_eq!(DataType::enum_value(e.clone()).runtime_type(), Some(VariantType::Int));
        assert_eq!(
            DataType::enum_value(e).into_meta().runtime_type(),
            Some(VariantType::Dictionary)
        );
        assert_eq!(DataType::native("Node").runtime_type(), Some(VariantType::Object));
    }

    #[test]
    fn enum_dictionary() {
        let e = EnumType::new("", "E", vec![("A".into(), 0), ("B".into(), 5)]);
        assert_eq!(e.value("B"), Some(5));
        assert!(e.contains_value(0));
        assert_eq!(e.to_dictionary().to_string(), "{ \"A\": 0, \"B\": 5 }");
    }
}
