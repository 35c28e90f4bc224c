//! Type compatibility.
//!
//! [`is_compatible`] is the single predicate every assignment-like site uses.
//! [`assignment_verdict`] layers the warning policy on top of it.

use gdscript_ast::ParseTree;
use gdscript_core::{ClassRef, DataType, TypeKind, VariantType, can_convert_strict};
use gdscript_registry::HostTypeOracle;

/// Upper bound on base chain walks. Cyclic chains are rejected during
/// inheritance resolution, this only keeps broken trees from hanging.
const MAX_CHAIN: usize = 64;

/// The user classes from `class` up to its first native ancestor.
pub(crate) fn class_chain(trees: &[ParseTree], class: &ClassRef) -> Vec<ClassRef> {
    let mut chain = vec![class.clone()];
    let mut current = class.clone();
    while chain.len() < MAX_CHAIN {
        let node = &trees[current.unit.index() as usize][current.class];
        match &node.base_type.kind {
            TypeKind::Class(base) => {
                chain.push(base.clone());
                current = base.clone();
            }
            _ => break,
        }
    }
    chain
}

/// The native class a user class ultimately extends.
pub(crate) fn native_root(trees: &[ParseTree], class: &ClassRef) -> Option<String> {
    let last = class_chain(trees, class).pop()?;
    match &trees[last.unit.index() as usize][last.class].base_type.kind {
        TypeKind::Native(name) => Some(name.clone()),
        _ => None,
    }
}

/// Whether a value of type `source` may be stored in a slot of type `target`.
///
/// With `allow_implicit`, builtin values convertible through the host's
/// strict conversion relation are accepted as well.
pub fn is_compatible(
    oracle: &dyn HostTypeOracle,
    trees: &[ParseTree],
    target: &DataType,
    source: &DataType,
    allow_implicit: bool,
) -> bool {
    if target.is_variant() || source.is_variant() {
        return true;
    }

    if target.is_meta_type != source.is_meta_type {
        if !source.is_meta_type {
            return false;
        }
        // Types used as values: scripts are objects, enums are dictionaries.
        return match (&target.kind, &source.kind) {
            (TypeKind::Builtin(VariantType::Dictionary), TypeKind::Enum(_)) => true,
            (TypeKind::Native(target), TypeKind::Class(_)) => oracle.is_parent_class("GDScript", target),
            _ => false,
        };
    }

    match (&target.kind, &source.kind) {
        (TypeKind::Builtin(t), TypeKind::Builtin(s)) => {
            t == s || (allow_implicit && can_convert_strict(*s, *t))
        }
        (TypeKind::Builtin(VariantType::Int), TypeKind::Enum(_)) => true,
        (TypeKind::Enum(t), TypeKind::Enum(s)) => t == s,
        (TypeKind::Enum(_), TypeKind::Builtin(VariantType::Int)) => allow_implicit,
        (TypeKind::Native(_) | TypeKind::Class(_), TypeKind::Builtin(VariantType::Nil)) => true,
        (TypeKind::Native(t), TypeKind::Native(s)) => oracle.is_parent_class(s, t),
        (TypeKind::Native(t), TypeKind::Class(s)) => {
            native_root(trees, s).is_some_and(|root| oracle.is_parent_class(&root, t))
        }
        (TypeKind::Class(t), TypeKind::Class(s)) => class_chain(trees, s).contains(t),
        _ => false,
    }
}

/// Outcome of checking a value against a hard-typed target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Compatible,
    /// Accepted through an implicit conversion that may lose information.
    Narrowing,
    /// Accepted, but only checkable at run time.
    Unsafe,
    Incompatible,
}

/// Implicit conversions that drop information.
pub fn is_narrowing(from: VariantType, to: VariantType) -> bool {
    matches!(
        (from, to),
        (VariantType::Float, VariantType::Int)
            | (VariantType::Int | VariantType::Float, VariantType::Bool)
            | (VariantType::Vector2, VariantType::Vector2i)
            | (VariantType::Vector3, VariantType::Vector3i)
    )
}

/// Judge storing `source` into a hard `target`.
///
/// Dynamic sources and values whose type is a supertype of the target are
/// accepted as unsafe; anything else either passes, narrows or fails.
pub fn assignment_verdict(
    oracle: &dyn HostTypeOracle,
    trees: &[ParseTree],
    target: &DataType,
    source: &DataType,
) -> Verdict {
    if target.is_variant() {
        return Verdict::Compatible;
    }
    if source.is_variant() {
        return Verdict::Unsafe;
    }
    if is_compatible(oracle, trees, target, source, false) {
        return Verdict::Compatible;
    }
    if is_compatible(oracle, trees, target, source, true) {
        return match (source.builtin_type(), target.builtin_type()) {
            (Some(from), Some(to)) if is_narrowing(from, to) => Verdict::Narrowing,
            _ => Verdict::Compatible,
        };
    }
    if is_compatible(oracle, trees, source, target, false) {
        return Verdict::Unsafe;
    }
    Verdict::Incompatible
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdscript_core::EnumType;
    use gdscript_registry::HostRegistry;

    fn builtin(ty: VariantType) -> DataType {
        DataType::builtin(ty)
    }

    #[test]
    fn strict_convertible_pairs_need_implicit_conversion() {
        let oracle = HostRegistry::with_core_classes();
        for to in VariantType::ALL {
            for from in VariantType::ALL {
                if !can_convert_strict(from, to) {
                    continue;
                }
                let (x, y) = (builtin(to), builtin(from));
                assert!(is_compatible(&oracle, &[], &x, &y, true), "{from} -> {to}");
                assert_eq!(is_compatible(&oracle, &[], &x, &y, false), to == from, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn narrowing_verdicts() {
        let oracle = HostRegistry::with_core_classes();
        let int = builtin(VariantType::Int);
        let float = builtin(VariantType::Float);
        assert_eq!(assignment_verdict(&oracle, &[], &int, &float), Verdict::Narrowing);
        assert_eq!(assignment_verdict(&oracle, &[], &float, &int), Verdict::Compatible);
        assert_eq!(
            assignment_verdict(&oracle, &[], &int, &builtin(VariantType::String)),
            Verdict::Incompatible
        );
        assert_eq!(assignment_verdict(&oracle, &[], &int, &DataType::variant()), Verdict::Unsafe);
    }

    #[test]
    fn native_hierarchy() {
        let oracle = HostRegistry::with_core_classes();
        let node = DataType::native("Node");
        let sprite = DataType::native("Sprite2D");
        assert!(is_compatible(&oracle, &[], &node, &sprite, false));
        assert!(!is_compatible(&oracle, &[], &sprite, &node, false));
        assert_eq!(assignment_verdict(&oracle, &[], &sprite, &node), Verdict::Unsafe);
        assert!(is_compatible(&oracle, &[], &node, &builtin(VariantType::Nil), false));
    }

    #[test]
    fn enums_and_ints() {
        let oracle = HostRegistry::with_core_classes();
        let e = DataType::enum_value(EnumType::new("", "E", vec![("A".into(), 0)]));
        let int = builtin(VariantType::Int);
        assert!(is_compatible(&oracle, &[], &int, &e, false));
        assert!(!is_compatible(&oracle, &[], &e, &int, false));
        assert!(is_compatible(&oracle, &[], &e, &int, true));
        let meta = e.clone().into_meta();
        assert!(is_compatible(&oracle, &[], &builtin(VariantType::Dictionary), &meta, false));
        assert!(!is_compatible(&oracle, &[], &int, &meta, true));
    }
}
