//! Subscripts: `base.name` and `base[index]`.

use gdscript_ast::{ExprId, ExprKind, SubscriptIndex};
use gdscript_core::{CompilationError, DataType, Span, TypeKind, Variant, VariantType, WarningCode, get_indexed};

use super::Reduction;
use super::binary::eval_error;
use crate::analyzer::Analyzer;

impl Analyzer<'_, '_> {
    pub(super) fn reduce_subscript(
        &mut self,
        id: ExprId,
        base: ExprId,
        index: &SubscriptIndex,
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let base_type = self.reduce_value(base)?;
        match index {
            SubscriptIndex::Attribute(name) => self.reduce_attribute(base, &base_type, name, span),
            SubscriptIndex::Index(index) => {
                let index = *index;
                let index_type = self.reduce_value(index)?;

                // `base[&"name"]` is `base.name`.
                if let Some(Variant::StringName(name)) = self.value_of(index) {
                    if !base_type.is_variant() && !base_type.is_builtin(VariantType::Dictionary) {
                        if let ExprKind::Subscript { index: slot, .. } = &mut self.tree_mut()[id].kind {
                            *slot = SubscriptIndex::Attribute(name.clone());
                        }
                        return self.reduce_attribute(base, &base_type, &name, span);
                    }
                }
                self.reduce_index(base, &base_type, index, &index_type, span)
            }
        }
    }

    fn reduce_attribute(
        &mut self,
        base: ExprId,
        base_type: &DataType,
        name: &str,
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        if base_type.is_variant() {
            self.warn(
                WarningCode::UnsafePropertyAccess,
                format!("The property \"{name}\" is not present on the inferred type \"Variant\" (but may be present on a subtype)."),
                span,
            );
            return Ok(Reduction::dynamic());
        }

        let base_value = self.value_of(base);
        if let Some(found) =
            self.reduce_member_from_base(base_type, base_value.as_ref(), name, false, span)?
        {
            return Ok(found);
        }

        if base_type.is_hard_type()
            || base_type.is_meta_type
            || matches!(base_type.kind, TypeKind::Builtin(_))
        {
            return Err(CompilationError::MemberNotFound {
                name: name.to_string(),
                base: base_type.to_string(),
                span,
            });
        }
        self.warn(
            WarningCode::UnsafePropertyAccess,
            format!("The property \"{name}\" is not present on the inferred type \"{base_type}\" (but may be present on a subtype)."),
            span,
        );
        Ok(Reduction::dynamic())
    }

    fn reduce_index(
        &mut self,
        base: ExprId,
        base_type: &DataType,
        index: ExprId,
        index_type: &DataType,
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let Some(base_runtime) = base_type.runtime_type() else {
            return Ok(Reduction::dynamic());
        };

        if let (Some(b), Some(i)) = (self.value_of(base), self.value_of(index)) {
            let value = get_indexed(&b, &i).map_err(|err| eval_error(err, span))?;
            return Ok(Reduction::constant(value));
        }

        let Some((allowed, result)) = index_rule(base_runtime) else {
            return Err(CompilationError::NotIndexable {
                base: base_type.to_string(),
                span,
            });
        };
        let result = match result {
            VariantType::Nil => DataType::variant(),
            ty => DataType::builtin(ty),
        };

        let Some(index_runtime) = index_type.runtime_type() else {
            return Ok(Reduction::typed(result).unsafe_if(true));
        };
        if allowed.accepts(index_runtime) {
            Ok(Reduction::typed(result))
        } else {
            Err(CompilationError::InvalidIndexType {
                index: index_type.to_string(),
                base: base_type.to_string(),
                span,
            })
        }
    }
}

/// Index types a base accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexKinds {
    Numeric,
    Named,
    NumericOrNamed,
    Any,
}

impl IndexKinds {
    fn accepts(self, ty: VariantType) -> bool {
        let numeric = matches!(ty, VariantType::Int | VariantType::Float);
        let named = matches!(ty, VariantType::String | VariantType::StringName);
        match self {
            IndexKinds::Numeric => numeric,
            IndexKinds::Named => named,
            IndexKinds::NumericOrNamed => numeric || named,
            IndexKinds::Any => true,
        }
    }
}

/// Allowed index kinds and element type of an indexable builtin. `Nil`
/// stands for an element of any type.
fn index_rule(base: VariantType) -> Option<(IndexKinds, VariantType)> {
    use VariantType as T;
    let rule = match base {
        T::String | T::StringName => (IndexKinds::Numeric, T::String),
        T::Array => (IndexKinds::Numeric, T::Nil),
        ty if ty.is_packed_array() => (IndexKinds::Numeric, ty.packed_element()?),
        T::Vector2 | T::Vector3 | T::Color => (IndexKinds::NumericOrNamed, T::Float),
        T::Vector2i | T::Vector3i => (IndexKinds::NumericOrNamed, T::Int),
        T::Transform2D => (IndexKinds::NumericOrNamed, T::Vector2),
        T::Rect2 => (IndexKinds::Named, T::Vector2),
        T::Dictionary => (IndexKinds::Any, T::Nil),
        T::Object => (IndexKinds::Named, T::Nil),
        _ => return None,
    };
    Some(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_rules_by_base() {
        assert_eq!(index_rule(VariantType::Vector2i), Some((IndexKinds::NumericOrNamed, VariantType::Int)));
        assert_eq!(
            index_rule(VariantType::PackedFloat32Array),
            Some((IndexKinds::Numeric, VariantType::Float))
        );
        assert!(index_rule(VariantType::Int).is_none());
        assert!(IndexKinds::Named.accepts(VariantType::StringName));
        assert!(!IndexKinds::Numeric.accepts(VariantType::String));
    }
}
