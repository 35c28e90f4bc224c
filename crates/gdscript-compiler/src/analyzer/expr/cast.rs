//! `value as Type` and `value is Type`.

use gdscript_ast::{ExprId, TypeRefId};
use gdscript_core::{CompilationError, DataType, Span, TypeKind, VariantType, can_convert, convert};

use super::Reduction;
use super::binary::eval_error;
use crate::analyzer::Analyzer;

impl Analyzer<'_, '_> {
    pub(super) fn reduce_cast(
        &mut self,
        operand: ExprId,
        target: TypeRefId,
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let operand_type = self.reduce_value(operand)?;
        let target_type = self.resolve_type_ref(target, false).with_constant(false);

        if target_type.is_variant() {
            return Ok(Reduction::dynamic());
        }
        if operand_type.is_variant() {
            return Ok(Reduction::typed(target_type).unsafe_if(true));
        }

        let invalid = || CompilationError::InvalidCast {
            from: operand_type.to_string(),
            to: target_type.to_string(),
            span,
        };

        match (&target_type.kind, operand_type.runtime_type()) {
            (TypeKind::Enum(_), Some(VariantType::Int)) => Ok(Reduction::typed(target_type)),
            (TypeKind::Builtin(to), Some(from)) if from != VariantType::Object => {
                if !can_convert(from, *to) {
                    return Err(invalid());
                }
                if let Some(value) = self.value_of(operand) {
                    let converted = convert(&value, *to).map_err(|err| eval_error(err, span))?;
                    return Ok(Reduction::constant_typed(target_type, converted));
                }
                Ok(Reduction::typed(target_type))
            }
            (TypeKind::Native(_) | TypeKind::Class(_), Some(VariantType::Nil)) => {
                Ok(Reduction::typed(target_type))
            }
            (TypeKind::Native(_) | TypeKind::Class(_), Some(VariantType::Object)) => {
                // Downcasts are checked at run time.
                let upcast = self.compatible(&target_type, &operand_type, false);
                let downcast = self.compatible(&operand_type, &target_type, false);
                if upcast {
                    Ok(Reduction::typed(target_type))
                } else if downcast {
                    Ok(Reduction::typed(target_type).unsafe_if(true))
                } else {
                    Err(invalid())
                }
            }
            _ => Err(invalid()),
        }
    }

    pub(super) fn reduce_type_test(
        &mut self,
        operand: ExprId,
        target: TypeRefId,
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let operand_type = self.reduce_value(operand)?;
        let target_type = self.resolve_type_ref(target, false);
        let result = Reduction::typed(DataType::builtin(VariantType::Bool));

        if operand_type.is_hard_type()
            && !operand_type.is_variant()
            && !target_type.is_variant()
            && !self.compatible(&target_type, &operand_type, false)
            && !self.compatible(&operand_type, &target_type, false)
        {
            return Err(CompilationError::TypeMismatch {
                message: format!(
                    "Expression is of type \"{operand_type}\" so it can't be of type \"{target_type}\"."
                ),
                span,
            });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use gdscript_ast::{MemoryLoader, ParseTree, TreeBuilder};
    use gdscript_core::{ClassId, Diagnostics, TypeKind};
    use gdscript_registry::HostRegistry;

    use crate::CompilerOptions;
    use crate::analyzer::Analyzer;
    use crate::session::AnalysisSession;

    fn analyze(tree: ParseTree) -> (Vec<ParseTree>, Diagnostics) {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);
        let unit = session.add_main(tree);
        Analyzer::new(&mut session, unit).analyze();
        session.into_parts()
    }

    #[test]
    fn null_casts_to_object_types() {
        let mut b = TreeBuilder::new("res://null.gd");
        let inner = b.class(ClassId::HEAD, "Inner");
        let null = b.null();
        let node = b.type_ref(&["Node"]);
        let to_node = b.cast(null, node);
        let var_n = b.var_stmt("n", None, Some(to_node));
        let null = b.null();
        let inner_ref = b.type_ref(&["Inner"]);
        let to_inner = b.cast(null, inner_ref);
        let var_i = b.var_stmt("i", None, Some(to_inner));
        b.function(ClassId::HEAD, "f", vec![], None, vec![var_n, var_i]);

        let (trees, diagnostics) = analyze(b.finish());

        assert!(!diagnostics.has_errors(), "{diagnostics}");
        assert!(matches!(&trees[0][to_node].datatype.kind, TypeKind::Native(n) if n == "Node"));
        assert!(!trees[0][to_node].is_unsafe);
        assert!(
            matches!(&trees[0][to_inner].datatype.kind, TypeKind::Class(c) if c.class == inner)
        );
    }

    #[test]
    fn null_does_not_cast_to_vectors() {
        let mut b = TreeBuilder::new("res://null.gd");
        let null = b.null();
        let vector = b.type_ref(&["Vector2"]);
        let cast = b.cast(null, vector);
        let stmt = b.expr_stmt(cast);
        b.function(ClassId::HEAD, "f", vec![], None, vec![stmt]);

        let (_, diagnostics) = analyze(b.finish());

        assert!(diagnostics.has_errors());
    }
}
