//! `a if condition else b`.

use gdscript_ast::ExprId;
use gdscript_core::{DataType, Span, TypeSource, WarningCode};

use super::Reduction;
use crate::analyzer::Analyzer;

impl Analyzer<'_, '_> {
    pub(super) fn reduce_ternary(
        &mut self,
        condition: ExprId,
        true_expr: ExprId,
        false_expr: ExprId,
        span: Span,
    ) -> Reduction {
        for expr in [condition, true_expr, false_expr] {
            if let Err(err) = self.reduce_value(expr) {
                self.error(&err);
            }
        }
        let true_type = self.type_of(true_expr);
        let false_type = self.type_of(false_expr);

        if let Some(condition) = self.value_of(condition) {
            let taken = if condition.booleanize() { true_expr } else { false_expr };
            if let Some(value) = self.value_of(taken) {
                return Reduction::constant_typed(self.type_of(taken), value);
            }
        }

        if true_type.is_variant() || false_type.is_variant() {
            return Reduction::typed(DataType::variant());
        }
        let datatype = if self.compatible(&true_type, &false_type, false) {
            true_type.clone()
        } else if self.compatible(&false_type, &true_type, false) {
            false_type.clone()
        } else {
            self.warn(
                WarningCode::IncompatibleTernary,
                "Values of the ternary operator are not mutually compatible.",
                span,
            );
            return Reduction::dynamic();
        };

        // Only as hard as the weaker branch.
        let source = true_type.source.min(false_type.source);
        let datatype = if source < TypeSource::AnnotatedInferred {
            datatype.with_source(source.max(TypeSource::Inferred))
        } else {
            datatype
        };
        Reduction::typed(datatype.with_constant(false))
    }
}
