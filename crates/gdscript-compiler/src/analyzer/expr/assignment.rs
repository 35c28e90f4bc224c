//! Assignment and compound assignment.

use gdscript_ast::{Binding, ExprId, ExprKind, IdentifierSource, Member, StmtKind, SubscriptIndex};
use gdscript_core::{BinaryOp, CompilationError, DataType, Span, WarningCode};

use super::Reduction;
use super::binary::binary_result_type;
use crate::analyzer::members::soften;
use crate::analyzer::{Analyzer, Verdict};

impl Analyzer<'_, '_> {
    pub(super) fn reduce_assignment(
        &mut self,
        op: Option<BinaryOp>,
        assignee: ExprId,
        value: ExprId,
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let assignee_type = self.reduce_expression(assignee);
        let value_type = self.reduce_value(value)?;

        self.check_assignee(assignee)?;

        let assigned_type = match op {
            Some(op) => match binary_result_type(op, &assignee_type, &value_type) {
                Ok(Some(result)) => result,
                Ok(None) => {
                    self.mark_unsafe(span);
                    DataType::variant()
                }
                Err(()) => {
                    return Err(CompilationError::InvalidOperands {
                        op: op.as_str().to_string(),
                        left: assignee_type.to_string(),
                        right: value_type.to_string(),
                        span,
                    });
                }
            },
            None => value_type,
        };

        if assignee_type.is_hard_type() {
            match self.verdict(&assignee_type, &assigned_type) {
                Verdict::Compatible => {}
                Verdict::Narrowing => self.warn(
                    WarningCode::NarrowingConversion,
                    format!("Narrowing conversion (\"{assigned_type}\" is converted to \"{assignee_type}\" and will lose precision)."),
                    span,
                ),
                Verdict::Unsafe => self.mark_unsafe(span),
                Verdict::Incompatible => {
                    return Err(CompilationError::TypeMismatch {
                        message: format!(
                            "Value of type \"{assigned_type}\" cannot be assigned to a variable of type \"{assignee_type}\"."
                        ),
                        span,
                    });
                }
            }
        } else {
            let softened = if assigned_type.is_set() && !assigned_type.is_variant() {
                soften(assigned_type)
            } else {
                DataType::variant()
            };
            self.update_soft_type(assignee, softened);
        }

        Ok(Reduction::typed(assignee_type.with_constant(false)))
    }

    /// Only variables, properties and elements can be assigned to, and
    /// never through a constant.
    fn check_assignee(&self, assignee: ExprId) -> Result<(), CompilationError> {
        let node = &self.tree()[assignee];
        let assign_to_constant = || CompilationError::AssignToConstant { span: node.span };
        match &node.kind {
            ExprKind::Identifier { .. } => {
                if node.is_constant || node.datatype.is_constant {
                    return Err(assign_to_constant());
                }
            }
            ExprKind::Subscript { base, .. } => {
                let base_node = &self.tree()[*base];
                if node.is_constant || base_node.is_constant || base_node.datatype.is_constant {
                    return Err(assign_to_constant());
                }
            }
            _ => return Err(CompilationError::NotAssignable { span: node.span }),
        }
        Ok(())
    }

    /// A soft-typed variable takes the type of the last value assigned.
    fn update_soft_type(&mut self, assignee: ExprId, datatype: DataType) {
        let node = &self.tree()[assignee];
        match (&node.kind, &node.binding) {
            (
                ExprKind::Identifier {
                    source: IdentifierSource::LocalVariable(stmt),
                    ..
                },
                _,
            ) => {
                let stmt = *stmt;
                if let StmtKind::Variable { datatype: slot, .. } = &mut self.tree_mut()[stmt].kind {
                    *slot = datatype;
                }
            }
            (
                ExprKind::Identifier { .. }
                | ExprKind::Subscript {
                    index: SubscriptIndex::Attribute(_),
                    ..
                },
                Binding::MemberVariable { class, member, .. },
            ) => {
                let (unit, class, member) = (class.unit, class.class, *member);
                if let Member::Variable(v) = &mut self.session.tree_mut(unit)[class].members[member] {
                    if !v.datatype.is_hard_type() {
                        v.datatype = datatype;
                    }
                }
            }
            _ => {}
        }
    }
}
