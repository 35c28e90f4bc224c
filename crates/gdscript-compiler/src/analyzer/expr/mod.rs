//! Expression reduction.
//!
//! Every expression node is reduced exactly once: its type, constant value
//! and binding are computed and stored on the node, and `reduced` is set.
//! Reducing an already reduced node returns the stored type.
//!
//! Sub-reducers return `Result<Reduction, CompilationError>`. An error is
//! recorded and the node degrades to an unsafe `Variant`, so analysis of
//! the surrounding code continues.

mod assignment;
mod binary;
mod calls;
mod cast;
mod identifiers;
mod literals;
mod member;
mod ternary;

use gdscript_ast::{Binding, ExprId, ExprKind};
use gdscript_core::{CompilationError, DataType, Variant};

use super::Analyzer;

/// Outcome of reducing one expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Reduction {
    pub datatype: DataType,
    /// Folded value for constant expressions.
    pub value: Option<Variant>,
    pub binding: Binding,
    pub is_unsafe: bool,
}

impl Reduction {
    pub(crate) fn typed(datatype: DataType) -> Self {
        Self {
            datatype,
            value: None,
            binding: Binding::Unbound,
            is_unsafe: false,
        }
    }

    /// A constant with the hard type of its value.
    pub(crate) fn constant(value: Variant) -> Self {
        Self::constant_typed(DataType::from_variant(&value), value)
    }

    pub(crate) fn constant_typed(datatype: DataType, value: Variant) -> Self {
        Self {
            datatype: datatype.with_constant(true),
            value: Some(value),
            binding: Binding::Unbound,
            is_unsafe: false,
        }
    }

    /// Statically unknown; checked at run time.
    pub(crate) fn dynamic() -> Self {
        Self {
            is_unsafe: true,
            ..Self::typed(DataType::variant())
        }
    }

    pub(crate) fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }

    pub(crate) fn unsafe_if(mut self, is_unsafe: bool) -> Self {
        self.is_unsafe |= is_unsafe;
        self
    }
}

impl Analyzer<'_, '_> {
    /// Reduce an expression and return its type.
    pub(crate) fn reduce_expression(&mut self, id: ExprId) -> DataType {
        let node = &self.tree()[id];
        if node.reduced {
            return node.datatype.clone();
        }
        let kind = node.kind.clone();
        let span = node.span;

        let result = match &kind {
            ExprKind::Literal(value) => Ok(Reduction::constant(value.clone())),
            ExprKind::Identifier { name, source } => self.reduce_identifier(name, *source, span),
            ExprKind::SelfRef => self.reduce_self(span),
            ExprKind::Array(items) => Ok(self.reduce_array(items)),
            ExprKind::Dictionary(entries) => Ok(self.reduce_dictionary(entries)),
            ExprKind::Binary { op, left, right } => self.reduce_binary(*op, *left, *right, span),
            ExprKind::Unary { op, operand } => self.reduce_unary(*op, *operand, span),
            ExprKind::Ternary {
                condition,
                true_expr,
                false_expr,
            } => Ok(self.reduce_ternary(*condition, *true_expr, *false_expr, span)),
            ExprKind::Assignment {
                op,
                assignee,
                value,
            } => self.reduce_assignment(*op, *assignee, *value, span),
            ExprKind::Call {
                base,
                name,
                args,
                is_super,
            } => self.reduce_call(*base, name, args, *is_super, span),
            ExprKind::Subscript { base, index } => self.reduce_subscript(id, *base, index, span),
            ExprKind::Await(operand) => Ok(self.reduce_await(*operand, span)),
            ExprKind::Preload { path } => self.reduce_preload(path, span),
            ExprKind::GetNode { .. } => self.reduce_get_node(span),
            ExprKind::Cast { operand, target } => self.reduce_cast(*operand, *target, span),
            ExprKind::TypeTest { operand, target } => {
                self.reduce_type_test(*operand, *target, span)
            }
        };

        let reduction = result.unwrap_or_else(|err| {
            self.error(&err);
            Reduction::dynamic()
        });
        if reduction.is_unsafe {
            self.mark_unsafe(span);
        }

        let node = &mut self.tree_mut()[id];
        node.datatype = reduction.datatype.clone();
        node.is_constant = reduction.value.is_some();
        node.reduced_value = reduction.value.unwrap_or_default();
        node.binding = reduction.binding;
        node.is_unsafe = reduction.is_unsafe;
        node.reduced = true;
        reduction.datatype
    }

    /// Reduce an expression used as a value; a call to a void function is
    /// an error here.
    pub(crate) fn reduce_value(&mut self, id: ExprId) -> Result<DataType, CompilationError> {
        let datatype = self.reduce_expression(id);
        if self.is_void_value(id) {
            return Err(CompilationError::VoidValue {
                name: self.callee_name(id),
                span: self.tree()[id].span,
            });
        }
        Ok(datatype)
    }

    /// A call whose callee returns nothing.
    pub(crate) fn is_void_value(&self, id: ExprId) -> bool {
        let node = &self.tree()[id];
        matches!(node.kind, ExprKind::Call { .. }) && node.datatype.is_void()
    }

    pub(crate) fn callee_name(&self, id: ExprId) -> String {
        match &self.tree()[id].kind {
            ExprKind::Call { name, .. } => name.clone(),
            other => other.name().to_string(),
        }
    }

    /// Folded value of a reduced expression.
    pub(crate) fn value_of(&self, id: ExprId) -> Option<Variant> {
        self.tree()[id].constant_value().cloned()
    }

    pub(crate) fn type_of(&self, id: ExprId) -> DataType {
        self.tree()[id].datatype.clone()
    }
}
