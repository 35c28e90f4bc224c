//! Binary and unary operators.
//!
//! Constant operands are folded through the host value model. Otherwise the
//! result type is discovered by evaluating the operator on placeholder
//! values of the operand types; the placeholders are never zero, so the dry
//! run cannot fail on a division.

use gdscript_ast::ExprId;
use gdscript_core::{
    BinaryOp, CompilationError, DataType, EvalError, Span, UnaryOp, VariantType, WarningCode,
    evaluate, evaluate_unary, placeholder_for,
};

use super::Reduction;
use crate::analyzer::Analyzer;

impl Analyzer<'_, '_> {
    pub(super) fn reduce_binary(
        &mut self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let left_type = self.reduce_value(left)?;
        let right_type = self.reduce_value(right)?;

        if let (Some(l), Some(r)) = (self.value_of(left), self.value_of(right)) {
            let value = evaluate(op, &l, &r).map_err(|err| eval_error(err, span))?;
            return Ok(Reduction::constant(value));
        }

        if op == BinaryOp::Divide
            && left_type.is_builtin(VariantType::Int)
            && right_type.is_builtin(VariantType::Int)
        {
            self.warn(
                WarningCode::IntegerDivision,
                "Integer division, decimal part will be discarded.",
                span,
            );
        }

        match binary_result_type(op, &left_type, &right_type) {
            Ok(Some(datatype)) => Ok(Reduction::typed(datatype)),
            Ok(None) => Ok(self.unsafe_operation(op.as_str(), span)),
            Err(()) => Err(CompilationError::InvalidOperands {
                op: op.as_str().to_string(),
                left: left_type.to_string(),
                right: right_type.to_string(),
                span,
            }),
        }
    }

    pub(super) fn reduce_unary(
        &mut self,
        op: UnaryOp,
        operand: ExprId,
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let operand_type = self.reduce_value(operand)?;

        if let Some(value) = self.value_of(operand) {
            let folded = evaluate_unary(op, &value).map_err(|err| eval_error(err, span))?;
            return Ok(Reduction::constant(folded));
        }
        if op == UnaryOp::Not {
            return Ok(Reduction::typed(DataType::builtin(VariantType::Bool)));
        }

        let Some(ty) = operand_type.runtime_type() else {
            return Ok(self.unsafe_operation(op.as_str(), span));
        };
        match evaluate_unary(op, &placeholder_for(ty)) {
            Ok(sample) => Ok(Reduction::typed(DataType::builtin(sample.get_type()))),
            Err(_) => Err(CompilationError::InvalidUnaryOperand {
                op: op.as_str().to_string(),
                operand: operand_type.to_string(),
                span,
            }),
        }
    }

    fn unsafe_operation(&mut self, op: &str, span: Span) -> Reduction {
        self.warn(
            WarningCode::UnsafeOperation,
            format!("The \"{op}\" operator is applied to a value of unknown type."),
            span,
        );
        Reduction::dynamic()
    }
}

/// Result type of `left op right`.
///
/// `Ok(None)` when an operand is dynamic, `Err(())` when the host rejects
/// the operand types.
pub(crate) fn binary_result_type(
    op: BinaryOp,
    left: &DataType,
    right: &DataType,
) -> Result<Option<DataType>, ()> {
    if op.is_logical() {
        return Ok(Some(DataType::builtin(VariantType::Bool)));
    }
    let (Some(l), Some(r)) = (left.runtime_type(), right.runtime_type()) else {
        return Ok(None);
    };
    if l == VariantType::Object || r == VariantType::Object {
        // Only identity comparisons are defined on objects.
        return match op {
            BinaryOp::Equal | BinaryOp::NotEqual => Ok(Some(DataType::builtin(VariantType::Bool))),
            BinaryOp::In => Ok(Some(DataType::builtin(VariantType::Bool))),
            _ => Err(()),
        };
    }
    evaluate(op, &placeholder_for(l), &placeholder_for(r))
        .map(|sample| Some(DataType::builtin(sample.get_type())))
        .map_err(|_| ())
}

/// Turn a value model failure during folding into a diagnostic.
pub(crate) fn eval_error(err: EvalError, span: Span) -> CompilationError {
    match err {
        EvalError::InvalidOperands { op, left, right } => CompilationError::InvalidOperands {
            op,
            left,
            right,
            span,
        },
        EvalError::InvalidUnaryOperand { op, operand } => CompilationError::InvalidUnaryOperand {
            op,
            operand,
            span,
        },
        other => CompilationError::ConstantEvaluation {
            message: other.to_string(),
            span,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_runs_never_divide_by_zero() {
        let int = DataType::builtin(VariantType::Int);
        for op in [BinaryOp::Divide, BinaryOp::Modulo] {
            assert_eq!(binary_result_type(op, &int, &int), Ok(Some(int.clone())));
        }
    }

    #[test]
    fn dynamic_operands_have_no_result_type() {
        let int = DataType::builtin(VariantType::Int);
        assert_eq!(binary_result_type(BinaryOp::Add, &int, &DataType::variant()), Ok(None));
        assert_eq!(
            binary_result_type(BinaryOp::Add, &int, &DataType::builtin(VariantType::String)),
            Err(())
        );
        assert_eq!(
            binary_result_type(BinaryOp::Or, &DataType::variant(), &int),
            Ok(Some(DataType::builtin(VariantType::Bool)))
        );
    }
}
