//! `match` pattern lowering.
//!
//! A pattern test leaves a bool in its output address. Structural patterns
//! jump to their end as soon as one check fails, leaving `false` behind.

use gdscript_ast::{ExprId, PatternId, PatternKind};
use gdscript_core::{BinaryOp, CompilationError, Span, Variant, VariantType};

use super::{FunctionCompiler, LocalKey};
use crate::bytecode::{Address, Instruction, RuntimeType};
use crate::emit::JumpLabel;

impl FunctionCompiler<'_> {
    pub(super) fn pattern(
        &mut self,
        id: PatternId,
        value: Address,
        out: Address,
    ) -> Result<(), CompilationError> {
        let tree = self.tree;
        let pattern = &tree[id];
        let span = pattern.span;

        match &pattern.kind {
            PatternKind::Literal(expr) | PatternKind::Expression(expr) => {
                self.value_pattern(*expr, value, out)
            }
            PatternKind::Bind(_) => {
                let slot = Address::Local(self.scope.declare(LocalKey::Pattern(id)));
                self.builder.emit(Instruction::Assign { dst: slot, src: value });
                self.emit_true(out);
                Ok(())
            }
            PatternKind::Wildcard => {
                self.emit_true(out);
                Ok(())
            }
            PatternKind::Array { elements, rest } => {
                let mut fail = self.shape_check(value, out, VariantType::Array, elements.len(), *rest, span)?;
                for (i, &element) in elements.iter().enumerate() {
                    if matches!(tree[element].kind, PatternKind::Wildcard) {
                        continue;
                    }
                    let item = self.builder.push_temp();
                    let index = self.builder.constant(Variant::Int(i as i64));
                    self.builder.emit(Instruction::GetIndexed { dst: item, base: value, index });
                    self.pattern(element, item, out)?;
                    fail.push(self.fail_unless(out));
                    self.release(item, span)?;
                }
                self.builder.patch_all(fail);
                Ok(())
            }
            PatternKind::Dictionary { entries, rest } => {
                let mut fail =
                    self.shape_check(value, out, VariantType::Dictionary, entries.len(), *rest, span)?;
                let has = self.builder.name("has");
                for &(key, sub) in entries {
                    let key = self.expr(key)?;
                    self.builder.emit(Instruction::Call {
                        dst: out,
                        base: value,
                        method: has,
                        args: vec![key],
                    });
                    fail.push(self.fail_unless(out));
                    if let Some(sub) = sub {
                        let item = self.builder.push_temp();
                        self.builder.emit(Instruction::GetIndexed { dst: item, base: value, index: key });
                        self.pattern(sub, item, out)?;
                        fail.push(self.fail_unless(out));
                        self.release(item, span)?;
                    }
                    self.release(key, span)?;
                }
                self.builder.patch_all(fail);
                Ok(())
            }
        }
    }

    /// Same type and equal value.
    fn value_pattern(&mut self, expr: ExprId, value: Address, out: Address) -> Result<(), CompilationError> {
        let span = self.tree[expr].span;
        let expected = self.expr(expr)?;
        let ty = RuntimeType::of(&self.type_of(expr));
        let typed = !matches!(ty, RuntimeType::Variant | RuntimeType::Builtin(VariantType::Nil));

        let mismatch = if typed {
            let ty = self.builder.type_index(ty);
            self.builder.emit(Instruction::TypeTest { dst: out, value, ty });
            Some(self.fail_unless(out))
        } else {
            None
        };
        self.builder.emit(Instruction::Binary {
            op: BinaryOp::Equal,
            dst: out,
            left: value,
            right: expected,
        });
        if let Some(mismatch) = mismatch {
            self.builder.patch_jump(mismatch);
        }
        self.release(expected, span)
    }

    /// Container type and element count. Returns the jumps taken on failure.
    fn shape_check(
        &mut self,
        value: Address,
        out: Address,
        container: VariantType,
        count: usize,
        rest: bool,
        span: Span,
    ) -> Result<Vec<JumpLabel>, CompilationError> {
        let ty = self.builder.type_index(RuntimeType::Builtin(container));
        self.builder.emit(Instruction::TypeTest { dst: out, value, ty });
        let mut fail = vec![self.fail_unless(out)];

        let size = self.builder.push_temp();
        let method = self.builder.name("size");
        self.builder.emit(Instruction::Call {
            dst: size,
            base: value,
            method,
            args: Vec::new(),
        });
        let expected = self.builder.constant(Variant::Int(count as i64));
        let op = if rest { BinaryOp::GreaterEqual } else { BinaryOp::Equal };
        self.builder.emit(Instruction::Binary {
            op,
            dst: out,
            left: size,
            right: expected,
        });
        fail.push(self.fail_unless(out));
        self.release(size, span)?;
        Ok(fail)
    }

    fn fail_unless(&mut self, condition: Address) -> JumpLabel {
        self.builder.emit_jump(Instruction::JumpIfNot { condition, target: 0 })
    }

    fn emit_true(&mut self, out: Address) {
        let yes = self.builder.constant(Variant::Bool(true));
        self.builder.emit(Instruction::Assign { dst: out, src: yes });
    }
}
