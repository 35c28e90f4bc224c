//! Statement lowering.

use gdscript_ast::{ExprId, MatchBranch, StmtId, StmtKind, SuiteId};
use gdscript_core::{CompilationError, DataType, Span, default_for};

use super::{FunctionCompiler, LocalKey, conversion, hard_builtin};
use crate::bytecode::{Address, Instruction};

impl FunctionCompiler<'_> {
    pub(super) fn statement(&mut self, id: StmtId) -> Result<(), CompilationError> {
        let tree = self.tree;
        let stmt = &tree[id];
        let span = stmt.span;
        self.builder.set_line(span.line);

        match &stmt.kind {
            StmtKind::Expression(expr) => {
                let value = self.expr(*expr)?;
                self.release(value, span)?;
            }
            StmtKind::Variable {
                initializer,
                datatype,
                ..
            } => self.variable(id, *initializer, datatype, span)?,
            // folded at every use
            StmtKind::Constant { .. } => {}
            StmtKind::If {
                condition,
                true_suite,
                false_suite,
            } => self.if_stmt(*condition, *true_suite, *false_suite, span)?,
            StmtKind::While { condition, body } => {
                let start = self.builder.offset();
                let condition = self.expr(*condition)?;
                let exit = self.builder.emit_jump(Instruction::JumpIfNot { condition, target: 0 });
                self.release(condition, span)?;
                self.builder.enter_loop(Some(start));
                self.block(*body)?;
                self.builder.emit(Instruction::Jump { target: start });
                self.builder.patch_jump(exit);
                self.builder.exit_loop();
            }
            StmtKind::For { iterable, body, .. } => self.for_stmt(id, *iterable, *body, span)?,
            StmtKind::Match { subject, branches } => self.match_stmt(*subject, branches, span)?,
            StmtKind::Return(value) => self.return_stmt(*value, span)?,
            StmtKind::Break => self
                .builder
                .emit_break()
                .map_err(|_| CompilationError::BreakOutsideLoop { span })?,
            StmtKind::Continue => self
                .builder
                .emit_continue()
                .map_err(|_| CompilationError::ContinueOutsideLoop { span })?,
            StmtKind::Pass => {}
            StmtKind::Assert { condition, message } => {
                let condition = self.expr(*condition)?;
                let message = match message {
                    Some(message) => self.expr(*message)?,
                    None => Address::Nil,
                };
                self.builder.emit(Instruction::Assert { condition, message });
                self.release_all(&[condition, message], span)?;
            }
            StmtKind::Breakpoint => {
                self.builder.emit(Instruction::Breakpoint);
            }
        }
        self.check_balanced(span)
    }

    /// The initializer is evaluated before the name is in scope, so
    /// `var x = x` reads the outer `x`.
    fn variable(
        &mut self,
        id: StmtId,
        initializer: Option<ExprId>,
        datatype: &DataType,
        span: Span,
    ) -> Result<(), CompilationError> {
        match initializer {
            Some(init) => {
                let value = self.expr(init)?;
                let slot = Address::Local(self.scope.declare(LocalKey::Stmt(id)));
                let source = self.type_of(init);
                self.store(slot, value, datatype, &source);
                self.release(value, span)?;
            }
            None => {
                let slot = Address::Local(self.scope.declare(LocalKey::Stmt(id)));
                // slots are reused, so a fresh variable is always reset
                let src = match hard_builtin(datatype) {
                    Some(ty) => self.builder.constant(default_for(ty)),
                    None => Address::Nil,
                };
                self.builder.emit(Instruction::Assign { dst: slot, src });
            }
        }
        Ok(())
    }

    fn if_stmt(
        &mut self,
        condition: ExprId,
        true_suite: SuiteId,
        false_suite: Option<SuiteId>,
        span: Span,
    ) -> Result<(), CompilationError> {
        let condition = self.expr(condition)?;
        let otherwise = self.builder.emit_jump(Instruction::JumpIfNot { condition, target: 0 });
        self.release(condition, span)?;
        self.block(true_suite)?;

        match false_suite {
            Some(false_suite) => {
                let end = self.builder.emit_jump(Instruction::Jump { target: 0 });
                self.builder.patch_jump(otherwise);
                self.block(false_suite)?;
                self.builder.patch_jump(end);
            }
            None => self.builder.patch_jump(otherwise),
        }
        Ok(())
    }

    fn for_stmt(
        &mut self,
        id: StmtId,
        iterable: ExprId,
        body: SuiteId,
        span: Span,
    ) -> Result<(), CompilationError> {
        self.scope.push_scope();
        let counter = Address::Local(self.scope.declare_hidden());
        let container = Address::Local(self.scope.declare_hidden());

        let value = self.expr(iterable)?;
        self.builder.emit(Instruction::Assign { dst: container, src: value });
        self.release(value, span)?;

        let iterator = Address::Local(self.scope.declare(LocalKey::Stmt(id)));
        let begin = self.builder.emit_jump(Instruction::IterBegin {
            counter,
            container,
            iterator,
            exit: 0,
        });

        let body_start = self.builder.offset();
        self.builder.enter_loop(None);
        self.block(body)?;
        self.builder.set_continue_target();
        let next = self.builder.emit_jump(Instruction::IterNext {
            counter,
            container,
            iterator,
            exit: 0,
        });
        self.builder.emit(Instruction::Jump { target: body_start });

        self.builder.patch_jump(begin);
        self.builder.patch_jump(next);
        self.builder.exit_loop();
        self.scope.pop_scope();
        Ok(())
    }

    /// Branches are tried in order. Each branch's patterns are alternatives;
    /// the guard is checked once one of them matched.
    fn match_stmt(
        &mut self,
        subject: ExprId,
        branches: &[MatchBranch],
        span: Span,
    ) -> Result<(), CompilationError> {
        self.scope.push_scope();
        let slot = Address::Local(self.scope.declare_hidden());
        let value = self.expr(subject)?;
        self.builder.emit(Instruction::Assign { dst: slot, src: value });
        self.release(value, span)?;

        let mut ends = Vec::with_capacity(branches.len());
        for branch in branches {
            self.builder.set_line(branch.span.line);
            self.scope.push_scope();

            let matched = self.builder.push_temp();
            let mut success = Vec::with_capacity(branch.patterns.len());
            for &pattern in &branch.patterns {
                self.pattern(pattern, slot, matched)?;
                success.push(self.builder.emit_jump(Instruction::JumpIf {
                    condition: matched,
                    target: 0,
                }));
            }
            let mut next = vec![self.builder.emit_jump(Instruction::Jump { target: 0 })];
            self.builder.patch_all(success);
            self.release(matched, branch.span)?;

            if let Some(guard) = branch.guard {
                let condition = self.expr(guard)?;
                next.push(self.builder.emit_jump(Instruction::JumpIfNot { condition, target: 0 }));
                self.release(condition, branch.span)?;
            }

            self.block(branch.body)?;
            ends.push(self.builder.emit_jump(Instruction::Jump { target: 0 }));
            self.builder.patch_all(next);
            self.scope.pop_scope();
        }

        self.builder.patch_all(ends);
        self.scope.pop_scope();
        Ok(())
    }

    fn return_stmt(&mut self, value: Option<ExprId>, span: Span) -> Result<(), CompilationError> {
        let Some(expr) = value else {
            self.builder.emit(Instruction::Return { value: Address::Nil });
            return Ok(());
        };
        let value = self.expr(expr)?;
        let declared = self.function.map(|f| self.tree[f].datatype.clone());
        let convert_to = declared.and_then(|declared| conversion(&declared, &self.type_of(expr)));
        match convert_to {
            Some(to) => {
                let converted = self.builder.push_temp();
                self.builder.emit(Instruction::Convert {
                    dst: converted,
                    src: value,
                    to,
                });
                self.builder.emit(Instruction::Return { value: converted });
                self.release_all(&[value, converted], span)?;
            }
            None => {
                self.builder.emit(Instruction::Return { value });
                self.release(value, span)?;
            }
        }
        Ok(())
    }
}
