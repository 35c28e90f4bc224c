//! Assignment lowering.
//!
//! A target is either a plain slot, a property setter, a native property
//! or a chain of subscripts. Chains are read down to the last container,
//! the last step is written, then every intermediate container is written
//! back into its parent so value types such as `Vector2` update in place.

use gdscript_ast::{Binding, ExprId, ExprKind, IdentifierSource, SubscriptIndex};
use gdscript_core::{BinaryOp, CompilationError, DataType, Span};

use super::{FunctionCompiler, LocalKey};
use crate::bytecode::{Address, Instruction};

/// Where an assignment stores its value.
#[derive(Debug)]
enum Target {
    Slot(Address),
    /// Call of a setter on `self`.
    Setter(String),
    /// Native property of `self`.
    Property(String),
}

/// One step of a subscript chain.
#[derive(Debug, Clone, Copy)]
enum Step<'t> {
    Attribute(&'t str),
    Index(Address),
}

impl FunctionCompiler<'_> {
    pub(super) fn assignment(
        &mut self,
        op: Option<BinaryOp>,
        assignee: ExprId,
        value: ExprId,
        span: Span,
    ) -> Result<(), CompilationError> {
        if self.is_direct_target(assignee) {
            let target = self.target_of(assignee)?;
            let (value, source) = self.assigned_value(op, assignee, value, span)?;
            let target_type = self.type_of(assignee);
            self.write(&target, value, &target_type, &source);
            self.release(value, span)?;
            return Ok(());
        }
        self.assign_chain(op, assignee, value, span)
    }

    /// The value to store: the right side, or `current op right`.
    fn assigned_value(
        &mut self,
        op: Option<BinaryOp>,
        assignee: ExprId,
        value: ExprId,
        span: Span,
    ) -> Result<(Address, DataType), CompilationError> {
        let Some(op) = op else {
            return Ok((self.expr(value)?, self.type_of(value)));
        };
        let dst = self.builder.push_temp();
        let left = self.expr(assignee)?;
        let right = self.expr(value)?;
        self.builder.emit(Instruction::Binary {
            op,
            dst,
            left,
            right,
        });
        self.release_all(&[left, right], span)?;
        Ok((dst, DataType::variant()))
    }

    /// Names and `self.name`, which are written without reading a container.
    fn is_direct_target(&self, id: ExprId) -> bool {
        let tree = self.tree;
        let node = &tree[id];
        match &node.kind {
            ExprKind::Identifier { .. } => true,
            ExprKind::Subscript {
                base,
                index: SubscriptIndex::Attribute(_),
            } => match &node.binding {
                Binding::MemberVariable { is_static: true, .. } => true,
                Binding::MemberVariable { .. } | Binding::NativeProperty(_) => {
                    matches!(tree[*base].kind, ExprKind::SelfRef)
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn target_of(&mut self, id: ExprId) -> Result<Target, CompilationError> {
        let tree = self.tree;
        let node = &tree[id];
        let span = node.span;
        if let ExprKind::Identifier { source, .. } = &node.kind {
            match *source {
                IdentifierSource::Parameter(_, index) => return Ok(Target::Slot(Address::Parameter(index as u32))),
                IdentifierSource::LocalVariable(stmt) | IdentifierSource::LocalIterator(stmt) => {
                    return Ok(Target::Slot(self.local(LocalKey::Stmt(stmt), span)?));
                }
                IdentifierSource::LocalBind(pattern) => {
                    return Ok(Target::Slot(self.local(LocalKey::Pattern(pattern), span)?));
                }
                _ => {}
            }
        }
        match &node.binding {
            Binding::MemberVariable {
                class,
                index,
                is_static: true,
                ..
            } => Ok(Target::Slot(self.static_slot(class, *index))),
            Binding::MemberVariable {
                class,
                member,
                index,
                ..
            } => {
                let var = self.variable_member(class, *member, span)?;
                Ok(match self.setter_of(var, class) {
                    Some(setter) => Target::Setter(setter),
                    None => Target::Slot(Address::Member(*index)),
                })
            }
            Binding::NativeProperty(name) => Ok(Target::Property(name.clone())),
            _ => Err(CompilationError::internal(
                format!("cannot assign to {}", node.kind.name()),
                span,
            )),
        }
    }

    fn write(&mut self, target: &Target, value: Address, target_type: &DataType, source: &DataType) {
        match target {
            Target::Slot(slot) => self.store(*slot, value, target_type, source),
            Target::Setter(setter) => {
                let method = self.builder.name(setter);
                self.builder.emit(Instruction::Call {
                    dst: Address::Nil,
                    base: Address::SelfRef,
                    method,
                    args: vec![value],
                });
            }
            Target::Property(name) => {
                let name = self.builder.name(name);
                self.builder.emit(Instruction::SetNamed {
                    base: Address::SelfRef,
                    name,
                    value,
                });
            }
        }
    }

    // ==========================================================================
    // Subscript chains
    // ==========================================================================

    fn assign_chain(
        &mut self,
        op: Option<BinaryOp>,
        assignee: ExprId,
        value: ExprId,
        span: Span,
    ) -> Result<(), CompilationError> {
        let tree = self.tree;

        // outermost step first while walking down, reversed below
        let mut subscripts = Vec::new();
        let mut root = assignee;
        while !self.is_direct_target(root) {
            let ExprKind::Subscript { base, index } = &tree[root].kind else {
                break;
            };
            subscripts.push(index);
            root = *base;
        }
        subscripts.reverse();
        if subscripts.is_empty() {
            return Err(CompilationError::internal("assignment target is not a subscript", span));
        }

        // every temporary pushed below, in push order
        let mut live = Vec::new();
        let root_address = self.expr(root)?;
        live.push(root_address);

        let mut steps = Vec::with_capacity(subscripts.len());
        for index in &subscripts {
            let step = match index {
                SubscriptIndex::Attribute(name) => Step::Attribute(name.as_str()),
                SubscriptIndex::Index(expr) => {
                    let address = self.expr(*expr)?;
                    live.push(address);
                    Step::Index(address)
                }
            };
            steps.push(step);
        }

        // containers[i] holds the value `steps[i]` applies to
        let mut containers = vec![root_address];
        for step in &steps[..steps.len() - 1] {
            let dst = self.builder.push_temp();
            live.push(dst);
            let base = containers[containers.len() - 1];
            self.get_step(dst, base, *step);
            containers.push(dst);
        }

        let last_container = containers[containers.len() - 1];
        let last_step = steps[steps.len() - 1];
        let stored = match op {
            None => {
                let value = self.expr(value)?;
                live.push(value);
                value
            }
            Some(op) => {
                let dst = self.builder.push_temp();
                live.push(dst);
                let current = self.builder.push_temp();
                live.push(current);
                self.get_step(current, last_container, last_step);
                let right = self.expr(value)?;
                live.push(right);
                self.builder.emit(Instruction::Binary {
                    op,
                    dst,
                    left: current,
                    right,
                });
                dst
            }
        };
        self.set_step(last_container, last_step, stored);

        for (i, step) in steps[..steps.len() - 1].iter().enumerate().rev() {
            self.set_step(containers[i], *step, containers[i + 1]);
        }

        if self.is_direct_target(root) {
            match self.target_of(root)? {
                Target::Slot(_) => {}
                target => self.write(&target, root_address, &DataType::variant(), &DataType::variant()),
            }
        }

        self.release_all(&live, span)
    }

    fn get_step(&mut self, dst: Address, base: Address, step: Step<'_>) {
        let instruction = match step {
            Step::Attribute(name) => Instruction::GetNamed {
                dst,
                base,
                name: self.builder.name(name),
            },
            Step::Index(index) => Instruction::GetIndexed { dst, base, index },
        };
        self.builder.emit(instruction);
    }

    fn set_step(&mut self, base: Address, step: Step<'_>, value: Address) {
        let instruction = match step {
            Step::Attribute(name) => Instruction::SetNamed {
                base,
                name: self.builder.name(name),
                value,
            },
            Step::Index(index) => Instruction::SetIndexed { base, index, value },
        };
        self.builder.emit(instruction);
    }
}
