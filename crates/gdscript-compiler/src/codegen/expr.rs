//! Expression lowering.
//!
//! Every expression yields the address holding its value. Intermediate
//! results go to temporaries; the result temporary of a node is taken
//! before the temporaries of its operands, which are released in reverse
//! order right after the instruction that consumes them.

use gdscript_ast::{
    Binding, ExprId, ExprKind, IdentifierSource, PropertyAccessor, SubscriptIndex, VariableMember,
};
use gdscript_core::{BinaryOp, ClassRef, CompilationError, Span, TypeKind, Variant};

use super::{FunctionCompiler, LocalKey};
use crate::bytecode::{Address, GlobalRef, Instruction, RuntimeType};

impl<'a> FunctionCompiler<'a> {
    pub(super) fn expr(&mut self, id: ExprId) -> Result<Address, CompilationError> {
        let tree = self.tree;
        let node = &tree[id];
        if !node.reduced {
            return Err(CompilationError::internal("expression was not analyzed", node.span));
        }
        if node.is_constant {
            return Ok(self.constant_of(id));
        }
        let span = node.span;

        match &node.kind {
            ExprKind::Literal(value) => Ok(self.builder.constant(value.clone())),
            ExprKind::Identifier { source, .. } => self.identifier(id, *source),
            ExprKind::SelfRef => Ok(Address::SelfRef),
            ExprKind::Array(elements) => {
                let dst = self.builder.push_temp();
                let items = self.operands(elements)?;
                self.builder.emit(Instruction::ConstructArray {
                    dst,
                    items: items.clone(),
                });
                self.release_all(&items, span)?;
                Ok(dst)
            }
            ExprKind::Dictionary(pairs) => {
                let dst = self.builder.push_temp();
                let mut entries = Vec::with_capacity(pairs.len() * 2);
                for &(key, value) in pairs {
                    entries.push(self.expr(key)?);
                    entries.push(self.expr(value)?);
                }
                self.builder.emit(Instruction::ConstructDictionary {
                    dst,
                    entries: entries.clone(),
                });
                self.release_all(&entries, span)?;
                Ok(dst)
            }
            ExprKind::Binary { op, left, right } => match op {
                BinaryOp::And | BinaryOp::Or => self.logical(*op, *left, *right, span),
                _ => {
                    let dst = self.builder.push_temp();
                    let left = self.expr(*left)?;
                    let right = self.expr(*right)?;
                    self.builder.emit(Instruction::Binary {
                        op: *op,
                        dst,
                        left,
                        right,
                    });
                    self.release_all(&[left, right], span)?;
                    Ok(dst)
                }
            },
            ExprKind::Unary { op, operand } => {
                let dst = self.builder.push_temp();
                let operand = self.expr(*operand)?;
                self.builder.emit(Instruction::Unary { op: *op, dst, operand });
                self.release(operand, span)?;
                Ok(dst)
            }
            ExprKind::Ternary {
                condition,
                true_expr,
                false_expr,
            } => self.ternary(*condition, *true_expr, *false_expr, span),
            ExprKind::Assignment { op, assignee, value } => {
                self.assignment(*op, *assignee, *value, span)?;
                Ok(Address::Nil)
            }
            ExprKind::Call {
                base,
                name,
                args,
                is_super,
            } => self.call(id, *base, name, args, *is_super),
            ExprKind::Subscript { base, index } => self.subscript(id, *base, index),
            ExprKind::Await(operand) => {
                let dst = self.builder.push_temp();
                let value = self.expr(*operand)?;
                self.builder.emit(Instruction::Await { dst, value });
                self.release(value, span)?;
                Ok(dst)
            }
            ExprKind::Preload { path } => Err(CompilationError::internal(
                format!("preload of \"{path}\" was not folded"),
                span,
            )),
            ExprKind::GetNode { path } => {
                let dst = self.builder.push_temp();
                let path = self.builder.constant(Variant::NodePath(path.clone()));
                let method = self.builder.name("get_node");
                self.builder.emit(Instruction::Call {
                    dst,
                    base: Address::SelfRef,
                    method,
                    args: vec![path],
                });
                Ok(dst)
            }
            ExprKind::Cast { operand, .. } => {
                if node.datatype.is_variant() {
                    return self.expr(*operand);
                }
                let dst = self.builder.push_temp();
                let value = self.expr(*operand)?;
                let ty = self.builder.type_index(RuntimeType::of(&node.datatype));
                self.builder.emit(Instruction::Cast { dst, value, ty });
                self.release(value, span)?;
                Ok(dst)
            }
            ExprKind::TypeTest { operand, target } => {
                let dst = self.builder.push_temp();
                let value = self.expr(*operand)?;
                let ty = self.builder.type_index(RuntimeType::of(&tree[*target].datatype));
                self.builder.emit(Instruction::TypeTest { dst, value, ty });
                self.release(value, span)?;
                Ok(dst)
            }
        }
    }

    /// Addresses of several expressions, evaluated left to right.
    pub(super) fn operands(&mut self, exprs: &[ExprId]) -> Result<Vec<Address>, CompilationError> {
        exprs.iter().map(|&e| self.expr(e)).collect()
    }

    /// A folded value. Constants of the class being compiled are read from
    /// its constant table.
    fn constant_of(&mut self, id: ExprId) -> Address {
        let node = &self.tree[id];
        if let ExprKind::Identifier {
            name,
            source: IdentifierSource::MemberConstant(class, _),
        } = &node.kind
        {
            if *class == self.class {
                if let Some(index) = self.constant_names.iter().position(|n| n == name) {
                    return Address::ClassConstant(index as u32);
                }
            }
        }
        self.builder.constant(node.reduced_value.clone())
    }

    // ==========================================================================
    // Identifiers and members
    // ==========================================================================

    fn identifier(&mut self, id: ExprId, source: IdentifierSource) -> Result<Address, CompilationError> {
        let span = self.tree[id].span;
        match source {
            IdentifierSource::Parameter(_, index) => Ok(Address::Parameter(index as u32)),
            IdentifierSource::LocalVariable(stmt)
            | IdentifierSource::LocalConstant(stmt)
            | IdentifierSource::LocalIterator(stmt) => self.local(LocalKey::Stmt(stmt), span),
            IdentifierSource::LocalBind(pattern) => self.local(LocalKey::Pattern(pattern), span),
            _ => self.bound(id),
        }
    }

    pub(super) fn local(&self, key: LocalKey, span: Span) -> Result<Address, CompilationError> {
        self.scope
            .get(key)
            .map(Address::Local)
            .ok_or_else(|| CompilationError::internal("local used outside its block", span))
    }

    /// Value of a name resolved to a member or a global.
    fn bound(&mut self, id: ExprId) -> Result<Address, CompilationError> {
        let tree = self.tree;
        let node = &tree[id];
        match &node.binding {
            Binding::MemberVariable {
                class,
                member,
                index,
                is_static,
            } => self.read_member(class, *member, *index, *is_static, node.span),
            Binding::NativeProperty(name) | Binding::Signal(name) => {
                Ok(self.get_named(Address::SelfRef, name))
            }
            Binding::Method(name) => {
                let base = self.self_address();
                Ok(self.get_named(base, name))
            }
            Binding::Global(name) => Ok(self.builder.global(GlobalRef::Named(name.clone()))),
            Binding::Unbound if node.datatype.is_meta_type => match &node.datatype.kind {
                TypeKind::Class(class) => Ok(self.builder.global(GlobalRef::Script(class.fqcn.clone()))),
                TypeKind::Native(name) => Ok(self.builder.global(GlobalRef::Named(name.clone()))),
                TypeKind::Builtin(ty) => Ok(self.builder.global(GlobalRef::Named(ty.name().to_string()))),
                _ => Err(CompilationError::internal("unsupported type reference", node.span)),
            },
            _ => Err(CompilationError::internal(
                format!("{} has no runtime binding", node.kind.name()),
                node.span,
            )),
        }
    }

    fn get_named(&mut self, base: Address, name: &str) -> Address {
        let dst = self.builder.push_temp();
        let name = self.builder.name(name);
        self.builder.emit(Instruction::GetNamed { dst, base, name });
        dst
    }

    /// Read a script member variable, through its getter when it has one.
    fn read_member(
        &mut self,
        owner: &ClassRef,
        member: usize,
        index: u32,
        is_static: bool,
        span: Span,
    ) -> Result<Address, CompilationError> {
        if is_static {
            return Ok(self.static_slot(owner, index));
        }
        let var = self.variable_member(owner, member, span)?;
        match self.getter_of(var, owner) {
            Some(getter) => {
                let dst = self.builder.push_temp();
                let method = self.builder.name(&getter);
                self.builder.emit(Instruction::Call {
                    dst,
                    base: Address::SelfRef,
                    method,
                    args: Vec::new(),
                });
                Ok(dst)
            }
            None => Ok(Address::Member(index)),
        }
    }

    pub(super) fn static_slot(&mut self, owner: &ClassRef, index: u32) -> Address {
        self.builder.global(GlobalRef::Static {
            class: owner.fqcn.clone(),
            index,
        })
    }

    pub(super) fn variable_member(
        &self,
        owner: &ClassRef,
        member: usize,
        span: Span,
    ) -> Result<&'a VariableMember, CompilationError> {
        let trees = self.trees;
        let tree = trees
            .get(owner.unit.index() as usize)
            .ok_or_else(|| CompilationError::internal("member of an unknown script", span))?;
        match tree[owner.class].members.get(member) {
            Some(gdscript_ast::Member::Variable(var)) => Ok(var),
            _ => Err(CompilationError::internal("member is not a variable", span)),
        }
    }

    /// Getter to call when reading `var`. Accessors read and write the
    /// plain field of the property they belong to.
    fn getter_of(&self, var: &VariableMember, owner: &ClassRef) -> Option<String> {
        match &var.accessor {
            PropertyAccessor::Inline { getter: Some(f), .. } => {
                if self.in_accessor_of(var, owner) {
                    return None;
                }
                let tree = self.trees.get(owner.unit.index() as usize)?;
                Some(tree[*f].name.clone())
            }
            PropertyAccessor::External { getter: Some(name), .. } => {
                (self.current_name() != name).then(|| name.clone())
            }
            _ => None,
        }
    }

    /// Setter to call when writing `var`.
    pub(super) fn setter_of(&self, var: &VariableMember, owner: &ClassRef) -> Option<String> {
        match &var.accessor {
            PropertyAccessor::Inline { setter: Some(f), .. } => {
                if self.in_accessor_of(var, owner) {
                    return None;
                }
                let tree = self.trees.get(owner.unit.index() as usize)?;
                Some(tree[*f].name.clone())
            }
            PropertyAccessor::External { setter: Some(name), .. } => {
                (self.current_name() != name).then(|| name.clone())
            }
            _ => None,
        }
    }

    fn in_accessor_of(&self, var: &VariableMember, owner: &ClassRef) -> bool {
        let Some(function) = self.function else {
            return false;
        };
        let function = &self.tree[function];
        self.unit == owner.unit
            && function.class == owner.class
            && function.accessor_of.as_deref() == Some(var.name.as_str())
    }

    // ==========================================================================
    // Operators
    // ==========================================================================

    /// `and` / `or` with short-circuit evaluation.
    fn logical(
        &mut self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        span: Span,
    ) -> Result<Address, CompilationError> {
        let dst = self.builder.push_temp();
        let mut on_true = Vec::new();
        let mut on_false = Vec::new();

        let left = self.expr(left)?;
        if op == BinaryOp::And {
            on_false.push(self.builder.emit_jump(Instruction::JumpIfNot {
                condition: left,
                target: 0,
            }));
        } else {
            on_true.push(self.builder.emit_jump(Instruction::JumpIf {
                condition: left,
                target: 0,
            }));
        }
        self.release(left, span)?;

        let right = self.expr(right)?;
        on_false.push(self.builder.emit_jump(Instruction::JumpIfNot {
            condition: right,
            target: 0,
        }));
        self.release(right, span)?;

        self.builder.patch_all(on_true);
        let yes = self.builder.constant(Variant::Bool(true));
        self.builder.emit(Instruction::Assign { dst, src: yes });
        let end = self.builder.emit_jump(Instruction::Jump { target: 0 });
        self.builder.patch_all(on_false);
        let no = self.builder.constant(Variant::Bool(false));
        self.builder.emit(Instruction::Assign { dst, src: no });
        self.builder.patch_jump(end);
        Ok(dst)
    }

    fn ternary(
        &mut self,
        condition: ExprId,
        true_expr: ExprId,
        false_expr: ExprId,
        span: Span,
    ) -> Result<Address, CompilationError> {
        let dst = self.builder.push_temp();
        let condition = self.expr(condition)?;
        let otherwise = self.builder.emit_jump(Instruction::JumpIfNot { condition, target: 0 });
        self.release(condition, span)?;

        let value = self.expr(true_expr)?;
        self.builder.emit(Instruction::Assign { dst, src: value });
        self.release(value, span)?;
        let end = self.builder.emit_jump(Instruction::Jump { target: 0 });

        self.builder.patch_jump(otherwise);
        let value = self.expr(false_expr)?;
        self.builder.emit(Instruction::Assign { dst, src: value });
        self.release(value, span)?;
        self.builder.patch_jump(end);
        Ok(dst)
    }

    // ==========================================================================
    // Calls and subscripts
    // ==========================================================================

    fn call(
        &mut self,
        id: ExprId,
        base: Option<ExprId>,
        name: &str,
        args: &[ExprId],
        is_super: bool,
    ) -> Result<Address, CompilationError> {
        let tree = self.tree;
        let node = &tree[id];
        let span = node.span;
        let dst = if node.datatype.is_void() {
            Address::Nil
        } else {
            self.builder.push_temp()
        };

        match &node.binding {
            Binding::Constructor(ty) => {
                let args = self.operands(args)?;
                self.builder.emit(Instruction::Construct {
                    dst,
                    ty: *ty,
                    args: args.clone(),
                });
                self.release_all(&args, span)?;
            }
            Binding::Utility(function) => {
                let function = self.builder.name(function);
                let args = self.operands(args)?;
                self.builder.emit(Instruction::CallUtility {
                    dst,
                    function,
                    args: args.clone(),
                });
                self.release_all(&args, span)?;
            }
            _ if is_super => {
                let method = self.builder.name(name);
                let args = self.operands(args)?;
                self.builder.emit(Instruction::CallSuper {
                    dst,
                    method,
                    args: args.clone(),
                });
                self.release_all(&args, span)?;
            }
            _ => {
                let method = self.builder.name(name);
                let receiver = match base {
                    None => None,
                    Some(base) => {
                        let base_type = &tree[base].datatype;
                        match base_type.kind {
                            TypeKind::Builtin(ty) if base_type.is_meta_type => {
                                let args = self.operands(args)?;
                                self.builder.emit(Instruction::CallBuiltinStatic {
                                    dst,
                                    ty,
                                    method,
                                    args: args.clone(),
                                });
                                self.release_all(&args, span)?;
                                return Ok(dst);
                            }
                            _ => Some(self.expr(base)?),
                        }
                    }
                };
                let args = self.operands(args)?;
                let base = receiver.unwrap_or(self.self_address());
                self.builder.emit(Instruction::Call {
                    dst,
                    base,
                    method,
                    args: args.clone(),
                });
                self.release_all(&args, span)?;
                if let Some(receiver) = receiver {
                    self.release(receiver, span)?;
                }
            }
        }
        Ok(dst)
    }

    fn subscript(
        &mut self,
        id: ExprId,
        base: ExprId,
        index: &SubscriptIndex,
    ) -> Result<Address, CompilationError> {
        let tree = self.tree;
        let node = &tree[id];
        let span = node.span;
        match index {
            SubscriptIndex::Attribute(name) => {
                match &node.binding {
                    Binding::MemberVariable {
                        class,
                        index,
                        is_static: true,
                        ..
                    } => return Ok(self.static_slot(class, *index)),
                    Binding::MemberVariable {
                        class,
                        member,
                        index,
                        ..
                    } if matches!(tree[base].kind, ExprKind::SelfRef) => {
                        return self.read_member(class, *member, *index, false, span);
                    }
                    _ => {}
                }
                let dst = self.builder.push_temp();
                let base = self.expr(base)?;
                let name = self.builder.name(name);
                self.builder.emit(Instruction::GetNamed { dst, base, name });
                self.release(base, span)?;
                Ok(dst)
            }
            SubscriptIndex::Index(index) => {
                let dst = self.builder.push_temp();
                let base = self.expr(base)?;
                let index = self.expr(*index)?;
                self.builder.emit(Instruction::GetIndexed { dst, base, index });
                self.release_all(&[base, index], span)?;
                Ok(dst)
            }
        }
    }
}
