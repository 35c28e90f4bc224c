//! Code generation.
//!
//! Lowers an analyzed parse tree to [`CompiledScript`]. Every function is
//! compiled independently by a [`FunctionCompiler`] that owns the local
//! scope, the temporary stack and the instruction builder of that function.
//!
//! Besides the declared functions every class gets:
//! - `@implicit_new`, which runs the member variable initializers
//! - `@static_init`, for classes with static variables
//! - the synthetic functions of inline property accessors
//!
//! The first code generation error is kept with its source position. It
//! aborts the function it occurred in; the other functions are still
//! compiled so the tree is fully walked, but the script is rejected.

mod assign;
mod expr;
mod pattern;
mod scope;
mod stmt;

pub use scope::{LocalKey, LocalScope};

use gdscript_ast::{FunctionId, Member, ParseTree, SuiteId};
use gdscript_core::{
    ClassId, CompilationError, DataType, Span, TypeKind, UnitId, Variant, VariantType, default_for,
};

use crate::CompilerOptions;
use crate::analyzer::class_chain;
use crate::bytecode::{
    Address, CompiledClass, CompiledFunction, CompiledScript, ConstantPool, GlobalRef, Instruction,
    ParamInfo, RuntimeType,
};
use crate::emit::FunctionBuilder;

pub const IMPLICIT_NEW: &str = "@implicit_new";
pub const STATIC_INIT: &str = "@static_init";

/// Generates the bytecode of one analyzed script.
pub struct CodeGenerator<'t> {
    trees: &'t [ParseTree],
    unit: UnitId,
    options: &'t CompilerOptions,
    constants: ConstantPool,
    first_error: Option<CompilationError>,
}

impl<'t> CodeGenerator<'t> {
    pub fn new(trees: &'t [ParseTree], unit: UnitId, options: &'t CompilerOptions) -> Self {
        Self {
            trees,
            unit,
            options,
            constants: ConstantPool::new(),
            first_error: None,
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate(mut self) -> Result<CompiledScript, CompilationError> {
        let tree = self.tree();
        tracing::debug!(path = %tree.path, "codegen");
        let main = self.compile_class(ClassId::HEAD);
        match self.first_error {
            Some(err) => Err(err),
            None => Ok(CompiledScript {
                path: tree.path.clone(),
                main,
                constants: self.constants,
            }),
        }
    }

    fn tree(&self) -> &'t ParseTree {
        &self.trees[self.unit.index() as usize]
    }

    /// Keep the first error only.
    fn record(&mut self, err: CompilationError) {
        tracing::warn!(%err, span = %err.span(), "codegen: function aborted");
        if self.first_error.is_none() {
            self.first_error = Some(err);
        }
    }

    fn compile_class(&mut self, class: ClassId) -> CompiledClass {
        let tree = self.tree();
        let node = &tree[class];
        tracing::trace!(class = %node.fqcn, "codegen: class");

        let mut compiled = CompiledClass {
            name: node.display_name().to_string(),
            fqcn: node.fqcn.clone(),
            constants: class_constants(tree, class),
            ..CompiledClass::default()
        };

        let mut fields: Vec<(u32, &str)> = Vec::new();
        let mut statics: Vec<(u32, &str)> = Vec::new();
        let mut nested = Vec::new();
        for member in &node.members {
            match member {
                Member::Variable(v) if v.is_static => statics.push((v.index, v.name.as_str())),
                Member::Variable(v) => fields.push((v.index, v.name.as_str())),
                Member::Class(c) => nested.push(*c),
                _ => {}
            }
        }
        fields.sort_unstable();
        statics.sort_unstable();
        compiled.field_count = inherited_field_count(self.trees, tree, class) + fields.len() as u32;
        compiled.fields = fields.into_iter().map(|(_, name)| name.to_string()).collect();
        compiled.statics = statics.into_iter().map(|(_, name)| name.to_string()).collect();

        let constant_names: Vec<String> =
            compiled.constants.iter().map(|(name, _)| name.clone()).collect();

        match self.function_compiler(class, None, false, &constant_names).compile_initializer(false) {
            Ok(f) => compiled.functions.push(f),
            Err(err) => self.record(err),
        }
        if !compiled.statics.is_empty() {
            match self.function_compiler(class, None, true, &constant_names).compile_initializer(true) {
                Ok(f) => compiled.functions.push(f),
                Err(err) => self.record(err),
            }
        }

        let functions: Vec<FunctionId> = tree.function_ids().filter(|f| tree[*f].class == class).collect();
        for function in functions {
            let is_static = tree[function].is_static;
            let result = self
                .function_compiler(class, Some(function), is_static, &constant_names)
                .compile_function(function);
            match result {
                Ok(f) => compiled.functions.push(f),
                Err(err) => self.record(err),
            }
        }

        for class in nested {
            let sub = self.compile_class(class);
            compiled.subclasses.push(sub);
        }
        compiled
    }

    fn function_compiler<'a>(
        &'a mut self,
        class: ClassId,
        function: Option<FunctionId>,
        is_static: bool,
        constant_names: &'a [String],
    ) -> FunctionCompiler<'a> {
        FunctionCompiler {
            trees: self.trees,
            tree: self.tree(),
            unit: self.unit,
            class,
            function,
            is_static,
            constant_names,
            builder: FunctionBuilder::new(&mut self.constants, self.options.emit_line_info),
            scope: LocalScope::new(),
        }
    }
}

fn inherited_field_count(trees: &[ParseTree], tree: &ParseTree, class: ClassId) -> u32 {
    match &tree[class].base_type.kind {
        TypeKind::Class(base) => class_chain(trees, base)
            .iter()
            .map(|c| trees[c.unit.index() as usize].own_field_count(c.class))
            .sum(),
        _ => 0,
    }
}

/// Named constants of a class: constants, enum values and enums.
fn class_constants(tree: &ParseTree, class: ClassId) -> Vec<(String, Variant)> {
    tree[class]
        .members
        .iter()
        .filter_map(|member| match member {
            Member::Constant(c) => Some((c.name.clone(), c.value.clone())),
            Member::EnumValue(v) => Some((v.name.clone(), Variant::Int(v.value.unwrap_or_default()))),
            Member::Enum(e) => match &e.datatype.kind {
                TypeKind::Enum(ty) => Some((e.name.clone(), ty.to_dictionary())),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

// ==========================================================================
// Function compiler
// ==========================================================================

/// Per-function code generation state.
pub(crate) struct FunctionCompiler<'a> {
    trees: &'a [ParseTree],
    tree: &'a ParseTree,
    unit: UnitId,
    class: ClassId,
    function: Option<FunctionId>,
    is_static: bool,
    /// Names of the class constant table, by `ClassConstant` index.
    constant_names: &'a [String],
    builder: FunctionBuilder<'a>,
    scope: LocalScope,
}

impl<'a> FunctionCompiler<'a> {
    /// Compile a declared function or accessor.
    fn compile_function(mut self, function: FunctionId) -> Result<CompiledFunction, CompilationError> {
        let tree = self.tree;
        let node = &tree[function];
        tracing::debug!(function = %node.name, "codegen: function");

        // optional arguments: entry `i` skips the first `i` default initializers
        let mut default_entries = Vec::new();
        for (index, param) in node.params.iter().enumerate() {
            let Some(default) = param.default else {
                continue;
            };
            default_entries.push(self.builder.offset());
            self.builder.set_line(param.span.line);
            let value = self.expr(default)?;
            let source = self.type_of(default);
            self.store(Address::Parameter(index as u32), value, &param.datatype, &source);
            self.release(value, param.span)?;
        }
        default_entries.push(self.builder.offset());

        self.block(node.body)?;
        self.builder.emit(Instruction::End);
        self.check_balanced(node.span)?;

        let params = node
            .params
            .iter()
            .map(|p| ParamInfo {
                name: p.name.clone(),
                has_default: p.default.is_some(),
            })
            .collect();
        Ok(self.finish(
            node.name.clone(),
            params,
            default_entries,
            node.is_coroutine,
            RuntimeType::of(&node.datatype),
        ))
    }

    /// `@implicit_new` or `@static_init`: member initializers in
    /// declaration order. Typed variables without an initializer get the
    /// default value of their type.
    fn compile_initializer(mut self, statics: bool) -> Result<CompiledFunction, CompilationError> {
        let tree = self.tree;
        let class = &tree[self.class];
        for member in &class.members {
            let Member::Variable(var) = member else {
                continue;
            };
            if var.is_static != statics {
                continue;
            }
            self.builder.set_line(var.span.line);
            let slot = if statics {
                self.builder.global(GlobalRef::Static {
                    class: class.fqcn.clone(),
                    index: var.index,
                })
            } else {
                Address::Member(var.index)
            };
            match var.initializer {
                Some(init) => {
                    let value = self.expr(init)?;
                    let source = self.type_of(init);
                    self.store(slot, value, &var.datatype, &source);
                    self.release(value, var.span)?;
                }
                None => {
                    if let Some(ty) = hard_builtin(&var.datatype) {
                        let value = self.builder.constant(default_for(ty));
                        self.builder.emit(Instruction::Assign { dst: slot, src: value });
                    }
                }
            }
            self.check_balanced(var.span)?;
        }
        self.builder.emit(Instruction::End);

        let name = if statics { STATIC_INIT } else { IMPLICIT_NEW };
        Ok(self.finish(name.to_string(), Vec::new(), vec![0], false, RuntimeType::Variant))
    }

    fn finish(
        self,
        name: String,
        params: Vec<ParamInfo>,
        default_entries: Vec<u32>,
        is_coroutine: bool,
        return_type: RuntimeType,
    ) -> CompiledFunction {
        let local_count = self.scope.frame_size();
        let is_static = self.is_static;
        let emitted = self.builder.finish();
        CompiledFunction {
            name,
            params,
            default_entries,
            code: emitted.code,
            lines: emitted.lines,
            types: emitted.types,
            globals: emitted.globals,
            local_count,
            temp_count: emitted.temp_count,
            is_static,
            is_coroutine,
            return_type,
        }
    }

    // ==========================================================================
    // Shared helpers
    // ==========================================================================

    fn block(&mut self, suite: SuiteId) -> Result<(), CompilationError> {
        let tree = self.tree;
        self.scope.push_scope();
        for &stmt in &tree[suite].stmts {
            self.statement(stmt)?;
        }
        self.scope.pop_scope();
        Ok(())
    }

    /// Release an operand once its last use is emitted.
    fn release(&mut self, address: Address, span: Span) -> Result<(), CompilationError> {
        if address.is_temporary() {
            self.builder
                .pop_temp(address)
                .map_err(|err| CompilationError::internal(err.to_string(), span))?;
        }
        Ok(())
    }

    fn release_all(&mut self, addresses: &[Address], span: Span) -> Result<(), CompilationError> {
        for &address in addresses.iter().rev() {
            self.release(address, span)?;
        }
        Ok(())
    }

    fn check_balanced(&self, span: Span) -> Result<(), CompilationError> {
        match self.builder.temp_depth() {
            0 => Ok(()),
            depth => Err(CompilationError::internal(
                format!("{depth} temporaries still live at the end of a statement"),
                span,
            )),
        }
    }

    /// Copy `src` into `dst`, converting when `dst` is a hard builtin slot
    /// of another type.
    fn store(&mut self, dst: Address, src: Address, target: &DataType, source: &DataType) {
        if dst == src {
            return;
        }
        let instruction = match conversion(target, source) {
            Some(to) => Instruction::Convert { dst, src, to },
            None => Instruction::Assign { dst, src },
        };
        self.builder.emit(instruction);
    }

    fn type_of(&self, expr: gdscript_ast::ExprId) -> DataType {
        self.tree[expr].datatype.clone()
    }

    fn current_name(&self) -> &str {
        match self.function {
            Some(f) => &self.tree[f].name,
            None => IMPLICIT_NEW,
        }
    }

    /// Receiver of calls to the script's own methods.
    fn self_address(&self) -> Address {
        if self.is_static {
            Address::Class
        } else {
            Address::SelfRef
        }
    }
}

fn hard_builtin(datatype: &DataType) -> Option<VariantType> {
    if !datatype.is_hard_type() {
        return None;
    }
    datatype.builtin_type().filter(|ty| *ty != VariantType::Nil)
}

/// Builtin type to convert to when storing `source` into a `target` slot.
fn conversion(target: &DataType, source: &DataType) -> Option<VariantType> {
    let to = hard_builtin(target)?;
    if source.runtime_type() == Some(to) {
        None
    } else {
        Some(to)
    }
}

#[cfg(test)]
mod tests {
    use gdscript_ast::{MemoryLoader, TreeBuilder};
    use gdscript_core::{BinaryOp, ClassId, VariantType};
    use gdscript_registry::HostRegistry;

    use super::*;
    use crate::Compiler;
    use crate::bytecode::OpCode;

    const HEAD: ClassId = ClassId::HEAD;

    fn compile(b: TreeBuilder) -> CompiledScript {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let result = Compiler::new(&oracle, &loader).compile(b.finish());
        assert!(!result.diagnostics.has_errors(), "{:?}", result.diagnostics.errors());
        result.script.expect("script compiles")
    }

    fn opcodes(function: &CompiledFunction) -> Vec<OpCode> {
        function.code.iter().map(Instruction::opcode).collect()
    }

    fn jumps_are_patched(function: &CompiledFunction) -> bool {
        let len = function.code.len() as u32;
        function.code.clone().iter_mut().all(|i| i.target_mut().is_none_or(|t| *t <= len))
    }

    #[test]
    fn implicit_new_runs_member_initializers() {
        let mut b = TreeBuilder::new("res://a.gd");
        let five = b.int(5);
        let int = b.type_ref(&["int"]);
        let float = b.type_ref(&["float"]);
        b.variable(HEAD, "hp", Some(int), Some(five));
        b.variable(HEAD, "speed", Some(float), None);

        let script = compile(b);
        let init = script.main.function(IMPLICIT_NEW).unwrap();
        let stores = init
            .code
            .iter()
            .filter(|i| matches!(i, Instruction::Assign { dst: Address::Member(_), .. }))
            .count();
        assert_eq!(stores, 2);
        assert_eq!(script.main.fields, vec!["hp".to_string(), "speed".to_string()]);
        assert_eq!(init.code.last(), Some(&Instruction::End));
    }

    #[test]
    fn default_arguments_get_entry_points() {
        let mut b = TreeBuilder::new("res://a.gd");
        let one = b.int(1);
        let two = b.int(2);
        let params = vec![
            b.param("a", None, None),
            b.param("b", None, Some(one)),
            b.param("c", None, Some(two)),
        ];
        let body = vec![b.pass()];
        b.function(HEAD, "f", params, None, body);

        let script = compile(b);
        let f = script.main.function("f").unwrap();
        assert_eq!(f.default_entries, vec![0, 1, 2]);
        assert_eq!(f.required_count(), 1);
        assert_eq!(f.code[0], Instruction::Assign {
            dst: Address::Parameter(1),
            src: Address::Constant(0),
        });
    }

    #[test]
    fn temporaries_are_released_in_order() {
        let mut b = TreeBuilder::new("res://a.gd");
        let a1 = b.ident("a");
        let one = b.int(1);
        let sum = b.binary(BinaryOp::Add, a1, one);
        let a2 = b.ident("a");
        let two = b.int(2);
        let difference = b.binary(BinaryOp::Subtract, a2, two);
        let product = b.binary(BinaryOp::Multiply, sum, difference);
        let ret = b.return_stmt(Some(product));
        let params = vec![b.param("a", None, None)];
        b.function(HEAD, "f", params, None, vec![ret]);

        let script = compile(b);
        let f = script.main.function("f").unwrap();
        assert_eq!(f.temp_count, 3);
        assert_eq!(
            f.code[2],
            Instruction::Binary {
                op: BinaryOp::Multiply,
                dst: Address::Temporary(0),
                left: Address::Temporary(1),
                right: Address::Temporary(2),
            }
        );
        assert_eq!(f.code[3], Instruction::Return { value: Address::Temporary(0) });
    }

    #[test]
    fn getter_is_called_outside_its_accessor() {
        let mut b = TreeBuilder::new("res://a.gd");
        let one = b.int(1);
        b.variable(HEAD, "hp", None, Some(one));
        let inner = b.ident("hp");
        let getter_body = vec![b.return_stmt(Some(inner))];
        b.inline_getter(HEAD, "hp", getter_body);
        let outer = b.ident("hp");
        let body = vec![b.return_stmt(Some(outer))];
        b.function(HEAD, "read", Vec::new(), None, body);

        let script = compile(b);
        let getter = script.main.function("@hp_getter").unwrap();
        assert!(matches!(getter.code[0], Instruction::Return { value: Address::Member(_) }));

        let read = script.main.function("read").unwrap();
        assert!(matches!(
            &read.code[0],
            Instruction::Call { base: Address::SelfRef, args, .. } if args.is_empty()
        ));
    }

    #[test]
    fn setter_is_called_on_assignment() {
        let mut b = TreeBuilder::new("res://a.gd");
        b.variable(HEAD, "hp", None, None);
        let field = b.ident("hp");
        let value = b.ident("value");
        let store = b.assign(field, value);
        let setter_body = vec![b.expr_stmt(store)];
        b.inline_setter(HEAD, "hp", "value", setter_body);

        let target = b.ident("hp");
        let three = b.int(3);
        let assign = b.assign(target, three);
        let body = vec![b.expr_stmt(assign)];
        b.function(HEAD, "hurt", Vec::new(), None, body);

        let script = compile(b);
        let setter = script.main.function("@hp_setter").unwrap();
        assert!(matches!(
            setter.code[0],
            Instruction::Assign { dst: Address::Member(_), src: Address::Parameter(0) }
        ));
        let hurt = script.main.function("hurt").unwrap();
        assert!(matches!(
            &hurt.code[0],
            Instruction::Call { dst: Address::Nil, base: Address::SelfRef, args, .. } if args.len() == 1
        ));
    }

    #[test]
    fn typed_store_converts() {
        let mut b = TreeBuilder::new("res://a.gd");
        let x = b.ident("x");
        let float = b.type_ref(&["float"]);
        let body = vec![b.var_stmt("ratio", Some(float), Some(x))];
        let params = vec![b.param("x", None, None)];
        b.function(HEAD, "f", params, None, body);

        let script = compile(b);
        let f = script.main.function("f").unwrap();
        assert_eq!(f.code[0], Instruction::Convert {
            dst: Address::Local(0),
            src: Address::Parameter(0),
            to: VariantType::Float,
        });
        assert_eq!(f.local_count, 1);
    }

    #[test]
    fn chained_subscript_assignment_writes_back() {
        let mut b = TreeBuilder::new("res://a.gd");
        let a = b.ident("a");
        let zero = b.int(0);
        let element = b.index(a, zero);
        let x = b.attribute(element, "x");
        let value = b.float(1.0);
        let assign = b.assign(x, value);
        let body = vec![b.expr_stmt(assign)];
        let params = vec![b.param("a", None, None)];
        b.function(HEAD, "f", params, None, body);

        let script = compile(b);
        let f = script.main.function("f").unwrap();
        assert_eq!(
            opcodes(f),
            vec![OpCode::GetIndexed, OpCode::SetNamed, OpCode::SetIndexed, OpCode::End]
        );
        assert!(matches!(
            f.code[2],
            Instruction::SetIndexed {
                base: Address::Parameter(0),
                value: Address::Temporary(0),
                ..
            }
        ));
    }

    #[test]
    fn match_tries_each_branch() {
        let mut b = TreeBuilder::new("res://a.gd");
        let subject = b.ident("x");
        let one = b.literal_pattern(gdscript_core::Variant::Int(1));
        let ret_one = b.int(1);
        let first_body = vec![b.return_stmt(Some(ret_one))];
        let first = b.branch(vec![one], None, first_body);
        let bind = b.bind_pattern("y");
        let y = b.ident("y");
        let second_body = vec![b.return_stmt(Some(y))];
        let second = b.branch(vec![bind], None, second_body);
        let wildcard = b.wildcard_pattern();
        let third_body = vec![b.pass()];
        let third = b.branch(vec![wildcard], None, third_body);
        let body = vec![b.match_stmt(subject, vec![first, second, third])];
        let params = vec![b.param("x", None, None)];
        b.function(HEAD, "f", params, None, body);

        let script = compile(b);
        let f = script.main.function("f").unwrap();
        let ops = opcodes(f);
        assert_eq!(ops.iter().filter(|op| **op == OpCode::JumpIf).count(), 3);
        assert!(ops.contains(&OpCode::TypeTest));
        assert!(jumps_are_patched(f));
        assert_eq!(f.temp_count, 1);
    }

    #[test]
    fn loops_patch_every_jump() {
        let mut b = TreeBuilder::new("res://a.gd");
        let yes = b.bool(true);
        let while_body = vec![b.break_stmt()];
        let while_loop = b.while_stmt(yes, while_body);
        let items = b.ident("items");
        let for_body = vec![b.continue_stmt()];
        let for_loop = b.for_stmt("item", items, for_body);
        let params = vec![b.param("items", None, None)];
        b.function(HEAD, "f", params, None, vec![while_loop, for_loop]);

        let script = compile(b);
        let f = script.main.function("f").unwrap();
        assert!(jumps_are_patched(f));
        let ops = opcodes(f);
        assert!(ops.contains(&OpCode::IterBegin));
        assert!(ops.contains(&OpCode::IterNext));
        assert_eq!(f.local_count, 3);
    }

    #[test]
    fn static_variables_get_a_static_initializer() {
        let mut b = TreeBuilder::new("res://a.gd");
        let one = b.int(1);
        b.variable(HEAD, "count", None, Some(one)).is_static = true;

        let script = compile(b);
        let init = script.main.function(STATIC_INIT).unwrap();
        assert_eq!(init.globals, vec![GlobalRef::Static {
            class: "res://a.gd".into(),
            index: 0,
        }]);
        assert!(matches!(init.code[0], Instruction::Assign { dst: Address::Global(0), .. }));
        assert_eq!(script.main.statics, vec!["count".to_string()]);
    }

    #[test]
    fn first_error_is_kept() {
        // never analyzed, so every expression fails to lower
        let mut b = TreeBuilder::new("res://a.gd");
        b.at(3, 5);
        let first = b.int(1);
        let body = vec![b.return_stmt(Some(first))];
        b.function(HEAD, "f", Vec::new(), None, body);
        b.at(7, 5);
        let second = b.int(2);
        let body = vec![b.return_stmt(Some(second))];
        b.function(HEAD, "g", Vec::new(), None, body);
        let trees = vec![b.finish()];

        let options = CompilerOptions::default();
        let err = CodeGenerator::new(&trees, UnitId::new(0), &options)
            .generate()
            .unwrap_err();
        assert!(matches!(err, CompilationError::Internal { .. }));
        assert_eq!(err.span().line, 3);
    }
}
