//! Function bodies, statements and `match` patterns.
//!
//! A suite records whether every path through it returns and the type its
//! control-flow statements produce; unannotated functions take their return
//! type from the body suite.

use gdscript_ast::{
    Binding, ExprId, ExprKind, FunctionId, MatchBranch, PatternId, PatternKind, ResolutionState,
    StmtId, StmtKind, SuiteId,
};
use gdscript_core::{CompilationError, DataType, TypeSource, VariantType, WarningCode};

use super::members::soften;
use super::{Analyzer, ResolveContext, Verdict};

/// How control leaves a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continues,
    /// Every path returns.
    Returns,
    /// `break` or `continue`.
    Jumps,
}

impl Analyzer<'_, '_> {
    /// Resolve a function body once. Re-entering a body that is being
    /// resolved is a no-op.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn resolve_function_body(&mut self, function: FunctionId) {
        if self.tree()[function].body_state != ResolutionState::Unresolved {
            return;
        }
        self.tree_mut()[function].body_state = ResolutionState::Resolving;
        self.resolve_function_signature(function);

        let node = &self.tree()[function];
        let (class, body, is_static, span) = (node.class, node.body, node.is_static, node.span);
        tracing::trace!(function = %node.name, "resolve body");

        let ctx = ResolveContext {
            function: Some(function),
            ..self.class_context(class, is_static)
        };
        self.with_context(ctx, |a| a.resolve_suite(body));

        let suite = &self.tree()[body];
        let (suite_type, has_return) = (suite.datatype.clone(), suite.has_return);
        let node = &self.tree()[function];
        let declared = node.datatype.clone();
        let is_init = node.name == "_init";

        if !declared.is_set() {
            let inferred = if suite_type.is_set() && !suite_type.is_variant() {
                soften(suite_type)
            } else {
                DataType::variant()
            };
            self.tree_mut()[function].datatype = inferred;
        } else if declared.is_hard_type() && !declared.is_void() && !is_init && !has_return {
            self.error(&CompilationError::NotAllPathsReturn { span });
        }
        self.tree_mut()[function].body_state = ResolutionState::Resolved;
    }

    /// Resolve every statement of a suite. Suites are resolved once, so the
    /// recorded type does not depend on how often they are visited.
    pub(crate) fn resolve_suite(&mut self, suite: SuiteId) {
        if self.tree()[suite].resolved {
            return;
        }
        self.tree_mut()[suite].resolved = true;

        let stmts = self.tree()[suite].stmts.clone();
        let mut datatype = DataType::unresolved();
        let mut flow = Flow::Continues;
        let mut terminator = "return";
        let mut warned_unreachable = false;

        for stmt in stmts {
            if flow != Flow::Continues && !warned_unreachable {
                warned_unreachable = true;
                let name = self.current_function_name();
                self.warn(
                    WarningCode::UnreachableCode,
                    format!(
                        "Unreachable code (statement after {terminator}) in function \"{name}()\"."
                    ),
                    self.tree()[stmt].span,
                );
            }

            let stmt_flow = self.resolve_statement(stmt);
            if flow == Flow::Continues {
                flow = stmt_flow;
                if flow == Flow::Jumps {
                    terminator = match self.tree()[stmt].kind {
                        StmtKind::Break => "break",
                        _ => "continue",
                    };
                }
            }
            let node = &self.tree()[stmt];
            if node.is_control_flow() {
                let stmt_type = node.datatype.clone();
                datatype = self.decide_suite_type(datatype, stmt_type);
            }
        }

        let node = &mut self.tree_mut()[suite];
        node.datatype = datatype;
        node.has_return = flow == Flow::Returns;
    }

    /// Merge the type of one more control-flow statement into a suite type.
    fn decide_suite_type(&self, current: DataType, new: DataType) -> DataType {
        if !new.is_set() {
            return current;
        }
        if !current.is_set() {
            return new.with_source(TypeSource::Inferred).with_constant(false);
        }
        if self.compatible(&current, &new, false) {
            return new.with_source(TypeSource::Inferred).with_constant(false);
        }
        DataType::variant()
    }

    fn current_function_name(&self) -> String {
        self.ctx
            .function
            .map(|f| self.tree()[f].name.clone())
            .unwrap_or_default()
    }

    /// Reduce an expression, recording a failure instead of returning it.
    fn reduce_checked(&mut self, expr: ExprId) -> DataType {
        match self.reduce_value(expr) {
            Ok(ty) => ty,
            Err(err) => {
                self.error(&err);
                DataType::variant()
            }
        }
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn resolve_statement(&mut self, stmt: StmtId) -> Flow {
        let kind = self.tree()[stmt].kind.clone();
        let span = self.tree()[stmt].span;

        let (flow, datatype) = match kind {
            StmtKind::Expression(expr) => {
                self.reduce_expression(expr);
                let standalone = !matches!(
                    self.tree()[expr].kind,
                    ExprKind::Call { .. } | ExprKind::Assignment { .. } | ExprKind::Await(_)
                );
                if standalone {
                    self.warn(
                        WarningCode::StandaloneExpression,
                        "Standalone expression (the line has no effect).",
                        span,
                    );
                }
                (Flow::Continues, None)
            }
            StmtKind::Variable {
                name,
                type_ref,
                initializer,
                infer,
                ..
            } => {
                let declared = self.declared_type(&name, type_ref, initializer, infer, span);
                if let StmtKind::Variable { datatype, .. } = &mut self.tree_mut()[stmt].kind {
                    *datatype = declared;
                }
                (Flow::Continues, None)
            }
            StmtKind::Constant {
                name,
                type_ref,
                initializer,
                ..
            } => {
                let (declared, _) = self.constant_declaration(&name, type_ref, Some(initializer), span);
                if let StmtKind::Constant { datatype, .. } = &mut self.tree_mut()[stmt].kind {
                    *datatype = declared;
                }
                (Flow::Continues, None)
            }
            StmtKind::If {
                condition,
                true_suite,
                false_suite,
            } => {
                self.reduce_checked(condition);
                self.resolve_suite(true_suite);
                let true_type = self.tree()[true_suite].datatype.clone();
                let mut returns = false;
                let mut datatype = true_type;
                if let Some(false_suite) = false_suite {
                    self.resolve_suite(false_suite);
                    let false_node = &self.tree()[false_suite];
                    let false_type = false_node.datatype.clone();
                    returns = self.tree()[true_suite].has_return && false_node.has_return;
                    datatype = self.decide_suite_type(datatype, false_type);
                }
                let flow = if returns { Flow::Returns } else { Flow::Continues };
                (flow, Some(datatype))
            }
            StmtKind::While { condition, body } => {
                self.reduce_checked(condition);
                self.in_loop(|a| a.resolve_suite(body));
                (Flow::Continues, Some(self.tree()[body].datatype.clone()))
            }
            StmtKind::For {
                type_ref,
                iterable,
                body,
                ..
            } => {
                let iterable_type = self.reduce_checked(iterable);
                let iterator = match type_ref {
                    Some(t) => self.resolve_type_ref(t, false),
                    None => {
                        let is_range = matches!(
                            &self.tree()[iterable].binding,
                            Binding::Utility(name) if name == "range"
                        );
                        iterator_type(&iterable_type, is_range)
                    }
                };
                if let StmtKind::For { iterator_type, .. } = &mut self.tree_mut()[stmt].kind {
                    *iterator_type = iterator;
                }
                self.in_loop(|a| a.resolve_suite(body));
                (Flow::Continues, Some(self.tree()[body].datatype.clone()))
            }
            StmtKind::Match { subject, branches } => {
                let subject_type = self.reduce_checked(subject);
                let (returns, datatype) = self.resolve_match(&subject_type, &branches);
                let flow = if returns { Flow::Returns } else { Flow::Continues };
                (flow, Some(datatype))
            }
            StmtKind::Return(value) => (Flow::Returns, Some(self.resolve_return(value, span))),
            StmtKind::Break | StmtKind::Continue => {
                if self.ctx.loop_depth == 0 {
                    let err = if matches!(kind, StmtKind::Break) {
                        CompilationError::BreakOutsideLoop { span }
                    } else {
                        CompilationError::ContinueOutsideLoop { span }
                    };
                    self.error(&err);
                }
                (Flow::Jumps, None)
            }
            StmtKind::Assert { condition, message } => {
                self.reduce_checked(condition);
                if let Some(message) = message {
                    self.reduce_checked(message);
                }
                if self.value_of(condition).is_some_and(|v| !v.booleanize()) {
                    self.warn(
                        WarningCode::AssertAlwaysFalse,
                        "Assert statement will raise an error because the expression is always false.",
                        span,
                    );
                }
                (Flow::Continues, None)
            }
            StmtKind::Pass | StmtKind::Breakpoint => (Flow::Continues, None),
        };

        if let Some(datatype) = datatype {
            self.tree_mut()[stmt].datatype = datatype;
        }
        flow
    }

    fn in_loop<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.ctx.loop_depth += 1;
        let result = f(self);
        self.ctx.loop_depth -= 1;
        result
    }

    /// Check a `return` against the function's declared return type and
    /// give the type it contributes to the suite.
    fn resolve_return(&mut self, value: Option<ExprId>, span: gdscript_core::Span) -> DataType {
        let Some(function) = self.ctx.function else {
            return DataType::void();
        };
        let node = &self.tree()[function];
        let (declared, is_init) = (node.datatype.clone(), node.name == "_init");

        let Some(value) = value else {
            if declared.is_hard_type() && !declared.is_void() {
                self.error(&CompilationError::other(
                    format!("Not returning a value from a function with return type \"{declared}\"."),
                    span,
                ));
            }
            return DataType::void();
        };

        let value_type = self.reduce_checked(value);
        if is_init {
            self.error(&CompilationError::other("Constructor cannot return a value.", span));
        } else if declared.is_void() {
            self.error(&CompilationError::other("A void function cannot return a value.", span));
        } else if declared.is_hard_type() {
            match self.verdict(&declared, &value_type) {
                Verdict::Compatible => {}
                Verdict::Narrowing => self.warn(
                    WarningCode::NarrowingConversion,
                    format!("Narrowing conversion (\"{value_type}\" is converted to \"{declared}\" and will lose precision)."),
                    span,
                ),
                Verdict::Unsafe => self.mark_unsafe(span),
                Verdict::Incompatible => self.error(&CompilationError::TypeMismatch {
                    message: format!(
                        "Cannot return value of type \"{value_type}\" because the function return type is \"{declared}\"."
                    ),
                    span,
                }),
            }
        }
        value_type
    }

    // ==========================================================================
    // Match
    // ==========================================================================

    /// Returns whether every path returns, and the merged branch type.
    fn resolve_match(&mut self, subject_type: &DataType, branches: &[MatchBranch]) -> (bool, DataType) {
        let mut all_return = !branches.is_empty();
        let mut has_catch_all = false;
        let mut datatype = DataType::unresolved();

        for branch in branches {
            for &pattern in &branch.patterns {
                self.resolve_pattern(pattern, subject_type);
            }
            if let Some(guard) = branch.guard {
                self.reduce_checked(guard);
            }
            self.resolve_suite(branch.body);

            let catches_all = branch.guard.is_none()
                && branch.patterns.iter().any(|&p| {
                    matches!(self.tree()[p].kind, PatternKind::Wildcard | PatternKind::Bind(_))
                });
            has_catch_all |= catches_all;

            let body = &self.tree()[branch.body];
            all_return &= body.has_return;
            let body_type = body.datatype.clone();
            datatype = self.decide_suite_type(datatype, body_type);
        }
        (all_return && has_catch_all, datatype)
    }

    fn resolve_pattern(&mut self, pattern: PatternId, subject_type: &DataType) {
        let kind = self.tree()[pattern].kind.clone();
        let datatype = match kind {
            PatternKind::Literal(expr) | PatternKind::Expression(expr) => {
                self.constant_pattern_expr(expr, "Expression in match pattern must be a constant expression.")
            }
            PatternKind::Bind(_) | PatternKind::Wildcard => {
                if subject_type.is_set() && !subject_type.is_variant() {
                    soften(subject_type.clone())
                } else {
                    DataType::variant()
                }
            }
            PatternKind::Array { elements, .. } => {
                for element in elements {
                    self.resolve_pattern(element, &DataType::variant());
                }
                DataType::builtin(VariantType::Array)
            }
            PatternKind::Dictionary { entries, .. } => {
                for (key, value) in entries {
                    self.constant_pattern_expr(key, "Expression in dictionary pattern key must be a constant expression.");
                    if let Some(value) = value {
                        self.resolve_pattern(value, &DataType::variant());
                    }
                }
                DataType::builtin(VariantType::Dictionary)
            }
        };
        self.tree_mut()[pattern].datatype = datatype;
    }

    fn constant_pattern_expr(&mut self, expr: ExprId, message: &str) -> DataType {
        let errors_before = self.error_count();
        let datatype = self.reduce_checked(expr);
        if self.value_of(expr).is_none() && self.error_count() == errors_before {
            self.error(&CompilationError::ExpectedConstant {
                message: message.to_string(),
                span: self.tree()[expr].span,
            });
        }
        datatype
    }
}

/// Type of the loop variable when iterating over a value of `iterable`.
fn iterator_type(iterable: &DataType, is_range: bool) -> DataType {
    if is_range {
        return DataType::builtin(VariantType::Int).with_source(TypeSource::Inferred);
    }
    if iterable.is_meta_type {
        return DataType::variant();
    }
    let element = match iterable.builtin_type() {
        Some(VariantType::Int | VariantType::Float) => VariantType::Int,
        Some(VariantType::String | VariantType::StringName) => VariantType::String,
        Some(
            VariantType::Vector2 | VariantType::Vector2i | VariantType::Vector3 | VariantType::Vector3i,
        ) => VariantType::Int,
        Some(ty) if ty.is_packed_array() => match ty.packed_element() {
            Some(element) => element,
            None => return DataType::variant(),
        },
        _ => return DataType::variant(),
    };
    DataType::builtin(element).with_source(TypeSource::Inferred)
}

#[cfg(test)]
mod tests {
    use gdscript_ast::{MemoryLoader, ParseTree, TreeBuilder};
    use gdscript_core::{BinaryOp, ClassId, Diagnostics, TypeKind, Variant, VariantType, WarningCode};
    use gdscript_registry::HostRegistry;

    use super::iterator_type;
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
    fn missing_return_on_a_path() {
        let mut b = TreeBuilder::new("res://ret.gd");
        let int = b.type_ref(&["int"]);
        let pass = b.pass();
        b.function(ClassId::HEAD, "f", vec![], Some(int), vec![pass]);
        let (_, diagnostics) = analyze(b.finish());
        assert_eq!(diagnostics.errors()[0].message, "Not all code paths return a value.");
    }

    #[test]
    fn if_returns_only_when_both_branches_return() {
        let mut b = TreeBuilder::new("res://branches.gd");
        let int = b.type_ref(&["int"]);
        let one = b.int(1);
        let two = b.int(2);
        let r1 = b.return_stmt(Some(one));
        let r2 = b.return_stmt(Some(two));
        let cond = b.bool(true);
        let both = b.if_stmt(cond, vec![r1], Some(vec![r2]));
        b.function(ClassId::HEAD, "both", vec![], Some(int), vec![both]);

        let int = b.type_ref(&["int"]);
        let three = b.int(3);
        let r3 = b.return_stmt(Some(three));
        let cond = b.bool(false);
        let one_sided = b.if_stmt(cond, vec![r3], None);
        b.function(ClassId::HEAD, "one_sided", vec![], Some(int), vec![one_sided]);

        let (_, diagnostics) = analyze(b.finish());
        assert_eq!(diagnostics.error_count(), 1, "{diagnostics}");
    }

    #[test]
    fn unannotated_return_type_is_inferred_from_the_body() {
        let mut b = TreeBuilder::new("res://infer.gd");
        let s = b.string("x");
        let r = b.return_stmt(Some(s));
        let f = b.function(ClassId::HEAD, "name", vec![], None, vec![r]);
        let call = b.call("name", vec![]);
        let len = b.method_call(call, "length", vec![]);
        let stmt = b.expr_stmt(len);
        b.function(ClassId::HEAD, "user", vec![], None, vec![stmt]);
        let (trees, diagnostics) = analyze(b.finish());
        assert!(!diagnostics.has_errors(), "{diagnostics}");
        assert!(trees[0][f].datatype.is_builtin(VariantType::String));
        assert!(!trees[0][f].datatype.is_hard_type());
        assert!(trees[0][call].datatype.is_builtin(VariantType::String));
    }

    #[test]
    fn mixed_return_types_infer_variant() {
        let mut b = TreeBuilder::new("res://mixed.gd");
        let s = b.string("x");
        let i = b.int(1);
        let r1 = b.return_stmt(Some(s));
        let r2 = b.return_stmt(Some(i));
        let cond = b.bool(true);
        let branch = b.if_stmt(cond, vec![r1], None);
        let f = b.function(ClassId::HEAD, "f", vec![], None, vec![branch, r2]);
        let (trees, _) = analyze(b.finish());
        assert!(matches!(trees[0][f].datatype.kind, TypeKind::Variant));
    }

    #[test]
    fn unreachable_code_warns_once() {
        let mut b = TreeBuilder::new("res://dead.gd");
        let r = b.return_stmt(None);
        let p1 = b.pass();
        let p2 = b.pass();
        b.function(ClassId::HEAD, "f", vec![], None, vec![r, p1, p2]);
        let (_, diagnostics) = analyze(b.finish());
        let unreachable = diagnostics
            .warnings()
            .iter()
            .filter(|w| w.code == Some(WarningCode::UnreachableCode))
            .count();
        assert_eq!(unreachable, 1);
    }

    #[test]
    fn unreachable_code_names_the_terminator() {
        let mut b = TreeBuilder::new("res://dead_loop.gd");
        let brk = b.break_stmt();
        let after_break = b.pass();
        let cond = b.bool(true);
        let first = b.while_stmt(cond, vec![brk, after_break]);
        let cont = b.continue_stmt();
        let after_continue = b.pass();
        let cond = b.bool(true);
        let second = b.while_stmt(cond, vec![cont, after_continue]);
        let ret = b.return_stmt(None);
        let after_return = b.pass();
        b.function(ClassId::HEAD, "f", vec![], None, vec![first, second, ret, after_return]);
        let (_, diagnostics) = analyze(b.finish());
        let messages: Vec<_> = diagnostics
            .warnings()
            .iter()
            .filter(|w| w.code == Some(WarningCode::UnreachableCode))
            .map(|w| w.message.as_str())
            .collect();
        assert_eq!(
            messages,
            [
                "Unreachable code (statement after break) in function \"f()\".",
                "Unreachable code (statement after continue) in function \"f()\".",
                "Unreachable code (statement after return) in function \"f()\".",
            ]
        );
    }

    #[test]
    fn loop_control_outside_loops() {
        let mut b = TreeBuilder::new("res://loops.gd");
        let brk = b.break_stmt();
        let inner_continue = b.continue_stmt();
        let cond = b.bool(true);
        let looped = b.while_stmt(cond, vec![inner_continue]);
        b.function(ClassId::HEAD, "f", vec![], None, vec![looped, brk]);
        let (_, diagnostics) = analyze(b.finish());
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.errors()[0].message, "Cannot use \"break\" outside of a loop.");
    }

    #[test]
    fn for_iterator_types() {
        let mut b = TreeBuilder::new("res://for.gd");
        let ten = b.int(10);
        let range = b.call("range", vec![ten]);
        let use_i = b.ident("i");
        let neg = b.unary(gdscript_core::UnaryOp::Negate, use_i);
        let body = b.expr_stmt(neg);
        let over_range = b.for_stmt("i", range, vec![body]);
        let word = b.string("abc");
        let over_string = b.for_stmt("c", word, vec![]);
        b.function(ClassId::HEAD, "f", vec![], None, vec![over_range, over_string]);
        let (trees, _) = analyze(b.finish());
        assert!(trees[0][neg].datatype.is_builtin(VariantType::Int));
        let packed = gdscript_core::DataType::builtin(VariantType::PackedVector2Array);
        assert!(iterator_type(&packed, false).is_builtin(VariantType::Vector2));
    }

    #[test]
    fn match_with_catch_all_returns() {
        let mut b = TreeBuilder::new("res://match.gd");
        let int = b.type_ref(&["int"]);
        let subject = b.int(3);
        let lit = b.literal_pattern(Variant::Int(1));
        let one = b.int(1);
        let r1 = b.return_stmt(Some(one));
        let first = b.branch(vec![lit], None, vec![r1]);
        let wild = b.wildcard_pattern();
        let zero = b.int(0);
        let r2 = b.return_stmt(Some(zero));
        let rest = b.branch(vec![wild], None, vec![r2]);
        let m = b.match_stmt(subject, vec![first, rest]);
        b.function(ClassId::HEAD, "f", vec![], Some(int), vec![m]);
        let (_, diagnostics) = analyze(b.finish());
        assert!(!diagnostics.has_errors(), "{diagnostics}");
    }

    #[test]
    fn match_patterns_must_be_constant() {
        let mut b = TreeBuilder::new("res://pattern.gd");
        b.variable(ClassId::HEAD, "v", None, None);
        let subject = b.int(3);
        let v = b.ident("v");
        let pattern = b.expr_pattern(v);
        let branch = b.branch(vec![pattern], None, vec![]);
        let m = b.match_stmt(subject, vec![branch]);
        b.function(ClassId::HEAD, "f", vec![], None, vec![m]);
        let (_, diagnostics) = analyze(b.finish());
        assert_eq!(
            diagnostics.errors()[0].message,
            "Expression in match pattern must be a constant expression."
        );
    }

    #[test]
    fn soft_local_follows_assignments() {
        let mut b = TreeBuilder::new("res://narrow.gd");
        let one = b.int(1);
        let x = b.var_stmt("x", None, Some(one));
        let xr = b.ident("x");
        let half = b.float(1.5);
        let set = b.assign(xr, half);
        let set_stmt = b.expr_stmt(set);
        let int = b.type_ref(&["int"]);
        let xv = b.ident("x");
        let y = b.var_stmt("y", Some(int), Some(xv));
        b.function(ClassId::HEAD, "f", vec![], None, vec![x, set_stmt, y]);
        let (_, diagnostics) = analyze(b.finish());
        assert!(!diagnostics.has_errors(), "{diagnostics}");
        assert!(diagnostics.has_warning(WarningCode::NarrowingConversion));
    }

    #[test]
    fn standalone_and_always_false_assert() {
        let mut b = TreeBuilder::new("res://warn.gd");
        let one = b.int(1);
        let two = b.int(2);
        let sum = b.binary(BinaryOp::Add, one, two);
        let standalone = b.expr_stmt(sum);
        let f = b.bool(false);
        let assert = b.assert_stmt(f, None);
        b.function(ClassId::HEAD, "f", vec![], None, vec![standalone, assert]);
        let (_, diagnostics) = analyze(b.finish());
        assert!(diagnostics.has_warning(WarningCode::StandaloneExpression));
        assert!(diagnostics.has_warning(WarningCode::AssertAlwaysFalse));
    }

    #[test]
    fn too_few_arguments_counts_required_parameters() {
        let mut b = TreeBuilder::new("res://args.gd");
        let params = vec![
            b.param("a", None, None),
            b.param("b", None, None),
            b.param("c", None, None),
        ];
        let default = b.int(0);
        let mut params = params;
        params.push(b.param("d", None, Some(default)));
        b.function(ClassId::HEAD, "f", params, None, vec![]);
        let one = b.int(1);
        let two = b.int(2);
        let call = b.call("f", vec![one, two]);
        let stmt = b.expr_stmt(call);
        b.function(ClassId::HEAD, "g", vec![], None, vec![stmt]);
        let (_, diagnostics) = analyze(b.finish());
        assert_eq!(
            diagnostics.errors()[0].message,
            "Too few arguments for \"f()\" call. Expected at least 3 but received 2."
        );
    }

    #[test]
    fn suite_types_do_not_depend_on_resolution_order() {
        let build = || {
            let mut b = TreeBuilder::new("res://order.gd");
            let call = b.call("second", vec![]);
            let r = b.return_stmt(Some(call));
            let first = b.function(ClassId::HEAD, "first", vec![], None, vec![r]);
            let v = b.float(2.5);
            let r = b.return_stmt(Some(v));
            let second = b.function(ClassId::HEAD, "second", vec![], None, vec![r]);
            (b.finish(), first, second)
        };
        let (tree, first, second) = build();
        let (trees, _) = analyze(tree);
        let (tree2, first2, second2) = build();
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);
        let unit = session.add_main(tree2);
        let mut analyzer = Analyzer::new(&mut session, unit);
        analyzer.resolve_inheritance(ClassId::HEAD, true);
        analyzer.resolve_interface(ClassId::HEAD);
        analyzer.resolve_function_body(second2);
        analyzer.resolve_function_body(first2);
        let (reversed, _) = session.into_parts();
        assert_eq!(trees[0][first].datatype, reversed[0][first2].datatype);
        assert_eq!(trees[0][second].datatype, reversed[0][second2].datatype);
        assert!(reversed[0][first2].datatype.is_builtin(VariantType::Float));
    }
}
