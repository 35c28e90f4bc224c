//! Class interfaces: member types, constant values, enums and signatures.
//!
//! Members resolve lazily. A member used before its declaration is resolved
//! at the use site; reaching a member that is already being resolved is a
//! cyclic reference.

use gdscript_ast::{FunctionId, Member, ResolutionState};
use gdscript_core::{
    ClassId, CompilationError, DataType, EnumType, Span, TypeKind, TypeSource, UnitId, Variant,
    VariantType, WarningCode,
};

use super::{Analyzer, CurrentEnum, ResolveContext, Verdict};

impl Analyzer<'_, '_> {
    /// Resolve every member of a class and of its nested classes.
    pub fn resolve_interface(&mut self, class: ClassId) {
        if self.tree()[class].interface_resolved {
            return;
        }
        self.tree_mut()[class].interface_resolved = true;
        self.assign_field_indices(class);

        let count = self.tree()[class].members.len();
        for index in 0..count {
            self.resolve_member(class, index);
        }

        let nested: Vec<ClassId> = self.tree()[class]
            .members
            .iter()
            .filter_map(|m| match m {
                Member::Class(c) => Some(*c),
                _ => None,
            })
            .collect();
        for nested in nested {
            self.resolve_interface(nested);
        }
    }

    /// Instance variables continue after the fields of the base classes;
    /// static variables are numbered per class.
    fn assign_field_indices(&mut self, class: ClassId) {
        let mut next_field = self.inherited_field_count(class);
        let mut next_static = 0;
        for member in &mut self.tree_mut()[class].members {
            if let Member::Variable(v) = member {
                if v.is_static {
                    v.index = next_static;
                    next_static += 1;
                } else {
                    v.index = next_field;
                    next_field += 1;
                }
            }
        }
    }

    fn inherited_field_count(&self, class: ClassId) -> u32 {
        match &self.tree()[class].base_type.kind {
            TypeKind::Class(base) => self
                .class_chain_of(base)
                .iter()
                .map(|c| self.session.tree(c.unit).own_field_count(c.class))
                .sum(),
            _ => 0,
        }
    }

    /// Resolve a member of a class in another (or the same) unit.
    pub(crate) fn resolve_member_in(&mut self, unit: UnitId, class: ClassId, index: usize) -> DataType {
        if unit == self.unit() {
            self.resolve_member(class, index)
        } else {
            self.in_unit(unit, |a| a.resolve_member(class, index))
        }
    }

    /// Resolve one member and return its type.
    pub(crate) fn resolve_member(&mut self, class: ClassId, index: usize) -> DataType {
        let member = self.tree()[class].members[index].clone();
        match member {
            Member::Variable(_) => self.resolve_member_variable(class, index),
            Member::Constant(_) => self.resolve_member_constant(class, index),
            Member::Signal(_) => self.resolve_signal(class, index),
            Member::Enum(_) => self.resolve_named_enum(class, index),
            Member::EnumValue(_) => self.resolve_enum_value(class, index),
            Member::Function(f) => {
                self.resolve_function_signature(f);
                DataType::builtin(VariantType::Callable)
            }
            Member::Class(nested) => {
                self.resolve_inheritance(nested, false);
                let unit = self.unit();
                self.class_type(unit, nested).into_meta().with_constant(true)
            }
        }
    }

    /// Common state handling: returns the cached type when resolved, reports
    /// a cycle when resolving, and marks the member as resolving otherwise.
    fn begin_member(&mut self, class: ClassId, index: usize) -> Option<DataType> {
        let (state, datatype, name, span) = match &self.tree()[class].members[index] {
            Member::Variable(v) => (v.state, v.datatype.clone(), v.name.clone(), v.span),
            Member::Constant(c) => (c.state, c.datatype.clone(), c.name.clone(), c.span),
            Member::Signal(s) => (s.state, s.datatype.clone(), s.name.clone(), s.span),
            Member::Enum(e) => (e.state, e.datatype.clone(), e.name.clone(), e.span),
            Member::EnumValue(v) => (v.state, v.datatype.clone(), v.name.clone(), v.span),
            Member::Function(_) | Member::Class(_) => return None,
        };
        match state {
            ResolutionState::Resolved => Some(datatype),
            ResolutionState::Resolving => {
                self.error(&CompilationError::CyclicReference { name, span });
                Some(DataType::variant())
            }
            ResolutionState::Unresolved => {
                self.set_member_state(class, index, ResolutionState::Resolving);
                None
            }
        }
    }

    fn set_member_state(&mut self, class: ClassId, index: usize, state: ResolutionState) {
        match &mut self.tree_mut()[class].members[index] {
            Member::Variable(v) => v.state = state,
            Member::Constant(c) => c.state = state,
            Member::Signal(s) => s.state = state,
            Member::Enum(e) => e.state = state,
            Member::EnumValue(v) => v.state = state,
            Member::Function(_) | Member::Class(_) => {}
        }
    }

    // ==========================================================================
    // Variables and constants
    // ==========================================================================

    fn resolve_member_variable(&mut self, class: ClassId, index: usize) -> DataType {
        if let Some(done) = self.begin_member(class, index) {
            return done;
        }
        let Member::Variable(var) = self.tree()[class].members[index].clone() else {
            return DataType::variant();
        };

        let ctx = self.class_context(class, var.is_static);
        let datatype = self.with_context(ctx, |a| {
            a.declared_type(
                &var.name,
                var.type_ref,
                var.initializer,
                var.infer,
                var.span,
            )
        });

        if let Member::Variable(v) = &mut self.tree_mut()[class].members[index] {
            v.datatype = datatype.clone();
            v.state = ResolutionState::Resolved;
        }
        datatype
    }

    /// Type of a declaration with an optional annotation and initializer.
    ///
    /// Shared by member variables, local variables and parameters: `:=`
    /// takes the initializer's type, an annotation is checked against the
    /// initializer, and an unannotated declaration gets a soft type.
    pub(crate) fn declared_type(
        &mut self,
        name: &str,
        type_ref: Option<gdscript_ast::TypeRefId>,
        initializer: Option<gdscript_ast::ExprId>,
        infer: bool,
        span: Span,
    ) -> DataType {
        let annotated = type_ref.map(|t| self.resolve_type_ref(t, false));
        let init_type = initializer.map(|e| self.reduce_expression(e));

        if let (Some(init), Some(value_type)) = (initializer, &init_type) {
            if self.is_void_value(init) {
                self.error(&CompilationError::VoidValue {
                    name: self.callee_name(init),
                    span,
                });
                return annotated.unwrap_or_else(DataType::variant);
            }
            if infer {
                if !value_type.is_set() || value_type.is_variant() || value_type.is_meta_type && !value_type.is_constant {
                    self.error(&CompilationError::InferenceFailed {
                        name: name.to_string(),
                        span,
                    });
                    return DataType::variant();
                }
                if value_type.is_builtin(VariantType::Nil) {
                    self.error(&CompilationError::InferenceFailed {
                        name: name.to_string(),
                        span,
                    });
                    return DataType::variant();
                }
                return value_type
                    .clone()
                    .with_constant(false)
                    .with_source(TypeSource::AnnotatedInferred);
            }
            if let Some(target) = &annotated {
                self.check_assignable(target, init, "variable", span);
            }
        }

        match (annotated, init_type) {
            (Some(target), _) => target,
            (None, Some(value_type)) if value_type.is_set() && !value_type.is_variant() => {
                soften(value_type)
            }
            _ => DataType::variant(),
        }
    }

    /// Report whether `value` may be stored into the hard type `target`.
    ///
    /// Narrowing conversions warn, supertype values are marked unsafe and
    /// anything else is a type mismatch.
    pub(crate) fn check_assignable(
        &mut self,
        target: &DataType,
        value: gdscript_ast::ExprId,
        what: &str,
        span: Span,
    ) -> Verdict {
        let source = self.tree()[value].datatype.clone();
        let verdict = self.verdict(target, &source);
        match verdict {
            Verdict::Compatible => {}
            Verdict::Narrowing => self.warn(
                WarningCode::NarrowingConversion,
                format!("Narrowing conversion (\"{source}\" is converted to \"{target}\" and will lose precision)."),
                span,
            ),
            Verdict::Unsafe => {
                self.mark_unsafe(span);
                if !source.is_variant() {
                    self.warn(
                        WarningCode::UnsafeCast,
                        format!("The value is cast to \"{target}\" but has an unknown type \"{source}\" at compile time."),
                        span,
                    );
                }
            }
            Verdict::Incompatible => self.error(&CompilationError::TypeMismatch {
                message: format!(
                    "Cannot assign a value of type \"{source}\" as \"{target}\" to a {what}."
                ),
                span,
            }),
        }
        verdict
    }

    fn resolve_member_constant(&mut self, class: ClassId, index: usize) -> DataType {
        if let Some(done) = self.begin_member(class, index) {
            return done;
        }
        let Member::Constant(constant) = self.tree()[class].members[index].clone() else {
            return DataType::variant();
        };

        // instance members are not an access error here, they are just not constant
        let ctx = self.class_context(class, false);
        let (datatype, value) = self.with_context(ctx, |a| {
            a.constant_declaration(&constant.name, constant.type_ref, constant.initializer, constant.span)
        });

        if let Member::Constant(c) = &mut self.tree_mut()[class].members[index] {
            c.datatype = datatype.clone();
            c.value = value;
            c.state = ResolutionState::Resolved;
        }
        datatype
    }

    /// Type and value of a `const` declaration; the initializer must fold.
    pub(crate) fn constant_declaration(
        &mut self,
        name: &str,
        type_ref: Option<gdscript_ast::TypeRefId>,
        initializer: Option<gdscript_ast::ExprId>,
        span: Span,
    ) -> (DataType, Variant) {
        let annotated = type_ref.map(|t| self.resolve_type_ref(t, false));
        let Some(init) = initializer else {
            return (annotated.unwrap_or_else(DataType::variant).with_constant(true), Variant::Nil);
        };
        let errors_before = self.error_count();
        let value_type = self.reduce_expression(init);

        let node = &self.tree()[init];
        let Some(value) = node.constant_value().cloned() else {
            if self.error_count() == errors_before {
                self.error(&CompilationError::ExpectedConstant {
                    message: format!("Assigned value for constant \"{name}\" isn't a constant expression."),
                    span,
                });
            }
            return (DataType::variant().with_constant(true), Variant::Nil);
        };

        let datatype = match annotated {
            Some(target) => {
                self.check_assignable(&target, init, "constant", span);
                target
            }
            None if value_type.is_meta_type => value_type,
            None => value_type.with_source(TypeSource::AnnotatedInferred),
        };
        (datatype.with_constant(true), value)
    }

    fn resolve_signal(&mut self, class: ClassId, index: usize) -> DataType {
        if let Some(done) = self.begin_member(class, index) {
            return done;
        }
        let Member::Signal(signal) = self.tree()[class].members[index].clone() else {
            return DataType::variant();
        };

        let ctx = self.class_context(class, false);
        let params: Vec<DataType> = self.with_context(ctx, |a| {
            signal
                .params
                .iter()
                .map(|p| match p.type_ref {
                    Some(t) => a.resolve_type_ref(t, false),
                    None => DataType::variant(),
                })
                .collect()
        });

        let datatype = DataType::builtin(VariantType::Signal);
        if let Member::Signal(s) = &mut self.tree_mut()[class].members[index] {
            for (param, ty) in s.params.iter_mut().zip(params) {
                param.datatype = ty;
            }
            s.datatype = datatype.clone();
            s.state = ResolutionState::Resolved;
        }
        datatype
    }

    // ==========================================================================
    // Enums
    // ==========================================================================

    fn resolve_named_enum(&mut self, class: ClassId, index: usize) -> DataType {
        if let Some(done) = self.begin_member(class, index) {
            return done;
        }
        let Member::Enum(member) = self.tree()[class].members[index].clone() else {
            return DataType::variant();
        };

        let ctx = ResolveContext {
            current_enum: Some(CurrentEnum::Named { class, member: index }),
            ..self.class_context(class, true)
        };
        let mut next = 0;
        for (position, def) in member.values.iter().enumerate() {
            let value = match def.expr {
                Some(expr) => self
                    .with_context(ctx.clone(), |a| a.enum_value_expr(expr, def.span))
                    .unwrap_or(next),
                None => next,
            };
            // integers wrap like the host's `+`
            next = value.wrapping_add(1);
            if let Member::Enum(e) = &mut self.tree_mut()[class].members[index] {
                e.values[position].value = Some(value);
            }
        }

        let fqcn = self.tree()[class].fqcn.clone();
        let Member::Enum(resolved) = &self.tree()[class].members[index] else {
            return DataType::variant();
        };
        let values = resolved
            .values
            .iter()
            .map(|v| (v.name.clone(), v.value.unwrap_or_default()))
            .collect();
        let datatype = DataType::enum_value(EnumType::new(fqcn, &member.name, values))
            .into_meta()
            .with_constant(true);

        if let Member::Enum(e) = &mut self.tree_mut()[class].members[index] {
            e.datatype = datatype.clone();
            e.state = ResolutionState::Resolved;
        }
        datatype
    }

    /// Reduce an explicit enum value; it must fold to an integer.
    fn enum_value_expr(&mut self, expr: gdscript_ast::ExprId, span: Span) -> Option<i64> {
        let errors_before = self.error_count();
        self.reduce_expression(expr);
        let value = self.tree()[expr].constant_value().and_then(Variant::as_int);
        let is_int = matches!(
            self.tree()[expr].constant_value(),
            Some(Variant::Int(_))
        );
        if !is_int && self.error_count() == errors_before {
            self.error(&CompilationError::ExpectedConstant {
                message: "Enum values must be constant integers.".to_string(),
                span,
            });
        }
        value.filter(|_| is_int)
    }

    fn resolve_enum_value(&mut self, class: ClassId, index: usize) -> DataType {
        if let Some(done) = self.begin_member(class, index) {
            return done;
        }
        let Member::EnumValue(member) = self.tree()[class].members[index].clone() else {
            return DataType::variant();
        };

        let previous = member.previous.as_deref().and_then(|name| {
            let (position, _) = self.tree()[class].member(name)?;
            Some(position)
        });
        let auto = match previous {
            Some(position) => {
                self.resolve_member(class, position);
                match &self.tree()[class].members[position] {
                    Member::EnumValue(p) => p.value.map_or(0, |v| v.wrapping_add(1)),
                    _ => 0,
                }
            }
            None => 0,
        };

        let value = match member.expr {
            Some(expr) => {
                let ctx = ResolveContext {
                    current_enum: Some(CurrentEnum::Unnamed {
                        class,
                        group: member.group,
                    }),
                    ..self.class_context(class, true)
                };
                self.with_context(ctx, |a| a.enum_value_expr(expr, member.span))
                    .unwrap_or(auto)
            }
            None => auto,
        };

        let datatype = DataType::builtin(VariantType::Int).with_constant(true);
        if let Member::EnumValue(v) = &mut self.tree_mut()[class].members[index] {
            v.value = Some(value);
            v.datatype = datatype.clone();
            v.state = ResolutionState::Resolved;
        }
        datatype
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    /// Resolve parameter types, defaults and the return annotation.
    pub(crate) fn resolve_function_signature(&mut self, function: FunctionId) {
        if self.tree()[function].signature_state != ResolutionState::Unresolved {
            return;
        }
        self.tree_mut()[function].signature_state = ResolutionState::Resolving;

        let node = self.tree()[function].clone();
        let ctx = ResolveContext {
            function: Some(function),
            ..self.class_context(node.class, node.is_static)
        };
        let (params, return_type) = self.with_context(ctx, |a| {
            let params: Vec<DataType> = node
                .params
                .iter()
                .map(|p| a.declared_type(&p.name, p.type_ref, p.default, p.infer, p.span))
                .collect();
            let return_type = match node.return_type {
                Some(t) => a.resolve_type_ref(t, true),
                None if node.name == "_init" || node.accessor_of.is_some() && node.params.len() == 1 => {
                    DataType::void()
                }
                None => DataType::unresolved(),
            };
            (params, return_type)
        });

        let node = &mut self.tree_mut()[function];
        for (param, ty) in node.params.iter_mut().zip(params) {
            param.datatype = ty;
        }
        node.datatype = return_type;
        node.signature_state = ResolutionState::Resolved;
    }

    /// Return type of a function, inferring it from the body when the
    /// function has no annotation.
    ///
    /// A body that is still being resolved (recursion) reports `Variant`.
    pub(crate) fn function_return_type(&mut self, unit: UnitId, function: FunctionId) -> DataType {
        self.in_unit(unit, |a| {
            a.resolve_function_signature(function);
            let node = &a.tree()[function];
            if node.datatype.is_set() {
                return node.datatype.clone();
            }
            match node.body_state {
                ResolutionState::Resolving => DataType::variant(),
                _ => {
                    a.resolve_function_body(function);
                    let ty = &a.tree()[function].datatype;
                    if ty.is_set() { ty.clone() } else { DataType::variant() }
                }
            }
        })
    }
}

/// The type a soft declaration takes from its initializer.
pub(crate) fn soften(ty: DataType) -> DataType {
    ty.with_constant(false).with_source(TypeSource::Inferred)
}

#[cfg(test)]
mod tests {
    use gdscript_ast::{Member, MemoryLoader, ParseTree, TreeBuilder};
    use gdscript_core::{BinaryOp, ClassId, Diagnostics, TypeSource, Variant, VariantType, WarningCode};
    use gdscript_registry::HostRegistry;

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
    fn enum_values_used_before_declaration() {
        let mut b = TreeBuilder::new("res://enum.gd");
        let to_b = b.ident("B");
        let to_a = b.ident("A");
        b.named_enum(ClassId::HEAD, "E", &[("A", Some(to_b)), ("B", Some(to_a))]);
        let (_, diagnostics) = analyze(b.finish());
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(
            diagnostics.errors()[0].message,
            "Cannot use another enum element before it was declared."
        );
    }

    #[test]
    fn unnamed_enum_values_count_up_from_the_previous_one() {
        let mut b = TreeBuilder::new("res://flags.gd");
        let five = b.int(5);
        let a = b.ident("A");
        let one = b.int(1);
        let shifted = b.binary(BinaryOp::ShiftLeft, a, one);
        b.unnamed_enum(ClassId::HEAD, &[("A", Some(five)), ("B", None), ("C", Some(shifted))]);
        let (trees, diagnostics) = analyze(b.finish());
        assert!(!diagnostics.has_errors(), "{diagnostics}");
        let values: Vec<Option<i64>> = trees[0][ClassId::HEAD]
            .members
            .iter()
            .filter_map(|m| match m {
                Member::EnumValue(v) => Some(v.value),
                _ => None,
            })
            .collect();
        assert_eq!(values, vec![Some(5), Some(6), Some(10)]);
    }

    #[test]
    fn enum_auto_increment_wraps_at_the_integer_limit() {
        let mut b = TreeBuilder::new("res://limits.gd");
        let max = b.int(i64::MAX);
        b.named_enum(ClassId::HEAD, "E", &[("A", Some(max)), ("B", None)]);
        let max = b.int(i64::MAX);
        b.unnamed_enum(ClassId::HEAD, &[("HIGH", Some(max)), ("LOW", None)]);
        let (trees, diagnostics) = analyze(b.finish());
        assert!(!diagnostics.has_errors(), "{diagnostics}");

        let class = &trees[0][ClassId::HEAD];
        match class.member("E") {
            Some((_, Member::Enum(e))) => {
                assert_eq!(e.values[0].value, Some(i64::MAX));
                assert_eq!(e.values[1].value, Some(i64::MIN));
            }
            _ => panic!("no enum E"),
        }
        match class.member("LOW") {
            Some((_, Member::EnumValue(v))) => assert_eq!(v.value, Some(i64::MIN)),
            _ => panic!("no enum value LOW"),
        }
    }

    #[test]
    fn members_referring_to_each_other_are_cyclic() {
        let mut b = TreeBuilder::new("res://cycle.gd");
        let to_b = b.ident("b");
        let to_a = b.ident("a");
        b.constant(ClassId::HEAD, "a", None, to_b);
        b.constant(ClassId::HEAD, "b", None, to_a);
        let (_, diagnostics) = analyze(b.finish());
        assert!(
            diagnostics
                .errors()
                .iter()
                .any(|d| d.message.contains("Cyclic reference")),
            "{diagnostics}"
        );
    }

    #[test]
    fn declaration_typing() {
        let mut b = TreeBuilder::new("res://decl.gd");
        let int = b.type_ref(&["int"]);
        let half = b.float(0.5);
        b.variable(ClassId::HEAD, "narrowed", Some(int), Some(half));
        let word = b.string("w");
        b.variable(ClassId::HEAD, "inferred", None, Some(word)).infer = true;
        let nothing = b.null();
        b.variable(ClassId::HEAD, "unknown", None, Some(nothing)).infer = true;
        let two = b.int(2);
        b.variable(ClassId::HEAD, "soft", None, Some(two));
        let (trees, diagnostics) = analyze(b.finish());

        assert!(diagnostics.has_warning(WarningCode::NarrowingConversion));
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(
            diagnostics.errors()[0].message,
            "Cannot infer the type of \"unknown\" because the value doesn't have a set type."
        );
        let member_type = |name: &str| match trees[0][ClassId::HEAD].member(name) {
            Some((_, Member::Variable(v))) => v.datatype.clone(),
            _ => panic!("no variable {name}"),
        };
        assert_eq!(member_type("inferred").source, TypeSource::AnnotatedInferred);
        assert!(member_type("inferred").is_builtin(VariantType::String));
        assert_eq!(member_type("soft").source, TypeSource::Inferred);
    }

    #[test]
    fn constants_need_constant_initializers() {
        let mut b = TreeBuilder::new("res://const.gd");
        b.variable(ClassId::HEAD, "v", None, None);
        let v = b.ident("v");
        b.constant(ClassId::HEAD, "C", None, v);
        let three = b.int(3);
        b.constant(ClassId::HEAD, "D", None, three);
        let (trees, diagnostics) = analyze(b.finish());
        assert_eq!(diagnostics.error_count(), 1, "{diagnostics}");
        assert_eq!(
            diagnostics.errors()[0].message,
            "Assigned value for constant \"C\" isn't a constant expression."
        );
        match trees[0][ClassId::HEAD].member("D") {
            Some((_, Member::Constant(c))) => assert_eq!(c.value, Variant::Int(3)),
            _ => panic!("no constant D"),
        }
    }
}
