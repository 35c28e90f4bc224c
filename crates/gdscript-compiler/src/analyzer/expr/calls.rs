//! Calls and `await`.
//!
//! A call is, in priority order: a builtin type constructor, a utility
//! function, or a method found on `self`, `super` or an explicit receiver.
//! Arguments are always reduced first, so every argument has a type even
//! when the call itself fails.

use gdscript_ast::{Binding, ExprId, ExprKind, FunctionId, Member};
use gdscript_core::{
    CompilationError, DataType, EvalError, Span, TypeKind, UnitId, Variant, VariantType,
    WarningCode, construct,
};
use gdscript_registry::MethodInfo;

use super::Reduction;
use super::binary::eval_error;
use crate::analyzer::{Analyzer, Verdict};

/// A callable signature, from a script function or the host.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Signature {
    pub name: String,
    pub params: Vec<DataType>,
    pub default_count: usize,
    pub vararg: bool,
    pub is_static: bool,
    pub return_type: DataType,
    pub is_coroutine: bool,
}

impl Signature {
    fn required_count(&self) -> usize {
        self.params.len().saturating_sub(self.default_count)
    }
}

impl Analyzer<'_, '_> {
    pub(super) fn reduce_call(
        &mut self,
        base: Option<ExprId>,
        name: &str,
        args: &[ExprId],
        is_super: bool,
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        for &arg in args {
            if let Err(err) = self.reduce_value(arg) {
                self.error(&err);
            }
        }

        if let Some(base) = base {
            return self.reduce_method_call(base, name, args, span);
        }
        if is_super {
            return self.reduce_super_call(name, args, span);
        }
        if let Some(ty) = VariantType::from_name(name) {
            return self.reduce_constructor(ty, args, span);
        }
        if let Some(utility) = self.oracle().utility_function(name) {
            let signature = self.host_signature(&utility.info);
            self.validate_arguments(&signature, args, span);
            let binding = Binding::Utility(name.to_string());
            if utility.pure {
                if let Some(values) = self.constant_arguments(args) {
                    match self.oracle().call_utility(name, &values) {
                        Ok(value) => {
                            return Ok(Reduction::constant_typed(signature.return_type, value)
                                .with_binding(binding));
                        }
                        Err(err @ EvalError::TooLarge { .. }) => {
                            tracing::debug!(%err, "call left to run time");
                        }
                        Err(err) => return Err(eval_error(err, span)),
                    }
                }
            }
            return Ok(Reduction::typed(signature.return_type).with_binding(binding));
        }

        let this = self.current_class_type();
        let Some(signature) = self.find_method(&this, name) else {
            return Err(CompilationError::FunctionNotFound {
                name: name.to_string(),
                base: "self".to_string(),
                span,
            });
        };
        if self.ctx.is_static && !signature.is_static {
            return Err(CompilationError::StaticContext {
                name: name.to_string(),
                span,
            });
        }
        Ok(self.finish_call(&signature, args, span))
    }

    fn reduce_super_call(
        &mut self,
        name: &str,
        args: &[ExprId],
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let base = self.tree()[self.ctx.class].base_type.clone();
        let signature = self.find_method(&base, name).ok_or_else(|| {
            CompilationError::FunctionNotFound {
                name: name.to_string(),
                base: format!("\"{base}\""),
                span,
            }
        })?;
        Ok(self.finish_call(&signature, args, span))
    }

    fn reduce_method_call(
        &mut self,
        base: ExprId,
        name: &str,
        args: &[ExprId],
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let base_type = self.reduce_value(base)?;

        if base_type.is_variant() {
            self.warn(
                WarningCode::UnsafeMethodAccess,
                format!("The method \"{name}()\" is not present on the inferred type \"Variant\" (but may be present on a subtype)."),
                span,
            );
            return Ok(Reduction::dynamic().with_binding(Binding::Method(name.to_string())));
        }

        if base_type.is_meta_type && name == "new" {
            return self.reduce_instantiation(&base_type, args, span);
        }

        let Some(signature) = self.find_method(&base_type, name) else {
            if base_type.is_hard_type() || base_type.is_meta_type {
                return Err(CompilationError::FunctionNotFound {
                    name: name.to_string(),
                    base: format!("\"{base_type}\""),
                    span,
                });
            }
            self.warn(
                WarningCode::UnsafeMethodAccess,
                format!("The method \"{name}()\" is not present on the inferred type \"{base_type}\" (but may be present on a subtype)."),
                span,
            );
            return Ok(Reduction::dynamic().with_binding(Binding::Method(name.to_string())));
        };

        if base_type.is_meta_type
            && !signature.is_static
            && !matches!(base_type.kind, TypeKind::Enum(_))
        {
            return Err(CompilationError::other(
                format!("Cannot call non-static function \"{name}()\" on the class \"{base_type}\" directly. Make an instance instead."),
                span,
            ));
        }
        Ok(self.finish_call(&signature, args, span))
    }

    /// `Class.new(...)`, checked against the class's `_init`.
    fn reduce_instantiation(
        &mut self,
        base_type: &DataType,
        args: &[ExprId],
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let instance = base_type.clone().into_instance().with_constant(false);
        match &base_type.kind {
            TypeKind::Class(class) => {
                let class = class.clone();
                let init = self.find_method(&instance, "_init").unwrap_or(Signature {
                    name: "_init".to_string(),
                    params: Vec::new(),
                    default_count: 0,
                    vararg: false,
                    is_static: false,
                    return_type: DataType::void(),
                    is_coroutine: false,
                });
                let name = format!("{}.new", class.name);
                self.validate_arguments(&Signature { name, ..init }, args, span);
                Ok(Reduction::typed(instance))
            }
            TypeKind::Native(class) if self.oracle().class_exists(class) => {
                Ok(Reduction::typed(instance))
            }
            _ => Err(CompilationError::FunctionNotFound {
                name: "new".to_string(),
                base: format!("\"{base_type}\""),
                span,
            }),
        }
    }

    fn reduce_constructor(
        &mut self,
        ty: VariantType,
        args: &[ExprId],
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let arg_types: Vec<DataType> = args.iter().map(|&a| self.type_of(a)).collect();
        let matches = self.oracle().builtin_constructors(ty).iter().any(|signature| {
            signature.arity() == args.len()
                && signature
                    .params
                    .iter()
                    .zip(&arg_types)
                    .all(|((_, param), arg)| self.compatible(&DataType::builtin(*param), arg, true))
        });
        if !matches {
            let signature = arg_types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(CompilationError::NoMatchingConstructor {
                type_name: ty.name().to_string(),
                signature: format!("{}({signature})", ty.name()),
                span,
            });
        }

        let datatype = DataType::builtin(ty);
        let binding = Binding::Constructor(ty);
        if let Some(values) = self.constant_arguments(args) {
            let value = construct(ty, &values).map_err(|err| eval_error(err, span))?;
            return Ok(Reduction::constant_typed(datatype, value).with_binding(binding));
        }
        Ok(Reduction::typed(datatype).with_binding(binding))
    }

    fn finish_call(&mut self, signature: &Signature, args: &[ExprId], span: Span) -> Reduction {
        self.validate_arguments(signature, args, span);
        let mut datatype = signature.return_type.clone().with_constant(false);
        datatype.is_coroutine = signature.is_coroutine;
        Reduction::typed(datatype).with_binding(Binding::Method(signature.name.clone()))
    }

    /// Check argument count and types against a signature.
    ///
    /// Errors are recorded directly so the call keeps its return type.
    pub(crate) fn validate_arguments(&mut self, signature: &Signature, args: &[ExprId], span: Span) {
        let callee = signature.name.clone();
        if args.len() < signature.required_count() {
            self.error(&CompilationError::TooFewArguments {
                callee,
                expected: signature.required_count(),
                received: args.len(),
                span,
            });
            return;
        }
        if !signature.vararg && args.len() > signature.params.len() {
            self.error(&CompilationError::TooManyArguments {
                callee,
                expected: signature.params.len(),
                received: args.len(),
                span,
            });
            return;
        }

        for (position, (param, &arg)) in signature.params.iter().zip(args).enumerate() {
            let arg_type = self.type_of(arg);
            let arg_span = self.tree()[arg].span;
            match self.verdict(param, &arg_type) {
                Verdict::Compatible => {}
                Verdict::Narrowing => self.warn(
                    WarningCode::NarrowingConversion,
                    format!("Narrowing conversion (\"{arg_type}\" is converted to \"{param}\" and will lose precision)."),
                    arg_span,
                ),
                Verdict::Unsafe => {
                    self.mark_unsafe(arg_span);
                    self.warn(
                        WarningCode::UnsafeCallArgument,
                        format!("The argument {} of the function \"{callee}()\" requires the subtype \"{param}\" but the supertype \"{arg_type}\" was provided.", position + 1),
                        arg_span,
                    );
                }
                Verdict::Incompatible => self.error(&CompilationError::InvalidArgument {
                    callee: callee.clone(),
                    index: position + 1,
                    expected: param.to_string(),
                    found: arg_type.to_string(),
                    span: arg_span,
                }),
            }
        }
    }

    fn constant_arguments(&self, args: &[ExprId]) -> Option<Vec<Variant>> {
        args.iter().map(|&a| self.value_of(a)).collect()
    }

    // ==========================================================================
    // Signatures
    // ==========================================================================

    /// Find a method on a type: script functions along the class chain, then
    /// the native tail, or the builtin method table.
    pub(crate) fn find_method(&mut self, base: &DataType, name: &str) -> Option<Signature> {
        match &base.kind {
            TypeKind::Class(class) => {
                for owner in self.class_chain_of(class) {
                    if let Some((_, Member::Function(function))) =
                        self.member_at(owner.unit, owner.class, name)
                    {
                        return Some(self.script_signature(owner.unit, function));
                    }
                }
                let root = self.native_root_of(class)?;
                self.native_method(&root, name)
            }
            TypeKind::Native(class) => self.native_method(class, name),
            TypeKind::Builtin(ty) if !base.is_meta_type => {
                let info = self.oracle().builtin_method(*ty, name)?;
                Some(self.host_signature(&info))
            }
            TypeKind::Builtin(ty) => {
                let info = self.oracle().builtin_method(*ty, name)?;
                info.is_static().then(|| self.host_signature(&info))
            }
            TypeKind::Enum(_) if base.is_meta_type => {
                let info = self.oracle().builtin_method(VariantType::Dictionary, name)?;
                Some(self.host_signature(&info))
            }
            TypeKind::Enum(_) => {
                let info = self.oracle().builtin_method(VariantType::Int, name)?;
                Some(self.host_signature(&info))
            }
            TypeKind::Unresolved | TypeKind::Variant => None,
        }
    }

    fn native_method(&self, class: &str, name: &str) -> Option<Signature> {
        let info = self.oracle().get_method_info(class, name)?;
        Some(self.host_signature(&info))
    }

    fn host_signature(&self, info: &MethodInfo) -> Signature {
        Signature {
            name: info.name.clone(),
            params: info.params.iter().map(|p| self.host_type(&p.ty)).collect(),
            default_count: info.default_count,
            vararg: info.is_vararg(),
            is_static: info.is_static(),
            return_type: self.host_type(&info.return_type),
            is_coroutine: info.is_coroutine(),
        }
    }

    /// Signature of a script function. Resolves the body when the return
    /// type has to be inferred or the coroutine flag is not known yet.
    pub(crate) fn script_signature(&mut self, unit: UnitId, function: FunctionId) -> Signature {
        let return_type = self.function_return_type(unit, function);
        self.in_unit(unit, |a| {
            if a.tree()[function].body_state == gdscript_ast::ResolutionState::Unresolved {
                a.resolve_function_body(function);
            }
            let node = &a.tree()[function];
            Signature {
                name: node.name.clone(),
                params: node.params.iter().map(|p| p.datatype.clone()).collect(),
                default_count: node.default_count(),
                vararg: false,
                is_static: node.is_static,
                return_type,
                is_coroutine: node.is_coroutine,
            }
        })
    }

    // ==========================================================================
    // Await
    // ==========================================================================

    pub(super) fn reduce_await(&mut self, operand: ExprId, span: Span) -> Reduction {
        let operand_type = self.reduce_expression(operand);
        if let Some(function) = self.ctx.function {
            self.tree_mut()[function].is_coroutine = true;
        }

        if operand_type.is_variant() {
            return Reduction::dynamic();
        }
        if operand_type.is_builtin(VariantType::Signal) {
            return Reduction::typed(DataType::variant());
        }
        let is_call = matches!(self.tree()[operand].kind, ExprKind::Call { .. });
        if !(is_call && operand_type.is_coroutine) {
            self.warn(
                WarningCode::RedundantAwait,
                "\"await\" keyword is unnecessary because the expression isn't a coroutine nor a signal.",
                span,
            );
        }
        let mut datatype = operand_type;
        datatype.is_coroutine = false;
        Reduction::typed(datatype)
    }
}

#[cfg(test)]
mod tests {
    use gdscript_ast::{MemoryLoader, ParseTree, TreeBuilder};
    use gdscript_core::{ClassId, Diagnostics, Variant, VariantType};
    use gdscript_registry::{HostRegistry, MAX_FOLDED_RANGE};

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
    fn small_ranges_fold() {
        let mut b = TreeBuilder::new("res://range.gd");
        let three = b.int(3);
        let call = b.call("range", vec![three]);
        b.constant(ClassId::HEAD, "R", None, call);
        let (trees, diagnostics) = analyze(b.finish());
        assert!(!diagnostics.has_errors(), "{diagnostics}");
        assert_eq!(
            trees[0][call].reduced_value,
            Variant::Array(vec![Variant::Int(0), Variant::Int(1), Variant::Int(2)])
        );
    }

    #[test]
    fn huge_ranges_are_left_to_run_time() {
        let mut b = TreeBuilder::new("res://range.gd");
        let end = b.int(MAX_FOLDED_RANGE as i64 * 1000);
        let call = b.call("range", vec![end]);
        let var_r = b.var_stmt("r", None, Some(call));
        b.function(ClassId::HEAD, "f", vec![], None, vec![var_r]);
        let max = b.int(i64::MAX);
        let min = b.int(i64::MIN);
        let step = b.int(2);
        let wide = b.call("range", vec![min, max, step]);
        let var_w = b.var_stmt("w", None, Some(wide));
        b.function(ClassId::HEAD, "g", vec![], None, vec![var_w]);

        let (trees, diagnostics) = analyze(b.finish());
        assert!(!diagnostics.has_errors(), "{diagnostics}");
        for id in [call, wide] {
            let node = &trees[0][id];
            assert!(!node.is_constant);
            assert!(node.datatype.is_builtin(VariantType::Array));
        }
    }
}
