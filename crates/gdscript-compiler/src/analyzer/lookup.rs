//! Member lookup under a base type.
//!
//! Given the type of a base expression and a name, find what the name refers
//! to: a script member (walking the class chain), a native property, method,
//! signal, enum or constant, a builtin property or constant, or an enum value.

use gdscript_ast::{Binding, Member};
use gdscript_core::{
    ClassRef, CompilationError, DataType, Span, TypeKind, Variant, VariantType, get_named,
    placeholder_for,
};

use super::Analyzer;
use super::expr::Reduction;

impl Analyzer<'_, '_> {
    pub(crate) fn class_chain_of(&self, class: &ClassRef) -> Vec<ClassRef> {
        super::class_chain(self.trees(), class)
    }

    pub(crate) fn native_root_of(&self, class: &ClassRef) -> Option<String> {
        super::compat::native_root(self.trees(), class)
    }

    /// Whether a type is, or extends, the native class `native`.
    pub(crate) fn inherits_native(&self, ty: &DataType, native: &str) -> bool {
        match &ty.kind {
            TypeKind::Native(class) => self.oracle().is_parent_class(class, native),
            TypeKind::Class(class) => self
                .native_root_of(class)
                .is_some_and(|root| self.oracle().is_parent_class(&root, native)),
            _ => false,
        }
    }

    /// Look `name` up under `base`.
    ///
    /// `implicit_self` is set for bare identifiers: the current class is the
    /// base, static context rules apply, and the constants of lexically
    /// enclosing classes are visible. `Ok(None)` means the name was not found.
    pub(crate) fn reduce_member_from_base(
        &mut self,
        base: &DataType,
        base_value: Option<&Variant>,
        name: &str,
        implicit_self: bool,
        span: Span,
    ) -> Result<Option<Reduction>, CompilationError> {
        match &base.kind {
            TypeKind::Unresolved | TypeKind::Variant => Ok(Some(Reduction::dynamic())),
            TypeKind::Class(class) => {
                let class = class.clone();
                self.reduce_class_member(&class, base.is_meta_type, name, implicit_self, span)
            }
            TypeKind::Native(class) => {
                let class = class.clone();
                Ok(self.reduce_native_member(&class, base.is_meta_type, name))
            }
            TypeKind::Builtin(ty) => Ok(self.reduce_builtin_member(*ty, base, base_value, name)),
            TypeKind::Enum(e) if base.is_meta_type => Ok(e.value(name).map(|value| {
                Reduction::constant_typed(
                    DataType::enum_value(e.clone()),
                    Variant::Int(value),
                )
            })),
            TypeKind::Enum(_) => Ok(None),
        }
    }

    fn reduce_class_member(
        &mut self,
        class: &ClassRef,
        is_meta: bool,
        name: &str,
        implicit_self: bool,
        span: Span,
    ) -> Result<Option<Reduction>, CompilationError> {
        for owner in self.class_chain_of(class) {
            if let Some((index, member)) = self.member_at(owner.unit, owner.class, name) {
                let owner = self.class_ref(owner.unit, owner.class);
                return self
                    .reduce_script_member(&owner, index, &member, is_meta, implicit_self, span)
                    .map(Some);
            }
        }

        if implicit_self {
            let outers = self.session.tree(class.unit).lexical_chain(class.class);
            for outer in outers.into_iter().skip(1) {
                let Some((index, member)) = self.member_at(class.unit, outer, name) else {
                    continue;
                };
                if matches!(
                    member,
                    Member::Constant(_) | Member::EnumValue(_) | Member::Enum(_) | Member::Class(_)
                ) {
                    let owner = self.class_ref(class.unit, outer);
                    return self
                        .reduce_script_member(&owner, index, &member, true, false, span)
                        .map(Some);
                }
            }
        }

        match self.native_root_of(class) {
            Some(root) => Ok(self.reduce_native_member(&root, is_meta, name)),
            None => Ok(None),
        }
    }

    fn reduce_script_member(
        &mut self,
        owner: &ClassRef,
        index: usize,
        member: &Member,
        is_meta: bool,
        implicit_self: bool,
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let static_context = is_meta || implicit_self && self.ctx.is_static;
        let datatype = self.resolve_member_in(owner.unit, owner.class, index);
        let tree = self.session.tree(owner.unit);
        let name = tree.member_name(member).to_string();
        let instance_only = || CompilationError::StaticContext {
            name: name.clone(),
            span,
        };

        let reduction = match member {
            Member::Variable(_) => {
                let Member::Variable(var) = &tree[owner.class].members[index] else {
                    return Err(CompilationError::internal("member changed kind", span));
                };
                if static_context && !var.is_static {
                    return Err(instance_only());
                }
                let binding = Binding::MemberVariable {
                    class: owner.clone(),
                    member: index,
                    index: var.index,
                    is_static: var.is_static,
                };
                Reduction::typed(datatype.with_constant(false)).with_binding(binding)
            }
            Member::Constant(_) => {
                let Member::Constant(constant) = &tree[owner.class].members[index] else {
                    return Err(CompilationError::internal("member changed kind", span));
                };
                Reduction::constant_typed(datatype, constant.value.clone())
            }
            Member::EnumValue(_) => {
                let Member::EnumValue(value) = &tree[owner.class].members[index] else {
                    return Err(CompilationError::internal("member changed kind", span));
                };
                Reduction::constant(Variant::Int(value.value.unwrap_or_default()))
            }
            Member::Enum(_) => {
                let value = match &datatype.kind {
                    TypeKind::Enum(e) => e.to_dictionary(),
                    _ => Variant::Nil,
                };
                Reduction::constant_typed(datatype, value)
            }
            Member::Signal(_) => {
                if static_context {
                    return Err(instance_only());
                }
                Reduction::typed(datatype).with_binding(Binding::Signal(name.clone()))
            }
            Member::Function(function) => {
                if static_context && !tree[*function].is_static {
                    return Err(instance_only());
                }
                Reduction::typed(DataType::builtin(VariantType::Callable))
                    .with_binding(Binding::Method(name.clone()))
            }
            Member::Class(_) => Reduction::typed(datatype),
        };
        Ok(reduction)
    }

    fn reduce_native_member(&self, class: &str, is_meta: bool, name: &str) -> Option<Reduction> {
        let oracle = self.oracle();
        if !is_meta {
            if let Some(property) = oracle.get_property_info(class, name) {
                let datatype = self.host_type(&property.ty).with_constant(property.read_only);
                return Some(
                    Reduction::typed(datatype).with_binding(Binding::NativeProperty(name.into())),
                );
            }
        }
        if let Some(method) = oracle.get_method_info(class, name) {
            if !is_meta || method.is_static() {
                return Some(
                    Reduction::typed(DataType::builtin(VariantType::Callable))
                        .with_binding(Binding::Method(name.into())),
                );
            }
        }
        if !is_meta && oracle.get_signal_info(class, name).is_some() {
            return Some(
                Reduction::typed(DataType::builtin(VariantType::Signal))
                    .with_binding(Binding::Signal(name.into())),
            );
        }
        if oracle.has_enum(class, name) {
            let e = self.host_enum(class, name)?;
            let value = e.to_dictionary();
            return Some(Reduction::constant_typed(
                DataType::enum_value(e).into_meta(),
                value,
            ));
        }
        let value = oracle.get_integer_constant(class, name)?;
        let datatype = oracle
            .integer_constant_enum(class, name)
            .and_then(|e| self.host_enum(class, &e))
            .map(DataType::enum_value)
            .unwrap_or_else(|| DataType::builtin(VariantType::Int));
        Some(Reduction::constant_typed(datatype, Variant::Int(value)))
    }

    fn reduce_builtin_member(
        &self,
        ty: VariantType,
        base: &DataType,
        base_value: Option<&Variant>,
        name: &str,
    ) -> Option<Reduction> {
        if base.is_meta_type {
            let value = self.oracle().builtin_constant(ty, name)?;
            return Some(Reduction::constant(value));
        }
        if let Some(value) = base_value {
            if let Some(folded) = get_named(value, name) {
                return Some(Reduction::constant(folded));
            }
        }
        if let Some(sample) = get_named(&placeholder_for(ty), name) {
            return Some(Reduction::typed(DataType::from_variant(&sample)));
        }
        self.oracle().builtin_method(ty, name).map(|_| {
            Reduction::typed(DataType::builtin(VariantType::Callable))
                .with_binding(Binding::Method(name.into()))
        })
    }
}

#[cfg(test)]
mod tests {
    use gdscript_ast::{Binding, MemoryLoader, TreeBuilder};
    use gdscript_core::{ClassId, Span, TypeKind, Variant, VariantType};
    use gdscript_registry::{HostRegistry, MethodInfo, NativeClass};

    use crate::CompilerOptions;
    use crate::analyzer::Analyzer;
    use crate::session::AnalysisSession;

    #[test]
    fn native_members_in_lookup_order() {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);
        let mut b = TreeBuilder::new("res://a.gd");
        b.set_extends_names(ClassId::HEAD, &["Node2D"]);
        let unit = session.add_main(b.finish());

        let mut analyzer = Analyzer::new(&mut session, unit);
        analyzer.analyze();
        let this = analyzer.current_class_type();
        let span = Span::point(1, 1);

        let position = analyzer
            .reduce_member_from_base(&this, None, "position", true, span)
            .unwrap()
            .unwrap();
        assert!(position.datatype.is_builtin(VariantType::Vector2));
        assert_eq!(position.binding, Binding::NativeProperty("position".into()));

        let ready = analyzer
            .reduce_member_from_base(&this, None, "ready", true, span)
            .unwrap()
            .unwrap();
        assert!(ready.datatype.is_builtin(VariantType::Signal));

        let mode = analyzer
            .reduce_member_from_base(&this, None, "ProcessMode", true, span)
            .unwrap()
            .unwrap();
        assert!(mode.datatype.is_meta_type);
        assert!(matches!(mode.datatype.kind, TypeKind::Enum(_)));

        assert!(analyzer
            .reduce_member_from_base(&this, None, "nothing_here", true, span)
            .unwrap()
            .is_none());
    }

    #[test]
    fn native_methods_shadow_signals_of_the_same_name() {
        let mut oracle = HostRegistry::with_core_classes();
        oracle
            .register_class(
                NativeClass::new("Relay", Some("Node"))
                    .with_method(MethodInfo::void("fire"))
                    .with_signal(MethodInfo::signal("fire"))
                    .with_signal(MethodInfo::signal("fired")),
            )
            .unwrap();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);
        let mut b = TreeBuilder::new("res://relay.gd");
        b.set_extends_names(ClassId::HEAD, &["Relay"]);
        let unit = session.add_main(b.finish());

        let mut analyzer = Analyzer::new(&mut session, unit);
        analyzer.analyze();
        let this = analyzer.current_class_type();
        let span = Span::point(1, 1);

        let fire = analyzer
            .reduce_member_from_base(&this, None, "fire", true, span)
            .unwrap()
            .unwrap();
        assert!(fire.datatype.is_builtin(VariantType::Callable));
        assert_eq!(fire.binding, Binding::Method("fire".into()));

        let fired = analyzer
            .reduce_member_from_base(&this, None, "fired", true, span)
            .unwrap()
            .unwrap();
        assert!(fired.datatype.is_builtin(VariantType::Signal));
        assert_eq!(fired.binding, Binding::Signal("fired".into()));
    }

    #[test]
    fn outer_classes_expose_only_constants() {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);
        let mut b = TreeBuilder::new("res://a.gd");
        let one = b.int(1);
        let two = b.int(2);
        b.constant(ClassId::HEAD, "LIMIT", None, one);
        b.variable(ClassId::HEAD, "hp", None, Some(two));
        let inner = b.class(ClassId::HEAD, "Inner");
        let unit = session.add_main(b.finish());

        let mut analyzer = Analyzer::new(&mut session, unit);
        analyzer.analyze();
        let inner_type = analyzer.class_type(unit, inner);
        let span = Span::point(1, 1);

        let limit = analyzer
            .reduce_member_from_base(&inner_type, None, "LIMIT", true, span)
            .unwrap()
            .unwrap();
        assert_eq!(limit.value, Some(Variant::Int(1)));
        assert!(analyzer
            .reduce_member_from_base(&inner_type, None, "hp", true, span)
            .unwrap()
            .is_none());
    }

    #[test]
    fn builtin_members_fold_on_constant_bases() {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);
        let unit = session.add_main(TreeBuilder::new("res://a.gd").finish());
        let mut analyzer = Analyzer::new(&mut session, unit);
        let span = Span::point(1, 1);

        let vector = gdscript_core::DataType::builtin(VariantType::Vector2);
        let value = Variant::Vector2(gdscript_core::Vector2::new(3.0, 4.0));
        let y = analyzer
            .reduce_member_from_base(&vector, Some(&value), "y", false, span)
            .unwrap()
            .unwrap();
        assert_eq!(y.value, Some(Variant::Float(4.0)));

        let x = analyzer
            .reduce_member_from_base(&vector, None, "x", false, span)
            .unwrap()
            .unwrap();
        assert!(x.datatype.is_builtin(VariantType::Float));
        assert!(x.value.is_none());
    }
}
