//! Type annotations and host types.

use gdscript_ast::{Member, TypeRefId};
use gdscript_core::{
    ClassId, CompilationError, DataType, EnumType, Span, TypeKind, TypeSource, UnitId, VariantType,
};
use gdscript_registry::HostType;

use super::Analyzer;

impl Analyzer<'_, '_> {
    /// Convert a host type description into a `DataType`.
    pub(crate) fn host_type(&self, ty: &HostType) -> DataType {
        match ty {
            HostType::Variant => DataType::variant(),
            HostType::Void => DataType::void(),
            HostType::Builtin(ty) => DataType::builtin(*ty),
            HostType::Object(class) => DataType::native(class.clone()),
            HostType::Enum { class, name } => self
                .host_enum(class, name)
                .map(DataType::enum_value)
                .unwrap_or_else(|| DataType::builtin(VariantType::Int)),
        }
    }

    /// A native class enum, or a global enum when `class` is empty.
    pub(crate) fn host_enum(&self, class: &str, name: &str) -> Option<EnumType> {
        let values = if class.is_empty() {
            self.oracle().global_enum(name)?
        } else {
            self.oracle().get_enum_values(class, name)?
        };
        Some(EnumType::new(class, name, values))
    }

    /// Resolve a written annotation, caching the result on the node.
    ///
    /// `void` is accepted only when `allow_void` is set (return types).
    pub(crate) fn resolve_type_ref(&mut self, id: TypeRefId, allow_void: bool) -> DataType {
        let cached = &self.tree()[id].datatype;
        if cached.is_set() {
            return cached.clone();
        }

        let segments = self.tree()[id].segments.clone();
        let span = self.tree()[id].span;
        let resolved = match self.resolve_type_segments(&segments, allow_void, span) {
            Ok(ty) => ty.into_instance().with_source(TypeSource::AnnotatedExplicit),
            Err(err) => {
                self.error(&err);
                DataType::variant()
            }
        };
        self.tree_mut()[id].datatype = resolved.clone();
        resolved
    }

    fn resolve_type_segments(
        &mut self,
        segments: &[String],
        allow_void: bool,
        span: Span,
    ) -> Result<DataType, CompilationError> {
        let not_found = || CompilationError::TypeNotFound {
            name: segments.join("."),
            span,
        };
        let (first, rest) = segments.split_first().ok_or_else(not_found)?;

        let mut current = match first.as_str() {
            "void" if allow_void && rest.is_empty() => return Ok(DataType::void()),
            "void" => {
                return Err(CompilationError::other(
                    "\"void\" is only allowed for a function return type.",
                    span,
                ));
            }
            _ => self.lookup_type_name(first).ok_or_else(not_found)?,
        };

        for segment in rest {
            current = self.nested_type(&current, segment).ok_or_else(not_found)?;
        }
        Ok(current)
    }

    /// The type named by a single identifier, searched in order: `Variant`,
    /// builtin types, native classes, global classes, autoloads, global
    /// enums, then the lexically enclosing classes.
    fn lookup_type_name(&mut self, name: &str) -> Option<DataType> {
        if name == "Variant" {
            return Some(DataType::variant().with_source(TypeSource::AnnotatedExplicit));
        }
        if let Some(ty) = VariantType::from_name(name) {
            return Some(DataType::builtin(ty));
        }
        if self.oracle().class_exists(name) {
            return Some(DataType::native(name));
        }
        if let Some(path) = self.oracle().global_class_path(name) {
            return self.script_head(&path).map(|c| self.class_type(c.0, c.1));
        }
        if let Some(path) = self.oracle().autoload(name) {
            if path.ends_with(".gd") {
                return self.script_head(&path).map(|c| self.class_type(c.0, c.1));
            }
        }
        if let Some(e) = self.host_enum("", name) {
            return Some(DataType::enum_value(e));
        }

        let unit = self.unit();
        for class in self.tree().lexical_chain(self.ctx.class) {
            let owner = self.class_type(unit, class);
            if let Some(found) = self.nested_type(&owner, name) {
                return Some(found);
            }
        }
        None
    }

    /// A type declared inside another: nested classes, enums and constants
    /// holding a class.
    pub(crate) fn nested_type(&mut self, owner: &DataType, name: &str) -> Option<DataType> {
        match &owner.kind {
            TypeKind::Class(class) => {
                let chain = self.class_chain_of(class);
                for class in &chain {
                    let Some((index, _)) = self.member_at(class.unit, class.class, name) else {
                        continue;
                    };
                    let ty = self.resolve_member_in(class.unit, class.class, index);
                    return match &ty.kind {
                        TypeKind::Class(_) | TypeKind::Native(_) if ty.is_meta_type => {
                            Some(ty.into_instance())
                        }
                        TypeKind::Enum(_) if ty.is_meta_type => Some(ty.into_instance()),
                        _ => None,
                    };
                }
                let root = self.native_root_of(class)?;
                self.native_nested_type(&root, name)
            }
            TypeKind::Native(class) => self.native_nested_type(class, name),
            _ => None,
        }
    }

    fn native_nested_type(&self, class: &str, name: &str) -> Option<DataType> {
        if self.oracle().has_enum(class, name) {
            return self.host_enum(class, name).map(DataType::enum_value);
        }
        None
    }

    /// Member position by name in one class of any unit.
    pub(crate) fn member_at(
        &self,
        unit: UnitId,
        class: ClassId,
        name: &str,
    ) -> Option<(usize, Member)> {
        self.session.tree(unit)[class]
            .member(name)
            .map(|(index, member)| (index, member.clone()))
    }
}

#[cfg(test)]
mod tests {
    use gdscript_ast::{MemoryLoader, TreeBuilder};
    use gdscript_core::{ClassId, TypeKind, VariantType};
    use gdscript_registry::HostRegistry;

    use crate::analyzer::Analyzer;
    use crate::session::AnalysisSession;
    use crate::CompilerOptions;

    #[test]
    fn annotations_resolve_in_lookup_order() {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);

        let mut b = TreeBuilder::new("res://a.gd");
        let inner = b.class(ClassId::HEAD, "Inner");
        b.named_enum(inner, "Mode", &[("A", None), ("B", None)]);
        let int = b.type_ref(&["int"]);
        let node = b.type_ref(&["Node2D"]);
        let nested = b.type_ref(&["Inner", "Mode"]);
        let native_enum = b.type_ref(&["Node", "ProcessMode"]);
        let missing = b.type_ref(&["Nope"]);
        let unit = session.add_main(b.finish());

        let mut analyzer = Analyzer::new(&mut session, unit);
        analyzer.resolve_inheritance(ClassId::HEAD, true);
        assert!(analyzer.resolve_type_ref(int, false).is_builtin(VariantType::Int));
        assert_eq!(analyzer.resolve_type_ref(node, false).kind, TypeKind::Native("Node2D".into()));
        let mode = analyzer.resolve_type_ref(nested, false);
        assert!(matches!(&mode.kind, TypeKind::Enum(e) if e.name == "Mode" && e.values.len() == 2));
        assert!(!mode.is_meta_type);
        assert!(matches!(analyzer.resolve_type_ref(native_enum, false).kind, TypeKind::Enum(_)));
        assert!(analyzer.resolve_type_ref(missing, false).is_variant());

        let diagnostics = session.diagnostics();
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(
            diagnostics.errors()[0].message,
            "Could not find type \"Nope\" in the current scope."
        );
    }
}
