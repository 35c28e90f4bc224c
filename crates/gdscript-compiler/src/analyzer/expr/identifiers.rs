//! Identifier reduction.

use gdscript_ast::{Binding, IdentifierSource, Member, ResolutionState, StmtKind};
use gdscript_core::{CompilationError, DataType, Span, Variant, VariantType};

use super::Reduction;
use crate::analyzer::{Analyzer, CurrentEnum};

/// Named values available everywhere.
const GLOBAL_NAMED_VALUES: [(&str, f64); 4] = [
    ("PI", std::f64::consts::PI),
    ("TAU", std::f64::consts::TAU),
    ("INF", f64::INFINITY),
    ("NAN", f64::NAN),
];

impl Analyzer<'_, '_> {
    pub(super) fn reduce_identifier(
        &mut self,
        name: &str,
        source: IdentifierSource,
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        if let Some(reduction) = self.reduce_current_enum_value(name, source, span)? {
            return Ok(reduction);
        }

        match source {
            IdentifierSource::Parameter(function, index) => {
                self.resolve_function_signature(function);
                let datatype = self.tree()[function].params[index].datatype.clone();
                Ok(Reduction::typed(or_variant(datatype)))
            }
            IdentifierSource::LocalVariable(stmt) => match &self.tree()[stmt].kind {
                StmtKind::Variable { datatype, .. } => Ok(Reduction::typed(or_variant(datatype.clone()))),
                _ => Err(CompilationError::internal("local variable source is not a variable", span)),
            },
            IdentifierSource::LocalConstant(stmt) => match &self.tree()[stmt].kind {
                StmtKind::Constant {
                    datatype,
                    initializer,
                    ..
                } => {
                    let datatype = datatype.clone();
                    Ok(match self.value_of(*initializer) {
                        Some(value) => Reduction::constant_typed(or_variant(datatype), value),
                        None => Reduction::typed(or_variant(datatype)),
                    })
                }
                _ => Err(CompilationError::internal("local constant source is not a constant", span)),
            },
            IdentifierSource::LocalIterator(stmt) => match &self.tree()[stmt].kind {
                StmtKind::For { iterator_type, .. } => {
                    Ok(Reduction::typed(or_variant(iterator_type.clone())))
                }
                _ => Err(CompilationError::internal("iterator source is not a for loop", span)),
            },
            IdentifierSource::LocalBind(pattern) => {
                Ok(Reduction::typed(or_variant(self.tree()[pattern].datatype.clone())))
            }
            IdentifierSource::MemberVariable(class, _)
            | IdentifierSource::MemberConstant(class, _)
            | IdentifierSource::MemberSignal(class, _) => {
                let owner = self.class_type(self.unit(), class);
                self.reduce_member_from_base(&owner, None, name, true, span)?
                    .ok_or_else(|| CompilationError::IdentifierNotFound {
                        name: name.to_string(),
                        span,
                    })
            }
            IdentifierSource::Undefined => self.reduce_global_identifier(name, span),
        }
    }

    /// Inside an enum body, the values of the same enum are in scope; one
    /// that is not resolved yet was declared later.
    fn reduce_current_enum_value(
        &mut self,
        name: &str,
        source: IdentifierSource,
        span: Span,
    ) -> Result<Option<Reduction>, CompilationError> {
        match self.ctx.current_enum {
            Some(CurrentEnum::Named { class, member }) => {
                let Member::Enum(e) = &self.tree()[class].members[member] else {
                    return Ok(None);
                };
                match e.values.iter().find(|v| v.name == name) {
                    Some(value) => match value.value {
                        Some(v) => Ok(Some(Reduction::constant(Variant::Int(v)))),
                        None => Err(CompilationError::EnumBeforeDeclared { span }),
                    },
                    None => Ok(None),
                }
            }
            Some(CurrentEnum::Unnamed { class, group }) => {
                let IdentifierSource::MemberConstant(owner, index) = source else {
                    return Ok(None);
                };
                if owner != class {
                    return Ok(None);
                }
                match &self.tree()[class].members[index] {
                    Member::EnumValue(v) if v.group == group && v.state != ResolutionState::Resolved => {
                        Err(CompilationError::EnumBeforeDeclared { span })
                    }
                    _ => Ok(None),
                }
            }
            None => Ok(None),
        }
    }

    /// Names the binder could not place: members of the current class and
    /// its bases, then builtin types, native classes, global classes,
    /// autoloads, global constants and global named values.
    fn reduce_global_identifier(
        &mut self,
        name: &str,
        span: Span,
    ) -> Result<Reduction, CompilationError> {
        let this = self.class_type(self.unit(), self.ctx.class);
        if let Some(found) = self.reduce_member_from_base(&this, None, name, true, span)? {
            return Ok(found);
        }

        if let Some(ty) = VariantType::from_name(name) {
            return Ok(Reduction::typed(DataType::builtin(ty).into_meta().with_constant(true)));
        }

        let oracle = self.oracle();
        let global = Binding::Global(name.to_string());
        if oracle.class_exists(name) {
            let datatype = DataType::native(name).into_meta().with_constant(true);
            return Ok(Reduction::typed(datatype).with_binding(global));
        }
        if let Some(path) = oracle.global_class_path(name) {
            let (unit, class) = self.script_head(&path).ok_or_else(|| {
                CompilationError::other(format!("Could not load global class \"{name}\" from \"{path}\"."), span)
            })?;
            let datatype = self.class_type(unit, class).into_meta().with_constant(true);
            return Ok(Reduction::typed(datatype).with_binding(global));
        }
        if let Some(path) = oracle.autoload(name) {
            let datatype = if path.ends_with(".gd") {
                match self.script_head(&path) {
                    Some((unit, class)) => self.class_type(unit, class),
                    None => DataType::native("Node"),
                }
            } else {
                DataType::native("Node")
            };
            return Ok(Reduction::typed(datatype).with_binding(global));
        }
        if let Some(value) = oracle.global_constant(name) {
            return Ok(Reduction::constant(value));
        }
        if let Some((_, value)) = GLOBAL_NAMED_VALUES.iter().find(|(n, _)| *n == name) {
            return Ok(Reduction::constant(Variant::Float(*value)));
        }
        if let Some(e) = self.host_enum("", name) {
            let value = e.to_dictionary();
            return Ok(Reduction::constant_typed(DataType::enum_value(e).into_meta(), value));
        }

        Err(CompilationError::IdentifierNotFound {
            name: name.to_string(),
            span,
        })
    }
}

fn or_variant(datatype: DataType) -> DataType {
    if datatype.is_set() { datatype } else { DataType::variant() }
}

#[cfg(test)]
mod tests {
    use gdscript_ast::{Binding, ExprId, MemoryLoader, ParseTree, TreeBuilder};
    use gdscript_core::{ClassId, Diagnostics, TypeKind, Variant, VariantType};
    use gdscript_registry::HostRegistry;

    use crate::CompilerOptions;
    use crate::analyzer::Analyzer;
    use crate::session::AnalysisSession;

    fn analyze_with(
        oracle: &HostRegistry,
        loader: &MemoryLoader,
        tree: ParseTree,
    ) -> (Vec<ParseTree>, Diagnostics) {
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(oracle, loader, &options);
        let unit = session.add_main(tree);
        Analyzer::new(&mut session, unit).analyze();
        session.into_parts()
    }

    /// `func f(): var v = <name>` for each name; returns the identifier ids.
    fn reading(names: &[&str]) -> (ParseTree, Vec<ExprId>) {
        let mut b = TreeBuilder::new("res://reader.gd");
        b.set_extends_names(ClassId::HEAD, &["Node"]);
        let mut ids = Vec::new();
        let mut body = Vec::new();
        for (i, name) in names.iter().enumerate() {
            let id = b.ident(name);
            ids.push(id);
            body.push(b.var_stmt(&format!("v{i}"), None, Some(id)));
        }
        b.function(ClassId::HEAD, "f", vec![], None, body);
        (b.finish(), ids)
    }

    #[test]
    fn global_named_values_fold() {
        let (tree, ids) = reading(&["PI", "INF"]);
        let (trees, diagnostics) =
            analyze_with(&HostRegistry::with_core_classes(), &MemoryLoader::new(), tree);
        assert!(!diagnostics.has_errors(), "{diagnostics}");
        assert_eq!(trees[0][ids[0]].reduced_value, Variant::Float(std::f64::consts::PI));
        assert_eq!(trees[0][ids[1]].reduced_value, Variant::Float(f64::INFINITY));
        assert!(trees[0][ids[0]].is_constant);
    }

    #[test]
    fn type_names_are_meta_types() {
        let (tree, ids) = reading(&["Vector2", "Node2D"]);
        let (trees, diagnostics) =
            analyze_with(&HostRegistry::with_core_classes(), &MemoryLoader::new(), tree);
        assert!(!diagnostics.has_errors(), "{diagnostics}");

        let builtin = &trees[0][ids[0]];
        assert!(builtin.datatype.is_meta_type);
        assert!(matches!(builtin.datatype.kind, TypeKind::Builtin(VariantType::Vector2)));
        assert!(matches!(builtin.binding, Binding::Unbound));

        let native = &trees[0][ids[1]];
        assert!(native.datatype.is_meta_type);
        assert!(matches!(&native.datatype.kind, TypeKind::Native(name) if name == "Node2D"));
        assert!(matches!(&native.binding, Binding::Global(name) if name == "Node2D"));
    }

    #[test]
    fn project_globals_follow_native_classes() {
        let mut oracle = HostRegistry::with_core_classes();
        oracle.register_global_class("Enemy", "res://enemy.gd").unwrap();
        oracle.register_autoload("Hud", "res://hud.tscn").unwrap();
        oracle.register_global_constant("MAX_LEVEL", Variant::Int(10)).unwrap();
        let mut loader = MemoryLoader::new();
        loader.add_script(TreeBuilder::new("res://enemy.gd").finish());

        let (tree, ids) = reading(&["Enemy", "Hud", "MAX_LEVEL"]);
        let (trees, diagnostics) = analyze_with(&oracle, &loader, tree);
        assert!(!diagnostics.has_errors(), "{diagnostics}");

        let enemy = &trees[0][ids[0]].datatype;
        assert!(enemy.is_meta_type);
        assert!(matches!(&enemy.kind, TypeKind::Class(class) if class.fqcn == "res://enemy.gd"));

        let hud = &trees[0][ids[1]].datatype;
        assert!(!hud.is_meta_type);
        assert!(matches!(&hud.kind, TypeKind::Native(name) if name == "Node"));

        assert_eq!(trees[0][ids[2]].reduced_value, Variant::Int(10));
    }

    #[test]
    fn unknown_names_are_errors() {
        let (tree, _) = reading(&["nowhere"]);
        let (_, diagnostics) =
            analyze_with(&HostRegistry::with_core_classes(), &MemoryLoader::new(), tree);
        assert_eq!(
            diagnostics.errors()[0].message,
            "Identifier \"nowhere\" not declared in the current scope."
        );
    }
}
