//! Base class resolution and script dependencies.

use gdscript_ast::{InheritanceState, Member, canonicalize_path};
use gdscript_core::{ClassId, ClassRef, CompilationError, DataType, Span, TypeKind, UnitId};

use super::{Analyzer, class_chain};
use crate::session::DependencyState;

impl Analyzer<'_, '_> {
    /// Resolve the base class of `class`, and of its nested classes when
    /// `recursive` is set. Returns whether the class resolved.
    ///
    /// Idempotent: a resolved or failed class is not visited again.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_inheritance(&mut self, class: ClassId, recursive: bool) -> bool {
        let resolved = match self.tree()[class].inheritance_state {
            InheritanceState::Resolved => true,
            InheritanceState::Failed => false,
            // Reached again from inside its own resolution; the caller reports the cycle.
            InheritanceState::InProgress => return true,
            InheritanceState::NotStarted => self.resolve_base(class),
        };

        if recursive {
            let nested: Vec<ClassId> = self.tree()[class]
                .members
                .iter()
                .filter_map(|m| match m {
                    Member::Class(c) => Some(*c),
                    _ => None,
                })
                .collect();
            for nested in nested {
                self.resolve_inheritance(nested, true);
            }
        }
        resolved
    }

    fn resolve_base(&mut self, class: ClassId) -> bool {
        let unit = self.unit();
        let own = self.class_ref(unit, class);
        {
            let node = &mut self.tree_mut()[class];
            node.inheritance_state = InheritanceState::InProgress;
            node.datatype = DataType::class(own.clone());
        }

        let outcome = self.with_context(self.class_context(class, false), |a| a.find_base(class));
        let result = outcome.and_then(|base| {
            if let TypeKind::Class(base_ref) = &base.kind {
                let span = self.extends_span(class);
                if class_chain(self.trees(), base_ref).contains(&own) {
                    return Err(CompilationError::CyclicInheritance { span });
                }
            }
            Ok(base)
        });

        match result {
            Ok(base) => {
                tracing::trace!(fqcn = %own.fqcn, base = %base, "inheritance resolved");
                let node = &mut self.tree_mut()[class];
                node.base_type = base;
                node.inheritance_state = InheritanceState::Resolved;
                true
            }
            Err(err) => {
                tracing::debug!(fqcn = %own.fqcn, %err, "inheritance failed");
                self.error(&err);
                self.tree_mut()[class].inheritance_state = InheritanceState::Failed;
                false
            }
        }
    }

    fn extends_span(&self, class: ClassId) -> Span {
        let node = &self.tree()[class];
        node.extends.as_ref().map_or(node.span, |e| e.span)
    }

    fn find_base(&mut self, class: ClassId) -> Result<DataType, CompilationError> {
        let Some(extends) = self.tree()[class].extends.clone() else {
            return Ok(DataType::native(self.session.options.default_base.clone()));
        };
        let span = extends.span;

        let (mut current, rest) = match &extends.path {
            Some(path) => {
                let canonical = canonicalize_path(path, &self.tree().path);
                let unresolved = || CompilationError::SuperClassPathUnresolved {
                    path: path.clone(),
                    span,
                };
                if canonical == self.tree().path && class == ClassId::HEAD {
                    return Err(CompilationError::CyclicInheritance { span });
                }
                let unit = self.resolve_dependency(&canonical).ok_or_else(unresolved)?;
                let head = self.class_ref(unit, ClassId::HEAD);
                self.ensure_base_resolved(&head, span)
                    .map_err(|err| match err {
                        CompilationError::CyclicInheritance { .. } => err,
                        _ => unresolved(),
                    })?;
                (DataType::class(head), extends.segments.as_slice())
            }
            None => {
                let (first, rest) = extends.segments.split_first().ok_or_else(|| {
                    CompilationError::internal("extends clause without a base", span)
                })?;
                (self.lookup_base_name(class, first, span)?, rest)
            }
        };

        for segment in rest {
            current = self.nested_base(&current, segment, span)?;
        }
        Ok(current)
    }

    /// First `extends` segment: global class, autoload, native class, then
    /// classes visible from the lexically enclosing classes.
    fn lookup_base_name(
        &mut self,
        class: ClassId,
        name: &str,
        span: Span,
    ) -> Result<DataType, CompilationError> {
        let script_path = self
            .oracle()
            .global_class_path(name)
            .or_else(|| self.oracle().autoload(name).filter(|p| p.ends_with(".gd")));
        if let Some(path) = script_path {
            if path == self.tree().path {
                return Err(CompilationError::CyclicInheritance { span });
            }
            let unit = self
                .resolve_dependency(&path)
                .ok_or_else(|| CompilationError::SuperClassPathUnresolved {
                    path: path.clone(),
                    span,
                })?;
            let head = self.class_ref(unit, ClassId::HEAD);
            self.ensure_base_resolved(&head, span)?;
            return Ok(DataType::class(head));
        }

        if self.oracle().class_exists(name) {
            return Ok(DataType::native(name));
        }

        let unit = self.unit();
        let outers = self.tree().lexical_chain(class);
        for outer in outers.into_iter().skip(1) {
            let owner = self.class_ref(unit, outer);
            match self.nested_base(&DataType::class(owner), name, span) {
                Ok(found) => return Ok(found),
                Err(CompilationError::BaseClassNotFound { .. }) => {}
                Err(err) => return Err(err),
            }
        }
        Err(CompilationError::BaseClassNotFound {
            name: name.to_string(),
            span,
        })
    }

    /// A class nested in `owner` (or in one of its bases), usable as a base.
    fn nested_base(
        &mut self,
        owner: &DataType,
        name: &str,
        span: Span,
    ) -> Result<DataType, CompilationError> {
        let not_found = || CompilationError::BaseClassNotFound {
            name: name.to_string(),
            span,
        };
        let TypeKind::Class(owner) = &owner.kind else {
            return Err(not_found());
        };

        for class in self.class_chain_of(owner) {
            let Some((index, member)) = self.member_at(class.unit, class.class, name) else {
                continue;
            };
            let found = match member {
                Member::Class(nested) => self.class_ref(class.unit, nested),
                Member::Constant(_) => {
                    let ty = self.resolve_member_in(class.unit, class.class, index);
                    match ty.kind {
                        TypeKind::Class(r) if ty.is_meta_type => r,
                        TypeKind::Native(n) if ty.is_meta_type => return Ok(DataType::native(n)),
                        _ => return Err(not_found()),
                    }
                }
                _ => return Err(not_found()),
            };
            self.ensure_base_resolved(&found, span)?;
            return Ok(DataType::class(found));
        }
        Err(not_found())
    }

    fn ensure_base_resolved(&mut self, base: &ClassRef, span: Span) -> Result<(), CompilationError> {
        let state = self.session.tree(base.unit)[base.class].inheritance_state;
        let resolved = match state {
            InheritanceState::Resolved => true,
            InheritanceState::InProgress => {
                return Err(CompilationError::CyclicInheritance { span });
            }
            InheritanceState::Failed => false,
            InheritanceState::NotStarted => {
                self.in_unit(base.unit, |a| a.resolve_inheritance(base.class, false))
            }
        };
        if resolved {
            Ok(())
        } else {
            Err(CompilationError::other(
                format!("Could not resolve super class inheritance from \"{}\".", base.name),
                span,
            ))
        }
    }

    // ==========================================================================
    // Dependencies
    // ==========================================================================

    /// Load and resolve the inheritance of the script at a canonical path.
    ///
    /// Scripts still in progress are returned as they are so the caller can
    /// detect the cycle.
    pub(crate) fn resolve_dependency(&mut self, path: &str) -> Option<UnitId> {
        match self.session.dependency(path) {
            Some(DependencyState::Done(unit)) | Some(DependencyState::InProgress(unit)) => {
                tracing::debug!(path, %unit, "dependency: cache HIT");
                return Some(unit);
            }
            Some(DependencyState::Failed) => return None,
            None => {}
        }

        let unit = self.session.load_dependency(path).ok()?;
        let resolved = self.in_unit(unit, |a| a.resolve_inheritance(ClassId::HEAD, true));
        self.session.finish_dependency(path, unit, resolved);
        resolved.then_some(unit)
    }

    /// Unit and head class of the script at a path.
    pub(crate) fn script_head(&mut self, path: &str) -> Option<(UnitId, ClassId)> {
        let canonical = canonicalize_path(path, &self.tree().path);
        self.resolve_dependency(&canonical)
            .map(|unit| (unit, ClassId::HEAD))
    }
}

#[cfg(test)]
mod tests {
    use gdscript_ast::{InheritanceState, MemoryLoader, TreeBuilder};
    use gdscript_core::{ClassId, TypeKind};
    use gdscript_registry::HostRegistry;

    use crate::analyzer::Analyzer;
    use crate::session::AnalysisSession;
    use crate::CompilerOptions;

    #[test]
    fn default_base_is_ref_counted() {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);
        let unit = session.add_main(TreeBuilder::new("res://a.gd").finish());

        let mut analyzer = Analyzer::new(&mut session, unit);
        assert!(analyzer.resolve_inheritance(ClassId::HEAD, true));
        assert_eq!(
            session.tree(unit).head().base_type.kind,
            TypeKind::Native("RefCounted".into())
        );
    }

    #[test]
    fn path_extends_loads_the_dependency() {
        let oracle = HostRegistry::with_core_classes();
        let mut loader = MemoryLoader::new();
        let mut base = TreeBuilder::new("res://actors/base.gd");
        base.set_extends_names(ClassId::HEAD, &["Node2D"]);
        base.class(ClassId::HEAD, "Part");
        loader.add_script(base.finish());
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);

        let mut b = TreeBuilder::new("res://actors/player.gd");
        b.set_extends(ClassId::HEAD, Some("base.gd"), &["Part"]);
        let unit = session.add_main(b.finish());

        let mut analyzer = Analyzer::new(&mut session, unit);
        assert!(analyzer.resolve_inheritance(ClassId::HEAD, true));
        let base = &session.tree(unit).head().base_type;
        assert!(matches!(&base.kind, TypeKind::Class(r) if r.fqcn == "res://actors/base.gd::Part"));
        assert!(!session.diagnostics().has_errors());
    }

    #[test]
    fn nested_classes_extend_siblings() {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);

        let mut b = TreeBuilder::new("res://a.gd");
        let child = b.class(ClassId::HEAD, "Child");
        let parent = b.class(ClassId::HEAD, "Parent");
        b.set_extends_names(child, &["Parent"]);
        b.set_extends_names(parent, &["Node"]);
        let unit = session.add_main(b.finish());

        Analyzer::new(&mut session, unit).resolve_inheritance(ClassId::HEAD, true);
        let tree = session.tree(unit);
        assert!(matches!(&tree[child].base_type.kind, TypeKind::Class(r) if r.class == parent));
        assert_eq!(tree[parent].inheritance_state, InheritanceState::Resolved);
    }

    #[test]
    fn cycle_between_nested_classes() {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);

        let mut b = TreeBuilder::new("res://a.gd");
        let x = b.class(ClassId::HEAD, "X");
        let y = b.class(ClassId::HEAD, "Y");
        b.set_extends_names(x, &["Y"]);
        b.set_extends_names(y, &["X"]);
        let unit = session.add_main(b.finish());

        let mut analyzer = Analyzer::new(&mut session, unit);
        analyzer.resolve_inheritance(ClassId::HEAD, true);
        analyzer.resolve_inheritance(ClassId::HEAD, true);
        let diagnostics = session.diagnostics();
        assert!(diagnostics.errors().iter().any(|d| d.message == "Cyclic inheritance."));
        let count = diagnostics.error_count();
        assert_eq!(session.tree(unit)[x].inheritance_state, InheritanceState::Failed);
        assert_eq!(session.tree(unit)[y].inheritance_state, InheritanceState::Failed);
        assert_eq!(count, session.diagnostics().error_count());
    }

    #[test]
    fn unknown_base_name() {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);

        let mut b = TreeBuilder::new("res://a.gd");
        b.set_extends_names(ClassId::HEAD, &["Nowhere"]);
        let unit = session.add_main(b.finish());

        Analyzer::new(&mut session, unit).resolve_inheritance(ClassId::HEAD, true);
        assert_eq!(
            session.diagnostics().first_error().map(|e| e.0),
            Some("Could not find base class \"Nowhere\".")
        );
    }
}
