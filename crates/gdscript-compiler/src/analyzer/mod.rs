//! Static analysis of parse trees.
//!
//! The [`Analyzer`] fills in the analysis slots of a tree in three steps:
//!
//! 1. **Inheritance**: base classes of every class, loading `extends`
//!    dependencies through the session cache.
//! 2. **Interface**: member types, constant values, enum values and
//!    function signatures. Members resolve lazily, so a member used before
//!    its declaration is resolved on first use.
//! 3. **Bodies**: every function body, statement by statement.
//!
//! Errors are recorded in the session's diagnostics and never abort the pass;
//! the failing node degrades to `Variant`.

mod compat;
mod expr;
mod inheritance;
mod lookup;
mod members;
mod stmt;
mod types;

pub use compat::{Verdict, assignment_verdict, is_compatible, is_narrowing};
pub(crate) use compat::class_chain;

use gdscript_ast::{FunctionId, Member, ParseTree};
use gdscript_core::{ClassId, ClassRef, CompilationError, DataType, Span, UnitId, WarningCode};
use gdscript_registry::HostTypeOracle;

use crate::session::AnalysisSession;

/// The enum whose values are being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CurrentEnum {
    Named { class: ClassId, member: usize },
    Unnamed { class: ClassId, group: u32 },
}

/// Where in the tree the analyzer currently is.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolveContext {
    pub class: ClassId,
    pub function: Option<FunctionId>,
    pub is_static: bool,
    pub current_enum: Option<CurrentEnum>,
    pub loop_depth: u32,
}

/// Resolves one compilation unit, pulling in others on demand.
pub struct Analyzer<'s, 'a> {
    session: &'s mut AnalysisSession<'a>,
    unit: UnitId,
    ctx: ResolveContext,
}

impl<'s, 'a> Analyzer<'s, 'a> {
    pub fn new(session: &'s mut AnalysisSession<'a>, unit: UnitId) -> Self {
        Self {
            session,
            unit,
            ctx: ResolveContext::default(),
        }
    }

    /// Run all three steps on the unit.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn analyze(&mut self) {
        tracing::debug!(path = %self.tree().path, "analyze");
        self.resolve_inheritance(ClassId::HEAD, true);
        self.resolve_interface(ClassId::HEAD);
        self.resolve_class_bodies(ClassId::HEAD);
    }

    /// Resolve every function body of a class and its nested classes.
    pub fn resolve_class_bodies(&mut self, class: ClassId) {
        if self.tree()[class].body_resolved {
            return;
        }
        self.tree_mut()[class].body_resolved = true;

        let functions: Vec<FunctionId> = self
            .tree()
            .function_ids()
            .filter(|f| self.tree()[*f].class == class)
            .collect();
        for function in functions {
            self.resolve_function_body(function);
        }

        let nested: Vec<ClassId> = self
            .tree()[class]
            .members
            .iter()
            .filter_map(|m| match m {
                Member::Class(c) => Some(*c),
                _ => None,
            })
            .collect();
        for class in nested {
            self.resolve_class_bodies(class);
        }
    }

    // ==========================================================================
    // Context
    // ==========================================================================

    /// Run `f` with another unit as the current one.
    pub(crate) fn in_unit<R>(&mut self, unit: UnitId, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved_unit = std::mem::replace(&mut self.unit, unit);
        let saved_ctx = std::mem::take(&mut self.ctx);
        let result = f(self);
        self.unit = saved_unit;
        self.ctx = saved_ctx;
        result
    }

    /// Run `f` with a different resolve context in the current unit.
    pub(crate) fn with_context<R>(
        &mut self,
        ctx: ResolveContext,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = std::mem::replace(&mut self.ctx, ctx);
        let result = f(self);
        self.ctx = saved;
        result
    }

    /// Context for code that belongs to a class but no function.
    pub(crate) fn class_context(&self, class: ClassId, is_static: bool) -> ResolveContext {
        ResolveContext {
            class,
            is_static,
            ..ResolveContext::default()
        }
    }

    pub(crate) fn tree(&self) -> &ParseTree {
        self.session.tree(self.unit)
    }

    pub(crate) fn tree_mut(&mut self) -> &mut ParseTree {
        self.session.tree_mut(self.unit)
    }

    pub(crate) fn trees(&self) -> &[ParseTree] {
        &self.session.trees
    }

    pub(crate) fn oracle(&self) -> &'a dyn HostTypeOracle {
        self.session.oracle
    }

    pub(crate) fn unit(&self) -> UnitId {
        self.unit
    }

    // ==========================================================================
    // Diagnostics
    // ==========================================================================

    pub(crate) fn error(&mut self, err: &CompilationError) {
        self.session.error(self.unit, err);
    }

    pub(crate) fn warn(&mut self, code: WarningCode, message: impl Into<String>, span: Span) {
        self.session.warn(self.unit, code, message.into(), span);
    }

    pub(crate) fn mark_unsafe(&mut self, span: Span) {
        self.session.mark_unsafe(self.unit, span.line);
    }

    pub(crate) fn error_count(&self) -> usize {
        self.session.diagnostics.error_count()
    }

    // ==========================================================================
    // Class types
    // ==========================================================================

    pub(crate) fn class_ref(&self, unit: UnitId, class: ClassId) -> ClassRef {
        let node = &self.session.tree(unit)[class];
        ClassRef::new(unit, class, node.fqcn.clone(), node.display_name())
    }

    /// Instance type of a user class.
    pub(crate) fn class_type(&self, unit: UnitId, class: ClassId) -> DataType {
        DataType::class(self.class_ref(unit, class))
    }

    pub(crate) fn current_class_type(&self) -> DataType {
        self.class_type(self.unit, self.ctx.class)
    }

    pub(crate) fn compatible(&self, target: &DataType, source: &DataType, allow_implicit: bool) -> bool {
        is_compatible(self.oracle(), self.trees(), target, source, allow_implicit)
    }

    pub(crate) fn verdict(&self, target: &DataType, source: &DataType) -> Verdict {
        assignment_verdict(self.oracle(), self.trees(), target, source)
    }
}

#[cfg(test)]
mod tests {
    use gdscript_ast::{MemoryLoader, ParseTree, TreeBuilder};
    use gdscript_core::{ClassId, Diagnostics};
    use gdscript_registry::HostRegistry;

    use super::Analyzer;
    use crate::CompilerOptions;
    use crate::session::AnalysisSession;

    fn analyze_with(loader: &MemoryLoader, tree: ParseTree) -> (Vec<ParseTree>, Diagnostics) {
        let oracle = HostRegistry::with_core_classes();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, loader, &options);
        let unit = session.add_main(tree);
        Analyzer::new(&mut session, unit).analyze();
        session.into_parts()
    }

    fn extends_path(path: &str, base: &str) -> ParseTree {
        let mut b = TreeBuilder::new(path);
        b.set_extends_path(ClassId::HEAD, base);
        b.finish()
    }

    #[test]
    fn missing_super_class_path() {
        let loader = MemoryLoader::new();
        let (_, diagnostics) = analyze_with(&loader, extends_path("res://main.gd", "res://missing.file"));
        assert_eq!(
            diagnostics.errors()[0].message,
            "Could not resolve super class path \"res://missing.file\"."
        );
    }

    #[test]
    fn inheritance_cycle_through_three_scripts() {
        let mut loader = MemoryLoader::new();
        loader.add_script(extends_path("res://b.gd", "res://c.gd"));
        loader.add_script(extends_path("res://c.gd", "res://a.gd"));
        let (_, diagnostics) = analyze_with(&loader, extends_path("res://a.gd", "res://b.gd"));
        assert!(
            diagnostics.errors().iter().any(|d| d.message == "Cyclic inheritance."),
            "{diagnostics}"
        );
    }

    #[test]
    fn analyzing_twice_changes_nothing() {
        let mut b = TreeBuilder::new("res://twice.gd");
        let int = b.type_ref(&["int"]);
        let missing = b.ident("missing");
        b.variable(ClassId::HEAD, "v", Some(int), Some(missing));
        let pass = b.pass();
        let int = b.type_ref(&["int"]);
        b.function(ClassId::HEAD, "f", vec![], Some(int), vec![pass]);

        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);
        let unit = session.add_main(b.finish());
        let mut analyzer = Analyzer::new(&mut session, unit);
        analyzer.analyze();
        let first = session.diagnostics().to_string();
        let mut analyzer = Analyzer::new(&mut session, unit);
        analyzer.analyze();
        assert_eq!(session.diagnostics().to_string(), first);
        assert_eq!(session.diagnostics().error_count(), 2);
    }
}
