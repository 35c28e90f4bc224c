//! Per-compilation state shared by every analysis step.
//!
//! An [`AnalysisSession`] owns the parse trees of the main script and of
//! every dependency pulled in while resolving it, the dependency cache keyed
//! by canonical `res://` path, and the diagnostics sink. It lives for one
//! [`Compiler::compile`](crate::Compiler::compile) call.

use gdscript_ast::{LoadError, ParseTree, ScriptLoader};
use gdscript_core::{ClassId, CompilationError, Diagnostics, Span, UnitId, WarningCode};
use gdscript_registry::HostTypeOracle;
use rustc_hash::FxHashMap;

use crate::CompilerOptions;

/// Progress of a script dependency.
///
/// The entry is created before the dependency is resolved, so reaching a
/// script that is still `InProgress` means the dependency graph loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyState {
    InProgress(UnitId),
    Done(UnitId),
    Failed,
}

/// Trees, dependency cache and diagnostics of one compilation.
pub struct AnalysisSession<'a> {
    pub(crate) oracle: &'a dyn HostTypeOracle,
    pub(crate) loader: &'a dyn ScriptLoader,
    pub(crate) options: &'a CompilerOptions,
    pub(crate) trees: Vec<ParseTree>,
    cache: FxHashMap<String, DependencyState>,
    pub(crate) diagnostics: Diagnostics,
}

impl<'a> AnalysisSession<'a> {
    pub fn new(
        oracle: &'a dyn HostTypeOracle,
        loader: &'a dyn ScriptLoader,
        options: &'a CompilerOptions,
    ) -> Self {
        Self {
            oracle,
            loader,
            options,
            trees: Vec::new(),
            cache: FxHashMap::default(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Register the script being compiled. It counts as in progress until
    /// analysis finishes, so dependencies extending it are cycles.
    pub fn add_main(&mut self, tree: ParseTree) -> UnitId {
        let path = tree.path.clone();
        let unit = self.add_tree(tree);
        tracing::debug!(%path, %unit, "session: main script");
        self.cache.insert(path, DependencyState::InProgress(unit));
        unit
    }

    /// Store a tree and recompute the fully-qualified class names.
    fn add_tree(&mut self, mut tree: ParseTree) -> UnitId {
        let unit = UnitId::new(self.trees.len() as u32);
        let path = tree.path.clone();
        for index in 0..tree.classes.len() {
            let class = ClassId(index as u32);
            let fqcn = match tree[class].outer {
                None => path.clone(),
                Some(outer) => format!(
                    "{}::{}",
                    tree[outer].fqcn,
                    tree[class].identifier.as_deref().unwrap_or_default()
                ),
            };
            tree[class].fqcn = fqcn;
        }
        self.trees.push(tree);
        unit
    }

    pub fn tree(&self, unit: UnitId) -> &ParseTree {
        &self.trees[unit.index() as usize]
    }

    pub fn tree_mut(&mut self, unit: UnitId) -> &mut ParseTree {
        &mut self.trees[unit.index() as usize]
    }

    pub fn dependency(&self, path: &str) -> Option<DependencyState> {
        self.cache.get(path).copied()
    }

    /// Load a script that is not cached yet and mark it in progress.
    pub(crate) fn load_dependency(&mut self, path: &str) -> Result<UnitId, LoadError> {
        tracing::debug!(path, "dependency: cache MISS");
        match self.loader.load_script(path) {
            Ok(mut tree) => {
                tree.path = path.to_string();
                let unit = self.add_tree(tree);
                self.cache
                    .insert(path.to_string(), DependencyState::InProgress(unit));
                Ok(unit)
            }
            Err(err) => {
                tracing::warn!(path, %err, "dependency: load failed");
                self.cache.insert(path.to_string(), DependencyState::Failed);
                Err(err)
            }
        }
    }

    pub(crate) fn finish_dependency(&mut self, path: &str, unit: UnitId, resolved: bool) {
        let state = if resolved {
            DependencyState::Done(unit)
        } else {
            DependencyState::Failed
        };
        tracing::debug!(path, ?state, "dependency: finished");
        self.cache.insert(path.to_string(), state);
    }

    // ==========================================================================
    // Diagnostics
    // ==========================================================================

    pub(crate) fn error(&mut self, unit: UnitId, err: &CompilationError) {
        let path = &self.trees[unit.index() as usize].path;
        tracing::trace!(%path, %err, "error");
        self.diagnostics.push_error(path, err);
    }

    /// Record a warning, honoring the enabled set and warnings-as-errors.
    pub(crate) fn warn(&mut self, unit: UnitId, code: WarningCode, message: String, span: Span) {
        if !self.options.warnings.is_enabled(code) {
            return;
        }
        let path = &self.trees[unit.index() as usize].path;
        if self.options.warnings_as_errors {
            self.diagnostics
                .error(path, format!("{message} (Warning treated as error: {code})"), span);
        } else {
            self.diagnostics.push_warning(path, code, message, span);
        }
    }

    pub(crate) fn mark_unsafe(&mut self, unit: UnitId, line: u32) {
        let path = &self.trees[unit.index() as usize].path;
        self.diagnostics.mark_unsafe(path, line);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (Vec<ParseTree>, Diagnostics) {
        (self.trees, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdscript_ast::{MemoryLoader, TreeBuilder};
    use gdscript_registry::HostRegistry;

    #[test]
    fn fqcns_follow_nesting() {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);

        let mut b = TreeBuilder::new("res://main.gd");
        let inner = b.class(ClassId::HEAD, "Inner");
        let deeper = b.class(inner, "Deeper");
        let unit = session.add_main(b.finish());

        assert_eq!(session.tree(unit)[deeper].fqcn, "res://main.gd::Inner::Deeper");
        assert_eq!(
            session.dependency("res://main.gd"),
            Some(DependencyState::InProgress(unit))
        );
    }

    #[test]
    fn failed_loads_are_cached() {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default();
        let mut session = AnalysisSession::new(&oracle, &loader, &options);

        assert!(session.load_dependency("res://missing.gd").is_err());
        assert_eq!(session.dependency("res://missing.gd"), Some(DependencyState::Failed));
    }

    #[test]
    fn disabled_warnings_are_dropped() {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default().with_warning(WarningCode::IntegerDivision, false);
        let mut session = AnalysisSession::new(&oracle, &loader, &options);
        let unit = session.add_main(TreeBuilder::new("res://a.gd").finish());

        session.warn(unit, WarningCode::IntegerDivision, "dropped".into(), Span::point(1, 1));
        session.warn(unit, WarningCode::UnreachableCode, "kept".into(), Span::point(2, 1));
        assert_eq!(session.diagnostics().warning_count(), 1);
    }

    #[test]
    fn warnings_as_errors() {
        let oracle = HostRegistry::with_core_classes();
        let loader = MemoryLoader::new();
        let options = CompilerOptions::default().with_warnings_as_errors(true);
        let mut session = AnalysisSession::new(&oracle, &loader, &options);
        let unit = session.add_main(TreeBuilder::new("res://a.gd").finish());

        session.warn(unit, WarningCode::UnreachableCode, "Unreachable code.".into(), Span::point(3, 1));
        assert!(session.diagnostics().has_errors());
        assert!(!session.diagnostics().has_warnings());
    }
}
