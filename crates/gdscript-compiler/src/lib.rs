//! GDScript Compiler
//!
//! Static type analysis and bytecode generation for GDScript parse trees.
//!
//! ## Architecture
//!
//! - **Analysis**: inheritance, member interfaces and function bodies are
//!   resolved in place on the parse tree; dependencies are loaded on demand
//!   through a per-compilation [`session::AnalysisSession`].
//! - **Code generation**: an analyzed tree is lowered to a
//!   [`bytecode::CompiledScript`], one function at a time.
//!
//! ## Modules
//!
//! - [`analyzer`]: type resolution, expression reduction and statement checks
//! - [`bytecode`]: addresses, instructions, constant pool and compiled records
//! - [`codegen`]: lowering of analyzed trees
//! - [`emit`]: instruction builder, jump patching and temporary stack
//! - [`session`]: trees, dependency cache and diagnostics of one compilation

pub mod analyzer;
pub mod bytecode;
pub mod codegen;
pub mod emit;
mod options;
pub mod session;

pub use analyzer::{Analyzer, Verdict, assignment_verdict, is_compatible, is_narrowing};
pub use bytecode::{CompiledClass, CompiledFunction, CompiledScript};
pub use codegen::CodeGenerator;
pub use options::{CompilerOptions, WarningSettings};
pub use session::{AnalysisSession, DependencyState};

// Re-export CompilationError from core for convenience
pub use gdscript_core::{CompilationError, Diagnostics};

use gdscript_ast::{ParseTree, ScriptLoader};
use gdscript_core::UnitId;
use gdscript_registry::HostTypeOracle;

/// Result of compiling one script.
#[derive(Debug)]
pub struct CompilationResult {
    /// Bytecode, when analysis and code generation both succeeded.
    pub script: Option<CompiledScript>,
    pub diagnostics: Diagnostics,
    /// Analyzed trees: the main script first, then its dependencies.
    pub trees: Vec<ParseTree>,
}

impl CompilationResult {
    /// Check if compilation succeeded (bytecode and no errors).
    pub fn is_success(&self) -> bool {
        self.script.is_some() && !self.diagnostics.has_errors()
    }

    /// Number of compiled functions across all classes; zero on failure.
    pub fn function_count(&self) -> usize {
        self.script.as_ref().map_or(0, |s| s.main.function_count())
    }

    /// The analyzed main script.
    pub fn main_tree(&self) -> Option<&ParseTree> {
        self.trees.first()
    }
}

/// The main compiler entry point.
///
/// Holds the host oracle and the script loader; every [`compile`](Self::compile)
/// call runs in its own session, so a compiler can be reused.
pub struct Compiler<'a> {
    oracle: &'a dyn HostTypeOracle,
    loader: &'a dyn ScriptLoader,
    options: CompilerOptions,
}

impl<'a> Compiler<'a> {
    pub fn new(oracle: &'a dyn HostTypeOracle, loader: &'a dyn ScriptLoader) -> Self {
        Self::with_options(oracle, loader, CompilerOptions::default())
    }

    pub fn with_options(
        oracle: &'a dyn HostTypeOracle,
        loader: &'a dyn ScriptLoader,
        options: CompilerOptions,
    ) -> Self {
        Self {
            oracle,
            loader,
            options,
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Analyze a tree without generating code.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn analyze(&self, tree: ParseTree) -> (Vec<ParseTree>, Diagnostics) {
        let (_, trees, diagnostics) = self.run_analysis(tree);
        (trees, diagnostics)
    }

    fn run_analysis(&self, tree: ParseTree) -> (UnitId, Vec<ParseTree>, Diagnostics) {
        let mut session = AnalysisSession::new(self.oracle, self.loader, &self.options);
        let unit = session.add_main(tree);
        Analyzer::new(&mut session, unit).analyze();
        let (trees, diagnostics) = session.into_parts();
        tracing::debug!(
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            units = trees.len(),
            "analysis finished"
        );
        (unit, trees, diagnostics)
    }

    /// Analyze a tree and, when it has no errors, generate its bytecode.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, tree: ParseTree) -> CompilationResult {
        let (unit, trees, mut diagnostics) = self.run_analysis(tree);
        let mut script = None;
        if !diagnostics.has_errors() {
            match CodeGenerator::new(&trees, unit, &self.options).generate() {
                Ok(compiled) => script = Some(compiled),
                Err(err) => {
                    diagnostics.push_error(&trees[unit.index() as usize].path, &err);
                }
            }
        }
        CompilationResult {
            script,
            diagnostics,
            trees,
        }
    }
}
