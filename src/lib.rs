//! GDScript static analysis and bytecode compilation.
//!
//! This crate re-exports the workspace crates behind one facade:
//!
//! - [`core`]: types, host values, errors and diagnostics
//! - [`registry`]: the host type oracle and its in-memory registry
//! - [`ast`]: parse trees, the tree builder and script loaders
//! - [`compiler`]: the analyzer, the code generator and [`Compiler`]
//!
//! # Example
//!
//! ```
//! use gdscript::prelude::*;
//!
//! let oracle = HostRegistry::with_core_classes();
//! let loader = MemoryLoader::new();
//!
//! let mut b = TreeBuilder::new("res://player.gd");
//! b.set_extends_names(ClassId::HEAD, &["Node"]);
//! let hp = b.int(100);
//! b.variable(ClassId::HEAD, "hp", None, Some(hp));
//!
//! let result = Compiler::new(&oracle, &loader).compile(b.finish());
//! assert!(result.is_success());
//! assert_eq!(result.script.unwrap().main.fields, vec!["hp".to_string()]);
//! ```

pub use gdscript_ast as ast;
pub use gdscript_compiler as compiler;
pub use gdscript_core as core;
pub use gdscript_registry as registry;

pub use gdscript_compiler::{
    CompilationResult, Compiler, CompilerOptions, CompiledClass, CompiledFunction, CompiledScript,
    WarningSettings,
};
pub use gdscript_core::{CompilationError, Diagnostics};

// Re-export main types
pub mod prelude {
    pub use gdscript_ast::{
        MemoryLoader, ParseTree, ProjectLoader, ScriptLoader, TreeBuilder, canonicalize_path,
    };
    pub use gdscript_compiler::bytecode::{Address, Instruction, OpCode};
    pub use gdscript_compiler::{
        CompilationResult, Compiler, CompilerOptions, CompiledClass, CompiledFunction,
        CompiledScript, WarningSettings,
    };
    pub use gdscript_core::{
        BinaryOp, ClassId, CompilationError, DataType, Diagnostic, Diagnostics, Span, UnaryOp,
        Variant, VariantType, WarningCode,
    };
    pub use gdscript_registry::{HostRegistry, HostTypeOracle};
}
