//! GDScript parse tree.
//!
//! This crate provides:
//! - Arena-allocated parse tree nodes addressed by typed ids
//! - [`TreeBuilder`] for assembling trees
//! - The identifier binder, which classifies every identifier as a parameter,
//!   local, member or undefined name before analysis
//! - The [`ScriptLoader`] interface used to pull in dependency scripts and
//!   resources, with in-memory and project (disk backed) implementations
//!
//! Every node owns analysis slots (`datatype`, `reduced`, ...) that start
//! empty and are filled in place by the analyzer.
//!
//! # Example
//!
//! ```
//! use gdscript_ast::TreeBuilder;
//! use gdscript_core::ClassId;
//!
//! let mut b = TreeBuilder::new("res://player.gd");
//! b.set_extends_names(ClassId::HEAD, &["Node2D"]);
//! let hp = b.int(100);
//! b.variable(ClassId::HEAD, "health", None, Some(hp));
//! let tree = b.finish();
//!
//! assert_eq!(tree.head().members.len(), 1);
//! ```

pub mod binder;
mod builder;
pub mod class;
pub mod expr;
pub mod ids;
pub mod loader;
pub mod pattern;
pub mod stmt;
mod tree;

pub use builder::TreeBuilder;
pub use class::{
    ClassNode, ConstantMember, EnumMember, EnumValueDef, EnumValueMember, ExtendsClause,
    FunctionNode, InheritanceState, Member, Parameter, PropertyAccessor, ResolutionState,
    SignalMember, VariableMember,
};
pub use expr::{Binding, ExprKind, ExprNode, IdentifierSource, SubscriptIndex};
pub use ids::{ExprId, FunctionId, PatternId, StmtId, SuiteId, TypeRefId};
pub use loader::{
    LoadError, MemoryLoader, ParseFn, ProjectLoader, RES_PREFIX, ResourceInfo, ScriptLoader,
    canonicalize_path, resource_class_for,
};
pub use pattern::{PatternKind, PatternNode};
pub use stmt::{MatchBranch, StmtKind, StmtNode, Suite};
pub use tree::{ParseTree, TypeRef};
