//! GDScript host registry.
//!
//! The analyzer never talks to a running engine. Everything it needs to know
//! about engine classes, builtin value types and project-level globals is
//! answered through the read-only [`HostTypeOracle`] trait. [`HostRegistry`]
//! is the in-memory implementation, seeded with the engine core classes by
//! [`HostRegistry::with_core_classes`].

mod builtins;
mod class_tree;
mod core_classes;
mod error;
mod info;
mod oracle;
mod registry;
mod utility;

pub use builtins::{builtin_constant, builtin_method};
pub use class_tree::{ClassEdge, ClassTree, NativeClass};
pub use error::RegistrationError;
pub use info::{HostType, MethodFlags, MethodInfo, ParamInfo, PropertyInfo, UtilityInfo};
pub use oracle::HostTypeOracle;
pub use registry::HostRegistry;
pub use utility::{MAX_FOLDED_RANGE, call_utility, utility_function};
