//! The read-only host query interface.

use gdscript_core::{ConstructorSignature, EvalError, Variant, VariantType};

use crate::{MethodInfo, PropertyInfo, UtilityInfo};

/// Everything the analyzer may ask about the engine and the project.
///
/// Lookups are synchronous and side-effect free, and answers must be stable
/// for the duration of one compilation session. Member lookups on classes
/// include inherited members.
pub trait HostTypeOracle {
    // ==========================================================================
    // Native classes
    // ==========================================================================

    fn class_exists(&self, class: &str) -> bool;

    /// Whether `derived` is `base` or inherits from it.
    fn is_parent_class(&self, derived: &str, base: &str) -> bool;

    fn parent_class(&self, class: &str) -> Option<String>;

    fn get_property_info(&self, class: &str, name: &str) -> Option<PropertyInfo>;

    fn get_method_info(&self, class: &str, name: &str) -> Option<MethodInfo>;

    fn get_signal_info(&self, class: &str, name: &str) -> Option<MethodInfo>;

    fn has_enum(&self, class: &str, name: &str) -> bool;

    fn get_enum_values(&self, class: &str, name: &str) -> Option<Vec<(String, i64)>>;

    fn get_integer_constant(&self, class: &str, name: &str) -> Option<i64>;

    /// Name of the enum an integer constant belongs to, if any.
    fn integer_constant_enum(&self, class: &str, name: &str) -> Option<String>;

    // ==========================================================================
    // Project globals
    // ==========================================================================

    /// Script path of a class registered with `class_name`.
    fn global_class_path(&self, name: &str) -> Option<String>;

    /// Resource path of an autoload singleton.
    fn autoload(&self, name: &str) -> Option<String>;

    fn global_constant(&self, name: &str) -> Option<Variant>;

    fn global_enum(&self, name: &str) -> Option<Vec<(String, i64)>>;

    // ==========================================================================
    // Builtin value types
    // ==========================================================================

    fn builtin_constructors(&self, ty: VariantType) -> &'static [ConstructorSignature] {
        gdscript_core::constructor_signatures(ty)
    }

    fn builtin_method(&self, ty: VariantType, name: &str) -> Option<MethodInfo> {
        crate::builtin_method(ty, name)
    }

    fn builtin_constant(&self, ty: VariantType, name: &str) -> Option<Variant> {
        crate::builtin_constant(ty, name)
    }

    fn utility_function(&self, name: &str) -> Option<UtilityInfo> {
        crate::utility_function(name)
    }

    /// Evaluate a pure utility function on constant arguments.
    fn call_utility(&self, name: &str, args: &[Variant]) -> Result<Variant, EvalError> {
        crate::call_utility(name, args)
    }
}
