//! HostRegistry - in-memory implementation of [`HostTypeOracle`].
//!
//! # Storage Model
//!
//! - **Native classes**: a [`ClassTree`] keyed by class name
//! - **Project globals**: `class_name` scripts, autoloads, global constants
//!   and global enums, each in its own map
//!
//! Builtin value type tables are static and shared by every registry.
//!
//! # Example
//!
//! ```
//! use gdscript_registry::{HostRegistry, HostTypeOracle};
//!
//! let mut registry = HostRegistry::with_core_classes();
//! registry.register_global_class("Player", "res://player.gd").unwrap();
//!
//! assert!(registry.is_parent_class("Node2D", "Node"));
//! assert_eq!(registry.global_class_path("Player").as_deref(), Some("res://player.gd"));
//! ```

use rustc_hash::FxHashMap;

use gdscript_core::Variant;

use crate::{ClassTree, HostTypeOracle, MethodInfo, NativeClass, PropertyInfo, RegistrationError};

/// Native classes plus project globals.
#[derive(Debug, Default)]
pub struct HostRegistry {
    classes: ClassTree,
    global_classes: FxHashMap<String, String>,
    autoloads: FxHashMap<String, String>,
    global_constants: FxHashMap<String, Variant>,
    global_enums: FxHashMap<String, Vec<(String, i64)>>,
}

impl HostRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the engine core classes, global enums and
    /// global constants registered.
    pub fn with_core_classes() -> Self {
        let mut registry = Self::new();
        let registered = crate::core_classes::register(&mut registry);
        debug_assert!(registered.is_ok(), "core class tables: {registered:?}");
        registry
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a native class. Its parent must be registered first.
    pub fn register_class(&mut self, class: NativeClass) -> Result<(), RegistrationError> {
        self.classes.insert(class).map(|_| ())
    }

    /// Register a `class_name` script.
    pub fn register_global_class(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        let path = path.into();
        if !path.ends_with(".gd") {
            return Err(RegistrationError::InvalidScriptPath { name, path });
        }
        if self.global_classes.contains_key(&name) || self.classes.contains(&name) {
            return Err(RegistrationError::DuplicateGlobal(name));
        }
        self.global_classes.insert(name, path);
        Ok(())
    }

    /// Register an autoload singleton backed by a script or scene.
    pub fn register_autoload(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        if self.autoloads.contains_key(&name) {
            return Err(RegistrationError::DuplicateGlobal(name));
        }
        self.autoloads.insert(name, path.into());
        Ok(())
    }

    pub fn register_global_constant(
        &mut self,
        name: impl Into<String>,
        value: Variant,
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        if self.global_constants.contains_key(&name) {
            return Err(RegistrationError::DuplicateGlobal(name));
        }
        self.global_constants.insert(name, value);
        Ok(())
    }

    /// Register a global enum. Its values also become global constants.
    pub fn register_global_enum(
        &mut self,
        name: impl Into<String>,
        values: &[(&str, i64)],
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        if self.global_enums.contains_key(&name) {
            return Err(RegistrationError::DuplicateGlobal(name));
        }
        for (value, number) in values {
            self.register_global_constant(*value, Variant::Int(*number))?;
        }
        self.global_enums.insert(
            name,
            values.iter().map(|(n, v)| (n.to_string(), *v)).collect(),
        );
        Ok(())
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &ClassTree {
        &self.classes
    }
}

impl HostTypeOracle for HostRegistry {
    fn class_exists(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn is_parent_class(&self, derived: &str, base: &str) -> bool {
        self.classes.inherits(derived, base)
    }

    fn parent_class(&self, class: &str) -> Option<String> {
        self.classes.parent_of(class).map(str::to_string)
    }

    fn get_property_info(&self, class: &str, name: &str) -> Option<PropertyInfo> {
        self.classes
            .find_map(class, |c| c.properties.get(name).cloned())
    }

    fn get_method_info(&self, class: &str, name: &str) -> Option<MethodInfo> {
        self.classes.find_map(class, |c| c.methods.get(name).cloned())
    }

    fn get_signal_info(&self, class: &str, name: &str) -> Option<MethodInfo> {
        self.classes.find_map(class, |c| c.signals.get(name).cloned())
    }

    fn has_enum(&self, class: &str, name: &str) -> bool {
        self.classes
            .find_map(class, |c| c.enums.get(name).map(|_| ()))
            .is_some()
    }

    fn get_enum_values(&self, class: &str, name: &str) -> Option<Vec<(String, i64)>> {
        self.classes.find_map(class, |c| c.enums.get(name).cloned())
    }

    fn get_integer_constant(&self, class: &str, name: &str) -> Option<i64> {
        self.classes.find_map(class, |c| c.constants.get(name).copied())
    }

    fn integer_constant_enum(&self, class: &str, name: &str) -> Option<String> {
        self.classes
            .find_map(class, |c| c.constant_enums.get(name).cloned())
    }

    fn global_class_path(&self, name: &str) -> Option<String> {
        self.global_classes.get(name).cloned()
    }

    fn autoload(&self, name: &str) -> Option<String> {
        self.autoloads.get(name).cloned()
    }

    fn global_constant(&self, name: &str) -> Option<Variant> {
        self.global_constants.get(name).cloned()
    }

    fn global_enum(&self, name: &str) -> Option<Vec<(String, i64)>> {
        self.global_enums.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HostType;
    use gdscript_core::VariantType;

    #[test]
    fn new_registry_is_empty() {
        let registry = HostRegistry::new();
        assert_eq!(registry.class_count(), 0);
        assert!(!registry.class_exists("Object"));
    }

    #[test]
    fn core_classes_are_registered() {
        let registry = HostRegistry::with_core_classes();
        for class in ["Object", "RefCounted", "Node", "Node2D", "Resource", "PackedScene"] {
            assert!(registry.class_exists(class), "{class} missing");
        }
        assert_eq!(registry.parent_class("RefCounted").as_deref(), Some("Object"));
    }

    #[test]
    fn members_are_inherited() {
        let registry = HostRegistry::with_core_classes();
        let prop = registry.get_property_info("Sprite2D", "position").unwrap();
        assert_eq!(prop.ty, HostType::Builtin(VariantType::Vector2));
        assert!(registry.get_method_info("Node2D", "get_node").is_some());
        assert!(registry.get_signal_info("Node2D", "ready").is_some());
        assert!(registry.get_method_info("RefCounted", "get_node").is_none());
    }

    #[test]
    fn native_enums_and_constants() {
        let registry = HostRegistry::with_core_classes();
        assert!(registry.has_enum("Node2D", "ProcessMode"));
        assert_eq!(registry.get_integer_constant("Node", "PROCESS_MODE_ALWAYS"), Some(3));
        assert_eq!(
            registry.integer_constant_enum("Node", "PROCESS_MODE_ALWAYS").as_deref(),
            Some("ProcessMode")
        );
        let values = registry.get_enum_values("Node", "ProcessMode").unwrap();
        assert_eq!(values[0], ("PROCESS_MODE_INHERIT".to_string(), 0));
    }

    #[test]
    fn project_globals() {
        let mut registry = HostRegistry::with_core_classes();
        registry.register_global_class("Enemy", "res://enemy.gd").unwrap();
        registry.register_autoload("Game", "res://game.gd").unwrap();
        assert_eq!(
            registry.register_global_class("Enemy", "res://other.gd"),
            Err(RegistrationError::DuplicateGlobal("Enemy".into()))
        );
        assert_eq!(
            registry.register_global_class("Node", "res://node.gd"),
            Err(RegistrationError::DuplicateGlobal("Node".into()))
        );
        assert!(matches!(
            registry.register_global_class("Level", "res://level.tscn"),
            Err(RegistrationError::InvalidScriptPath { .. })
        ));
        assert_eq!(registry.autoload("Game").as_deref(), Some("res://game.gd"));
        assert_eq!(registry.global_constant("OK"), Some(Variant::Int(0)));
        assert!(registry.global_enum("Error").is_some());
    }

    #[test]
    fn builtin_tables_are_reachable_through_the_oracle() {
        let registry = HostRegistry::new();
        assert!(!registry.builtin_constructors(VariantType::Vector2).is_empty());
        assert!(registry.builtin_method(VariantType::String, "length").is_some());
        assert!(registry.builtin_constant(VariantType::Vector2, "ZERO").is_some());
        assert!(registry.utility_function("abs").is_some());
    }
}
