//! Class Tree - native class storage and inheritance.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: `NativeClass` (members declared directly on that class)
//! - Edges: `Inherits` from a class to its direct parent

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

use crate::{MethodInfo, PropertyInfo, RegistrationError};

/// Edge types in the class graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassEdge {
    /// Child class inherits the target class.
    Inherits,
}

/// Members declared directly on one native class.
#[derive(Debug, Clone, Default)]
pub struct NativeClass {
    pub name: String,
    /// Name of the direct parent; `None` only for the root class.
    pub parent: Option<String>,
    pub properties: FxHashMap<String, PropertyInfo>,
    pub methods: FxHashMap<String, MethodInfo>,
    pub signals: FxHashMap<String, MethodInfo>,
    /// Enum name -> values in declaration order.
    pub enums: FxHashMap<String, Vec<(String, i64)>>,
    pub constants: FxHashMap<String, i64>,
    /// Constant name -> owning enum name.
    pub constant_enums: FxHashMap<String, String>,
}

impl NativeClass {
    pub fn new(name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, property: PropertyInfo) -> Self {
        self.properties.insert(property.name.clone(), property);
        self
    }

    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.insert(method.name.clone(), method);
        self
    }

    pub fn with_signal(mut self, signal: MethodInfo) -> Self {
        self.signals.insert(signal.name.clone(), signal);
        self
    }

    /// Add an enum. Its values also become integer constants of the class.
    pub fn with_enum(mut self, name: &str, values: &[(&str, i64)]) -> Self {
        for (value, number) in values {
            self.constants.insert(value.to_string(), *number);
            self.constant_enums
                .insert(value.to_string(), name.to_string());
        }
        self.enums.insert(
            name.to_string(),
            values.iter().map(|(n, v)| (n.to_string(), *v)).collect(),
        );
        self
    }

    pub fn with_constant(mut self, name: &str, value: i64) -> Self {
        self.constants.insert(name.to_string(), value);
        self
    }
}

/// The native class hierarchy.
#[derive(Debug, Default)]
pub struct ClassTree {
    graph: DiGraph<NativeClass, ClassEdge>,
    by_name: FxHashMap<String, NodeIndex>,
}

impl ClassTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Add a class. Its parent must already be registered.
    pub fn insert(&mut self, class: NativeClass) -> Result<NodeIndex, RegistrationError> {
        if self.by_name.contains_key(&class.name) {
            return Err(RegistrationError::DuplicateClass(class.name));
        }
        let parent = match &class.parent {
            Some(parent) => Some(*self.by_name.get(parent).ok_or_else(|| {
                RegistrationError::UnknownParent {
                    class: class.name.clone(),
                    parent: parent.clone(),
                }
            })?),
            None => None,
        };

        let name = class.name.clone();
        let node = self.graph.add_node(class);
        if let Some(parent) = parent {
            self.graph.add_edge(node, parent, ClassEdge::Inherits);
        }
        self.by_name.insert(name, node);
        Ok(node)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&NativeClass> {
        self.by_name
            .get(name)
            .and_then(|node| self.graph.node_weight(*node))
    }

    fn parent_node(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges(node)
            .find(|edge| *edge.weight() == ClassEdge::Inherits)
            .map(|edge| edge.target())
    }

    pub fn parent_of(&self, name: &str) -> Option<&str> {
        let node = self.by_name.get(name)?;
        let parent = self.parent_node(*node)?;
        self.graph.node_weight(parent).map(|c| c.name.as_str())
    }

    /// The class followed by all its ancestors, nearest first.
    pub fn ancestry(&self, name: &str) -> Vec<&NativeClass> {
        let mut chain = Vec::new();
        let mut current = self.by_name.get(name).copied();
        while let Some(node) = current {
            if let Some(class) = self.graph.node_weight(node) {
                chain.push(class);
            }
            current = self.parent_node(node);
        }
        chain
    }

    pub fn inherits(&self, derived: &str, base: &str) -> bool {
        self.ancestry(derived).iter().any(|c| c.name == base)
    }

    /// First ancestor-or-self for which `f` returns a value.
    pub fn find_map<'a, T>(&'a self, name: &str, f: impl Fn(&'a NativeClass) -> Option<T>) -> Option<T> {
        self.ancestry(name).into_iter().find_map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdscript_core::VariantType;

    fn tree() -> ClassTree {
        let mut tree = ClassTree::new();
        tree.insert(NativeClass::new("Object", None)).unwrap();
        tree.insert(
            NativeClass::new("Node", Some("Object"))
                .with_property(PropertyInfo::new("name", VariantType::StringName))
                .with_enum("ProcessMode", &[("PROCESS_MODE_INHERIT", 0), ("PROCESS_MODE_ALWAYS", 3)]),
        )
        .unwrap();
        tree.insert(NativeClass::new("Node2D", Some("Node"))).unwrap();
        tree
    }

    #[test]
    fn ancestry_is_nearest_first() {
        let tree = tree();
        let names: Vec<_> = tree.ancestry("Node2D").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Node2D", "Node", "Object"]);
        assert_eq!(tree.parent_of("Node2D"), Some("Node"));
        assert_eq!(tree.parent_of("Object"), None);
    }

    #[test]
    fn inherits_includes_self() {
        let tree = tree();
        assert!(tree.inherits("Node2D", "Object"));
        assert!(tree.inherits("Node", "Node"));
        assert!(!tree.inherits("Node", "Node2D"));
    }

    #[test]
    fn enum_values_become_constants() {
        let tree = tree();
        let node = tree.get("Node").unwrap();
        assert_eq!(node.constants.get("PROCESS_MODE_ALWAYS"), Some(&3));
        assert_eq!(
            node.constant_enums.get("PROCESS_MODE_ALWAYS").map(String::as_str),
            Some("ProcessMode")
        );
    }

    #[test]
    fn rejects_unknown_parent_and_duplicates() {
        let mut tree = tree();
        assert_eq!(
            tree.insert(NativeClass::new("Sprite2D", Some("Missing"))),
            Err(RegistrationError::UnknownParent {
                class: "Sprite2D".into(),
                parent: "Missing".into()
            })
        );
        assert_eq!(
            tree.insert(NativeClass::new("Node", Some("Object"))),
            Err(RegistrationError::DuplicateClass("Node".into()))
        );
    }

    #[test]
    fn find_map_walks_ancestors() {
        let tree = tree();
        let found = tree.find_map("Node2D", |c| c.properties.get("name").cloned());
        assert!(found.is_some());
    }
}
