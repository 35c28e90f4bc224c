//! The per-script node arenas.

use std::ops::{Index, IndexMut};

use gdscript_core::{ClassId, DataType, Span};

use crate::{
    ClassNode, ExprId, ExprNode, FunctionId, FunctionNode, Member, PatternId, PatternNode, StmtId,
    StmtNode, Suite, SuiteId, TypeRefId,
};

/// A written type annotation, `int` or `Outer.Inner`.
#[derive(Debug, Clone, Default)]
pub struct TypeRef {
    pub segments: Vec<String>,
    pub span: Span,
    /// Resolved type, filled in by the analyzer.
    pub datatype: DataType,
}

impl TypeRef {
    pub fn display(&self) -> String {
        self.segments.join(".")
    }
}

/// One parsed script. `classes[0]` is the head class.
#[derive(Debug, Clone, Default)]
pub struct ParseTree {
    /// Canonical `res://` path of the script.
    pub path: String,
    pub classes: Vec<ClassNode>,
    pub functions: Vec<FunctionNode>,
    pub suites: Vec<Suite>,
    pub stmts: Vec<StmtNode>,
    pub exprs: Vec<ExprNode>,
    pub patterns: Vec<PatternNode>,
    pub type_refs: Vec<TypeRef>,
}

impl ParseTree {
    pub fn head(&self) -> &ClassNode {
        &self[ClassId::HEAD]
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + use<> {
        (0..self.classes.len() as u32).map(ClassId)
    }

    pub fn function_ids(&self) -> impl Iterator<Item = FunctionId> + use<> {
        (0..self.functions.len() as u32).map(FunctionId)
    }

    /// Name a member is declared under.
    pub fn member_name<'a>(&'a self, member: &'a Member) -> &'a str {
        match member {
            Member::Variable(v) => &v.name,
            Member::Constant(c) => &c.name,
            Member::Signal(s) => &s.name,
            Member::Enum(e) => &e.name,
            Member::EnumValue(v) => &v.name,
            Member::Function(id) => &self[*id].name,
            Member::Class(id) => self[*id].identifier.as_deref().unwrap_or_default(),
        }
    }

    /// Source position of a member declaration.
    pub fn member_span(&self, member: &Member) -> Span {
        match member {
            Member::Variable(v) => v.span,
            Member::Constant(c) => c.span,
            Member::Signal(s) => s.span,
            Member::Enum(e) => e.span,
            Member::EnumValue(v) => v.span,
            Member::Function(id) => self[*id].span,
            Member::Class(id) => self[*id].span,
        }
    }

    /// The class and its lexically enclosing classes, innermost first.
    pub fn lexical_chain(&self, class: ClassId) -> Vec<ClassId> {
        let mut chain = vec![class];
        let mut current = self[class].outer;
        while let Some(outer) = current {
            chain.push(outer);
            current = self[outer].outer;
        }
        chain
    }

    /// Number of instance variables declared directly on a class.
    pub fn own_field_count(&self, class: ClassId) -> u32 {
        self[class]
            .members
            .iter()
            .filter(|m| matches!(m, Member::Variable(v) if !v.is_static))
            .count() as u32
    }
}

macro_rules! arena_index {
    ($id:ty, $node:ty, $field:ident) => {
        impl Index<$id> for ParseTree {
            type Output = $node;

            fn index(&self, id: $id) -> &$node {
                &self.$field[id.index()]
            }
        }

        impl IndexMut<$id> for ParseTree {
            fn index_mut(&mut self, id: $id) -> &mut $node {
                &mut self.$field[id.index()]
            }
        }
    };
}

arena_index!(ClassId, ClassNode, classes);
arena_index!(FunctionId, FunctionNode, functions);
arena_index!(SuiteId, Suite, suites);
arena_index!(StmtId, StmtNode, stmts);
arena_index!(ExprId, ExprNode, exprs);
arena_index!(PatternId, PatternNode, patterns);
arena_index!(TypeRefId, TypeRef, type_refs);
