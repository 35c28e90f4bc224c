//! Class, member and function declarations.

use rustc_hash::FxHashMap;

use gdscript_core::{ClassId, DataType, Span, Variant};

use crate::{ExprId, FunctionId, SuiteId, TypeRefId};

/// Progress of inheritance resolution for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InheritanceState {
    #[default]
    NotStarted,
    InProgress,
    Resolved,
    Failed,
}

/// Progress of a lazily resolved declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionState {
    #[default]
    Unresolved,
    /// Being resolved; reaching it again is a cyclic reference.
    Resolving,
    Resolved,
}

/// `extends "res://base.gd".Inner` or `extends Node2D`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtendsClause {
    pub path: Option<String>,
    /// Dotted name segments after the path, or the whole name chain.
    pub segments: Vec<String>,
    pub span: Span,
}

/// One class, either the head class of a script or a nested `class`.
#[derive(Debug, Clone, Default)]
pub struct ClassNode {
    /// `None` for the head class.
    pub identifier: Option<String>,
    /// Global name from `class_name`.
    pub class_name: Option<String>,
    pub extends: Option<ExtendsClause>,
    pub members: Vec<Member>,
    /// Member name -> position in `members`.
    pub member_index: FxHashMap<String, usize>,
    /// Lexically enclosing class.
    pub outer: Option<ClassId>,
    pub span: Span,

    pub datatype: DataType,
    pub base_type: DataType,
    /// `res://path.gd` for the head class, `outer::Name` for nested ones.
    pub fqcn: String,
    pub inheritance_state: InheritanceState,
    pub interface_resolved: bool,
    pub body_resolved: bool,
}

impl ClassNode {
    pub fn member(&self, name: &str) -> Option<(usize, &Member)> {
        let index = *self.member_index.get(name)?;
        self.members.get(index).map(|m| (index, m))
    }

    /// Identifier of the class, or the class name for the head class.
    pub fn display_name(&self) -> &str {
        self.identifier
            .as_deref()
            .or(self.class_name.as_deref())
            .unwrap_or(&self.fqcn)
    }
}

/// How a member variable is read and written.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropertyAccessor {
    #[default]
    None,
    /// `set = set_x, get = get_x`, naming member functions.
    External {
        setter: Option<String>,
        getter: Option<String>,
    },
    /// `set(value): ...` / `get: ...` bodies, stored as synthetic functions.
    Inline {
        setter: Option<FunctionId>,
        getter: Option<FunctionId>,
    },
}

impl PropertyAccessor {
    pub fn is_none(&self) -> bool {
        matches!(self, PropertyAccessor::None)
    }
}

/// A member of a class.
#[derive(Debug, Clone)]
pub enum Member {
    Variable(VariableMember),
    Constant(ConstantMember),
    Signal(SignalMember),
    Enum(EnumMember),
    /// Value of an unnamed enum, a class-level integer constant.
    EnumValue(EnumValueMember),
    Function(FunctionId),
    Class(ClassId),
}

impl Member {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Member::Variable(_) => "variable",
            Member::Constant(_) => "constant",
            Member::Signal(_) => "signal",
            Member::Enum(_) => "enum",
            Member::EnumValue(_) => "enum value",
            Member::Function(_) => "function",
            Member::Class(_) => "class",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VariableMember {
    pub name: String,
    pub span: Span,
    pub type_ref: Option<TypeRefId>,
    pub initializer: Option<ExprId>,
    /// Declared with `:=`.
    pub infer: bool,
    pub is_static: bool,
    pub is_export: bool,
    pub accessor: PropertyAccessor,
    pub datatype: DataType,
    pub state: ResolutionState,
    /// Field slot for instance variables, static slot for static ones.
    /// Assigned during interface resolution.
    pub index: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ConstantMember {
    pub name: String,
    pub span: Span,
    pub type_ref: Option<TypeRefId>,
    pub initializer: Option<ExprId>,
    pub infer: bool,
    pub datatype: DataType,
    pub value: Variant,
    pub state: ResolutionState,
}

#[derive(Debug, Clone, Default)]
pub struct SignalMember {
    pub name: String,
    pub span: Span,
    pub params: Vec<Parameter>,
    pub datatype: DataType,
    pub state: ResolutionState,
}

/// One value of a named enum.
#[derive(Debug, Clone, Default)]
pub struct EnumValueDef {
    pub name: String,
    pub span: Span,
    pub expr: Option<ExprId>,
    pub value: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct EnumMember {
    pub name: String,
    pub span: Span,
    pub values: Vec<EnumValueDef>,
    pub datatype: DataType,
    pub state: ResolutionState,
}

#[derive(Debug, Clone, Default)]
pub struct EnumValueMember {
    pub name: String,
    pub span: Span,
    pub expr: Option<ExprId>,
    /// The unnamed enum block this value belongs to.
    pub group: u32,
    /// Preceding value in the same block, for auto-increment.
    pub previous: Option<String>,
    pub value: Option<i64>,
    pub datatype: DataType,
    pub state: ResolutionState,
}

/// A function or signal parameter.
#[derive(Debug, Clone, Default)]
pub struct Parameter {
    pub name: String,
    pub span: Span,
    pub type_ref: Option<TypeRefId>,
    pub default: Option<ExprId>,
    pub infer: bool,
    pub datatype: DataType,
}

#[derive(Debug, Clone, Default)]
pub struct FunctionNode {
    pub name: String,
    pub span: Span,
    /// Declaring class.
    pub class: ClassId,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeRefId>,
    pub body: SuiteId,
    pub is_static: bool,
    /// Member variable this function is an inline accessor of.
    pub accessor_of: Option<String>,

    /// Return type; unannotated functions infer it from the body.
    pub datatype: DataType,
    pub is_coroutine: bool,
    pub signature_state: ResolutionState,
    pub body_state: ResolutionState,
}

impl FunctionNode {
    pub fn default_count(&self) -> usize {
        self.params.iter().filter(|p| p.default.is_some()).count()
    }

    pub fn required_count(&self) -> usize {
        self.params.len() - self.default_count()
    }
}
