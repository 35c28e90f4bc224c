//! Expression nodes.

use gdscript_core::{BinaryOp, ClassId, ClassRef, DataType, Span, UnaryOp, Variant, VariantType};

use crate::{ExprId, FunctionId, PatternId, StmtId, TypeRefId};

/// Where an identifier was declared, as classified by the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierSource {
    /// Not a local or own member; resolved by the analyzer's global cascade.
    #[default]
    Undefined,
    Parameter(FunctionId, usize),
    LocalVariable(StmtId),
    LocalConstant(StmtId),
    /// Loop variable of a `for` statement.
    LocalIterator(StmtId),
    /// Name bound by a `match` pattern.
    LocalBind(PatternId),
    /// Member of the enclosing class, by member position.
    MemberVariable(ClassId, usize),
    MemberConstant(ClassId, usize),
    MemberSignal(ClassId, usize),
}

impl IdentifierSource {
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            IdentifierSource::Parameter(..)
                | IdentifierSource::LocalVariable(_)
                | IdentifierSource::LocalConstant(_)
                | IdentifierSource::LocalIterator(_)
                | IdentifierSource::LocalBind(_)
        )
    }
}

/// What a name resolved to, recorded for code generation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Binding {
    #[default]
    Unbound,
    /// Variable declared by a user class (possibly a base class).
    MemberVariable {
        class: ClassRef,
        member: usize,
        index: u32,
        is_static: bool,
    },
    /// Property of a native class, read by name.
    NativeProperty(String),
    /// Method of the class or its bases.
    Method(String),
    Signal(String),
    /// Native class, autoload or `class_name` script, read as a global.
    Global(String),
    /// Builtin type constructor call.
    Constructor(VariantType),
    /// Global utility function call.
    Utility(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptIndex {
    /// `base.name`
    Attribute(String),
    /// `base[index]`
    Index(ExprId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Variant),
    Identifier {
        name: String,
        source: IdentifierSource,
    },
    SelfRef,
    Array(Vec<ExprId>),
    Dictionary(Vec<(ExprId, ExprId)>),
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Ternary {
        condition: ExprId,
        true_expr: ExprId,
        false_expr: ExprId,
    },
    /// `a = b`, or `a += b` when `op` is set.
    Assignment {
        op: Option<BinaryOp>,
        assignee: ExprId,
        value: ExprId,
    },
    /// `name(args)`, `base.name(args)` or `super.name(args)`.
    Call {
        base: Option<ExprId>,
        name: String,
        args: Vec<ExprId>,
        is_super: bool,
    },
    Subscript {
        base: ExprId,
        index: SubscriptIndex,
    },
    Await(ExprId),
    Preload {
        path: String,
    },
    /// `$Path` / `%Name`
    GetNode {
        path: String,
    },
    Cast {
        operand: ExprId,
        target: TypeRefId,
    },
    /// `operand is Type`
    TypeTest {
        operand: ExprId,
        target: TypeRefId,
    },
}

impl ExprKind {
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Literal(_) => "literal",
            ExprKind::Identifier { .. } => "identifier",
            ExprKind::SelfRef => "self",
            ExprKind::Array(_) => "array",
            ExprKind::Dictionary(_) => "dictionary",
            ExprKind::Binary { .. } => "binary operator",
            ExprKind::Unary { .. } => "unary operator",
            ExprKind::Ternary { .. } => "ternary operator",
            ExprKind::Assignment { .. } => "assignment",
            ExprKind::Call { .. } => "call",
            ExprKind::Subscript { .. } => "subscript",
            ExprKind::Await(_) => "await",
            ExprKind::Preload { .. } => "preload",
            ExprKind::GetNode { .. } => "get node",
            ExprKind::Cast { .. } => "cast",
            ExprKind::TypeTest { .. } => "type test",
        }
    }
}

/// An expression plus its analysis slots.
#[derive(Debug, Clone)]
pub struct ExprNode {
    pub kind: ExprKind,
    pub span: Span,
    pub datatype: DataType,
    /// Set once by the reducer; afterwards `datatype` never changes.
    pub reduced: bool,
    pub is_constant: bool,
    /// Folded value, meaningful when `is_constant` is set.
    pub reduced_value: Variant,
    pub is_unsafe: bool,
    pub binding: Binding,
}

impl ExprNode {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            datatype: DataType::unresolved(),
            reduced: false,
            is_constant: false,
            reduced_value: Variant::Nil,
            is_unsafe: false,
            binding: Binding::Unbound,
        }
    }

    pub fn constant_value(&self) -> Option<&Variant> {
        self.is_constant.then_some(&self.reduced_value)
    }
}
