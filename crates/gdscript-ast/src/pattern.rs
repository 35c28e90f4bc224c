//! `match` patterns.

use gdscript_core::{DataType, Span};

use crate::{ExprId, PatternId};

#[derive(Debug, Clone, PartialEq)]
pub enum PatternKind {
    /// A literal value; the expression is a literal node.
    Literal(ExprId),
    /// A constant expression such as `Kind.FIRE`.
    Expression(ExprId),
    /// `var name`
    Bind(String),
    /// `_`
    Wildcard,
    /// `[a, b, ..]`
    Array { elements: Vec<PatternId>, rest: bool },
    /// `{"key": pattern, ..}`
    Dictionary {
        entries: Vec<(ExprId, Option<PatternId>)>,
        rest: bool,
    },
}

#[derive(Debug, Clone)]
pub struct PatternNode {
    pub kind: PatternKind,
    pub span: Span,
    pub datatype: DataType,
}

impl PatternNode {
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Self {
            kind,
            span,
            datatype: DataType::unresolved(),
        }
    }
}
