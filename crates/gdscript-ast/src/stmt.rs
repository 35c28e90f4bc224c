//! Statements and suites.

use gdscript_core::{DataType, Span};

use crate::{ExprId, PatternId, StmtId, SuiteId, TypeRefId};

/// One `match` branch: `pattern, pattern when guard: body`.
#[derive(Debug, Clone)]
pub struct MatchBranch {
    pub patterns: Vec<PatternId>,
    pub guard: Option<ExprId>,
    pub body: SuiteId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Expression(ExprId),
    /// Local `var`.
    Variable {
        name: String,
        type_ref: Option<TypeRefId>,
        initializer: Option<ExprId>,
        infer: bool,
        /// Declared type. Soft types follow the last assigned value.
        datatype: DataType,
    },
    /// Local `const`.
    Constant {
        name: String,
        type_ref: Option<TypeRefId>,
        initializer: ExprId,
        datatype: DataType,
    },
    /// `elif` is a nested `If` alone in the false suite.
    If {
        condition: ExprId,
        true_suite: SuiteId,
        false_suite: Option<SuiteId>,
    },
    While {
        condition: ExprId,
        body: SuiteId,
    },
    For {
        variable: String,
        type_ref: Option<TypeRefId>,
        iterable: ExprId,
        body: SuiteId,
        iterator_type: DataType,
    },
    Match {
        subject: ExprId,
        branches: Vec<MatchBranch>,
    },
    Return(Option<ExprId>),
    Break,
    Continue,
    Pass,
    Assert {
        condition: ExprId,
        message: Option<ExprId>,
    },
    Breakpoint,
}

#[derive(Debug, Clone)]
pub struct StmtNode {
    pub kind: StmtKind,
    pub span: Span,
    /// Type produced by control-flow statements, for suite inference.
    pub datatype: DataType,
}

impl StmtNode {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self {
            kind,
            span,
            datatype: DataType::unresolved(),
        }
    }

    /// Statements whose type feeds the enclosing suite's inferred type.
    pub fn is_control_flow(&self) -> bool {
        matches!(
            self.kind,
            StmtKind::If { .. }
                | StmtKind::For { .. }
                | StmtKind::While { .. }
                | StmtKind::Match { .. }
                | StmtKind::Return(_)
        )
    }
}

/// A block of statements.
#[derive(Debug, Clone, Default)]
pub struct Suite {
    pub stmts: Vec<StmtId>,
    pub span: Span,
    pub datatype: DataType,
    /// Every path through the suite ends in `return`.
    pub has_return: bool,
    pub resolved: bool,
}
