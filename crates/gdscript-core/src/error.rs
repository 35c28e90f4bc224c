//! Error types for analysis, code generation and the host value model.
//!
//! ## Error Hierarchy
//!
//! ```text
//! CompilationError - resolution, type and code generation errors (carry a Span)
//! EvalError        - failures of the host value model (operators, constructors)
//! ```
//!
//! `CompilationError`s are values: the analyzer records them into
//! [`Diagnostics`](crate::Diagnostics) and keeps going, the code generator
//! keeps only the first one per function.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors raised while resolving, type checking or lowering a script.
///
/// The `Display` form is the user-facing message; the position is carried
/// separately in the span so diagnostics can report `line:column`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// An identifier did not match any declaration or global.
    #[error("Identifier \"{name}\" not declared in the current scope.")]
    IdentifierNotFound { name: String, span: Span },

    /// A type annotation could not be resolved.
    #[error("Could not find type \"{name}\" in the current scope.")]
    TypeNotFound { name: String, span: Span },

    /// An `extends "path"` dependency failed to load or resolve.
    #[error("Could not resolve super class path \"{path}\".")]
    SuperClassPathUnresolved { path: String, span: Span },

    /// An `extends Name` base was not found by any lookup strategy.
    #[error("Could not find base class \"{name}\".")]
    BaseClassNotFound { name: String, span: Span },

    /// The base chain loops back to the class being resolved.
    #[error("Cyclic inheritance.")]
    CyclicInheritance { span: Span },

    /// A member's type depends on itself.
    #[error("Could not resolve member \"{name}\": Cyclic reference.")]
    CyclicReference { name: String, span: Span },

    /// Attribute lookup failed on a hard-typed base.
    #[error("Cannot find member \"{name}\" in base \"{base}\".")]
    MemberNotFound {
        name: String,
        base: String,
        span: Span,
    },

    /// A value is not assignable to its target type.
    #[error("{message}")]
    TypeMismatch { message: String, span: Span },

    /// A binary operator cannot be applied to the operand types.
    #[error("Invalid operands \"{left}\" and \"{right}\" for \"{op}\" operator.")]
    InvalidOperands {
        op: String,
        left: String,
        right: String,
        span: Span,
    },

    /// A unary operator cannot be applied to the operand type.
    #[error("Invalid operand of type \"{operand}\" for unary operator \"{op}\".")]
    InvalidUnaryOperand {
        op: String,
        operand: String,
        span: Span,
    },

    /// Folding a constant expression failed in the value model.
    #[error("{message}")]
    ConstantEvaluation { message: String, span: Span },

    /// Assignment whose target is a constant.
    #[error("Cannot assign a new value to a constant.")]
    AssignToConstant { span: Span },

    /// Assignment whose target is not an identifier or subscript.
    #[error("Cannot assign to this expression.")]
    NotAssignable { span: Span },

    #[error(
        "Too few arguments for \"{callee}()\" call. Expected at least {expected} but received {received}."
    )]
    TooFewArguments {
        callee: String,
        expected: usize,
        received: usize,
        span: Span,
    },

    #[error(
        "Too many arguments for \"{callee}()\" call. Expected at most {expected} but received {received}."
    )]
    TooManyArguments {
        callee: String,
        expected: usize,
        received: usize,
        span: Span,
    },

    /// An argument is incompatible with its parameter in both directions.
    #[error(
        "Invalid argument for \"{callee}()\" function: argument {index} should be \"{expected}\" but is \"{found}\"."
    )]
    InvalidArgument {
        callee: String,
        index: usize,
        expected: String,
        found: String,
        span: Span,
    },

    #[error("No constructor of \"{type_name}\" matches the signature \"{signature}\".")]
    NoMatchingConstructor {
        type_name: String,
        signature: String,
        span: Span,
    },

    #[error("Function \"{name}()\" not found in base {base}.")]
    FunctionNotFound {
        name: String,
        base: String,
        span: Span,
    },

    /// An instance member used where no instance exists.
    #[error("Cannot access instance member \"{name}\" from a static function.")]
    StaticContext { name: String, span: Span },

    #[error("Invalid index type \"{index}\" for a base of type \"{base}\".")]
    InvalidIndexType {
        index: String,
        base: String,
        span: Span,
    },

    #[error("Cannot use subscript operator on a base of type \"{base}\".")]
    NotIndexable { base: String, span: Span },

    #[error("Invalid cast. Cannot convert from \"{from}\" to \"{to}\".")]
    InvalidCast { from: String, to: String, span: Span },

    #[error("Could not preload resource file \"{path}\".")]
    PreloadFailed { path: String, span: Span },

    #[error("Not all code paths return a value.")]
    NotAllPathsReturn { span: Span },

    #[error("Cannot use another enum element before it was declared.")]
    EnumBeforeDeclared { span: Span },

    /// A context that requires a constant got a runtime value.
    #[error("{message}")]
    ExpectedConstant { message: String, span: Span },

    /// `:=` used with a value whose type cannot be inferred.
    #[error("Cannot infer the type of \"{name}\" because the value doesn't have a set type.")]
    InferenceFailed { name: String, span: Span },

    #[error("Cannot get return value of call to \"{name}()\" because it returns \"void\".")]
    VoidValue { name: String, span: Span },

    #[error("Cannot use \"break\" outside of a loop.")]
    BreakOutsideLoop { span: Span },

    #[error("Cannot use \"continue\" outside of a loop.")]
    ContinueOutsideLoop { span: Span },

    #[error("Cannot use shorthand \"get_node()\" notation (\"$\") on a class that isn't a node.")]
    GetNodeOutsideNode { span: Span },

    /// Any other error with a custom message.
    #[error("{message}")]
    Other { message: String, span: Span },

    /// A broken invariant inside the compiler itself.
    #[error("Compiler bug: {message}")]
    Internal { message: String, span: Span },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::IdentifierNotFound { span, .. } => *span,
            CompilationError::TypeNotFound { span, .. } => *span,
            CompilationError::SuperClassPathUnresolved { span, .. } => *span,
            CompilationError::BaseClassNotFound { span, .. } => *span,
            CompilationError::CyclicInheritance { span } => *span,
            CompilationError::CyclicReference { span, .. } => *span,
            CompilationError::MemberNotFound { span, .. } => *span,
            CompilationError::TypeMismatch { span, .. } => *span,
            CompilationError::InvalidOperands { span, .. } => *span,
            CompilationError::InvalidUnaryOperand { span, .. } => *span,
            CompilationError::ConstantEvaluation { span, .. } => *span,
            CompilationError::AssignToConstant { span } => *span,
            CompilationError::NotAssignable { span } => *span,
            CompilationError::TooFewArguments { span, .. } => *span,
            CompilationError::TooManyArguments { span, .. } => *span,
            CompilationError::InvalidArgument { span, .. } => *span,
            CompilationError::NoMatchingConstructor { span, .. } => *span,
            CompilationError::FunctionNotFound { span, .. } => *span,
            CompilationError::StaticContext { span, .. } => *span,
            CompilationError::InvalidIndexType { span, .. } => *span,
            CompilationError::NotIndexable { span, .. } => *span,
            CompilationError::InvalidCast { span, .. } => *span,
            CompilationError::PreloadFailed { span, .. } => *span,
            CompilationError::NotAllPathsReturn { span } => *span,
            CompilationError::EnumBeforeDeclared { span } => *span,
            CompilationError::ExpectedConstant { span, .. } => *span,
            CompilationError::InferenceFailed { span, .. } => *span,
            CompilationError::VoidValue { span, .. } => *span,
            CompilationError::BreakOutsideLoop { span } => *span,
            CompilationError::ContinueOutsideLoop { span } => *span,
            CompilationError::GetNodeOutsideNode { span } => *span,
            CompilationError::Other { span, .. } => *span,
            CompilationError::Internal { span, .. } => *span,
        }
    }

    /// Shorthand for [`CompilationError::Other`].
    pub fn other(message: impl Into<String>, span: Span) -> Self {
        CompilationError::Other {
            message: message.into(),
            span,
        }
    }

    /// Shorthand for [`CompilationError::Internal`].
    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        CompilationError::Internal {
            message: message.into(),
            span,
        }
    }
}

// ============================================================================
// Evaluation Errors
// ============================================================================

/// Failures of the host value model.
///
/// Raised by operator evaluation, construction, indexing and utility calls.
/// The analyzer turns them into `CompilationError`s when they happen while
/// folding constants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Invalid operands \"{left}\" and \"{right}\" for \"{op}\" operator.")]
    InvalidOperands {
        op: String,
        left: String,
        right: String,
    },

    #[error("Invalid operand of type \"{operand}\" for unary operator \"{op}\".")]
    InvalidUnaryOperand { op: String, operand: String },

    #[error("Division by zero error.")]
    DivisionByZero,

    #[error("Modulo by zero error.")]
    ModuloByZero,

    #[error("Index {index} out of bounds for a size of {size}.")]
    IndexOutOfBounds { index: i64, size: usize },

    #[error("Invalid index \"{index}\" for a base of type \"{base}\".")]
    InvalidIndex { base: String, index: String },

    #[error("No constructor of \"{type_name}\" accepts the given arguments.")]
    InvalidConstructor { type_name: String },

    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("Function \"{name}()\" cannot be evaluated at compile time.")]
    UnknownFunction { name: String },

    /// The result would exceed the folding limit; the call runs at run time.
    #[error("Result of \"{name}()\" has {len} elements, more than {limit} can be folded.")]
    TooLarge { name: String, len: u128, limit: usize },
}
