//! Accumulated errors and warnings of one compilation session.
//!
//! Errors never abort the analyzer: every problem found is pushed here and the
//! pass continues. A caller checks [`Diagnostics::has_errors`] at the end to
//! decide whether the result is usable.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::{CompilationError, Span};

/// The severity level of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Makes the compilation fail.
    Error,
    /// Advisory only.
    Warning,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Error => write!(f, "error"),
            DiagnosticKind::Warning => write!(f, "warning"),
        }
    }
}

/// Warning categories the analyzer can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WarningCode {
    /// Property looked up on a value whose type is not known statically.
    UnsafePropertyAccess,
    /// Method called on a value whose type is not known statically.
    UnsafeMethodAccess,
    /// Argument accepted only because its type is a supertype of the parameter.
    UnsafeCallArgument,
    /// Value accepted only because its type is a supertype of the target.
    UnsafeCast,
    /// Operator applied to a dynamically typed operand.
    UnsafeOperation,
    /// Implicit conversion that may lose information (e.g. `float` to `int`).
    NarrowingConversion,
    /// Ternary branches with unrelated types.
    IncompatibleTernary,
    /// Integer division discards the fractional part.
    IntegerDivision,
    /// `await` on something that does not suspend.
    RedundantAwait,
    UnreachableCode,
    /// Expression statement without any effect.
    StandaloneExpression,
    /// `assert` whose condition is the constant `false`.
    AssertAlwaysFalse,
}

impl WarningCode {
    /// All warning codes, in declaration order.
    pub const ALL: [WarningCode; 12] = [
        WarningCode::UnsafePropertyAccess,
        WarningCode::UnsafeMethodAccess,
        WarningCode::UnsafeCallArgument,
        WarningCode::UnsafeCast,
        WarningCode::UnsafeOperation,
        WarningCode::NarrowingConversion,
        WarningCode::IncompatibleTernary,
        WarningCode::IntegerDivision,
        WarningCode::RedundantAwait,
        WarningCode::UnreachableCode,
        WarningCode::StandaloneExpression,
        WarningCode::AssertAlwaysFalse,
    ];

    /// Stable identifier used in settings and output.
    pub fn name(self) -> &'static str {
        match self {
            WarningCode::UnsafePropertyAccess => "UNSAFE_PROPERTY_ACCESS",
            WarningCode::UnsafeMethodAccess => "UNSAFE_METHOD_ACCESS",
            WarningCode::UnsafeCallArgument => "UNSAFE_CALL_ARGUMENT",
            WarningCode::UnsafeCast => "UNSAFE_CAST",
            WarningCode::UnsafeOperation => "UNSAFE_OPERATION",
            WarningCode::NarrowingConversion => "NARROWING_CONVERSION",
            WarningCode::IncompatibleTernary => "INCOMPATIBLE_TERNARY",
            WarningCode::IntegerDivision => "INTEGER_DIVISION",
            WarningCode::RedundantAwait => "REDUNDANT_AWAIT",
            WarningCode::UnreachableCode => "UNREACHABLE_CODE",
            WarningCode::StandaloneExpression => "STANDALONE_EXPRESSION",
            WarningCode::AssertAlwaysFalse => "ASSERT_ALWAYS_FALSE",
        }
    }

    /// Whether the warning is reported unless explicitly disabled.
    ///
    /// The unsafe-access family is noisy on untyped code, so it is opt-in.
    pub fn enabled_by_default(self) -> bool {
        !matches!(
            self,
            WarningCode::UnsafePropertyAccess
                | WarningCode::UnsafeMethodAccess
                | WarningCode::UnsafeCast
                | WarningCode::UnsafeCallArgument
                | WarningCode::UnsafeOperation
        )
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.name() == name)
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single diagnostic record.
///
/// Displays as `path:line:column: error: message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Script the diagnostic belongs to.
    pub path: String,
    /// Line number (1-based).
    pub line: u32,
    /// Column number (1-based).
    pub column: u32,
    /// Set for warnings.
    pub code: Option<WarningCode>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.path, self.line, self.column, self.kind, self.message
        )?;
        if let Some(code) = self.code {
            write!(f, " ({})", code)?;
        }
        Ok(())
    }
}

/// Ordered error and warning sequences plus the per-line unsafe set.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    unsafe_lines: BTreeMap<String, BTreeSet<u32>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error with an explicit message and position.
    ///
    /// An exact duplicate of an already recorded error is dropped, so running
    /// a resolution step twice never doubles its output.
    pub fn error(&mut self, path: &str, message: impl Into<String>, span: Span) {
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::Error,
            message: message.into(),
            path: path.to_string(),
            line: span.line,
            column: span.col,
            code: None,
        };
        if !self.errors.contains(&diagnostic) {
            self.errors.push(diagnostic);
        }
    }

    /// Record a [`CompilationError`] at its own span.
    pub fn push_error(&mut self, path: &str, error: &CompilationError) {
        self.error(path, error.to_string(), error.span());
    }

    pub fn push_warning(
        &mut self,
        path: &str,
        code: WarningCode,
        message: impl Into<String>,
        span: Span,
    ) {
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::Warning,
            message: message.into(),
            path: path.to_string(),
            line: span.line,
            column: span.col,
            code: Some(code),
        };
        if !self.warnings.contains(&diagnostic) {
            self.warnings.push(diagnostic);
        }
    }

    /// Flag a source line as containing statically unverifiable code.
    pub fn mark_unsafe(&mut self, path: &str, line: u32) {
        self.unsafe_lines
            .entry(path.to_string())
            .or_default()
            .insert(line);
    }

    pub fn is_unsafe_line(&self, path: &str, line: u32) -> bool {
        self.unsafe_lines
            .get(path)
            .is_some_and(|lines| lines.contains(&line))
    }

    /// Unsafe lines of one script, in ascending order.
    pub fn unsafe_lines(&self, path: &str) -> impl Iterator<Item = u32> + '_ {
        self.unsafe_lines
            .get(path)
            .into_iter()
            .flat_map(|lines| lines.iter().copied())
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// The first error as a `(message, line, column)` triple.
    pub fn first_error(&self) -> Option<(&str, u32, u32)> {
        self.errors
            .first()
            .map(|d| (d.message.as_str(), d.line, d.column))
    }

    /// Whether any warning with the given code was recorded.
    pub fn has_warning(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|d| d.code == Some(code))
    }

    /// All diagnostics, errors first.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in self.iter() {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_triple() {
        let mut diags = Diagnostics::new();
        assert!(diags.first_error().is_none());
        diags.error("res://a.gd", "first", Span::point(3, 4));
        diags.error("res://a.gd", "second", Span::point(5, 1));
        assert_eq!(diags.first_error(), Some(("first", 3, 4)));
        assert_eq!(diags.error_count(), 2);
    }

    #[test]
    fn duplicates_are_dropped() {
        let mut diags = Diagnostics::new();
        diags.error("res://a.gd", "same", Span::point(1, 1));
        diags.error("res://a.gd", "same", Span::point(1, 1));
        diags.push_warning("res://a.gd", WarningCode::IntegerDivision, "w", Span::point(2, 1));
        diags.push_warning("res://a.gd", WarningCode::IntegerDivision, "w", Span::point(2, 1));
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.warning_count(), 1);
    }

    #[test]
    fn warnings_do_not_fail() {
        let mut diags = Diagnostics::new();
        diags.push_warning(
            "res://a.gd",
            WarningCode::NarrowingConversion,
            "narrowing",
            Span::point(1, 1),
        );
        assert!(!diags.has_errors());
        assert!(diags.has_warning(WarningCode::NarrowingConversion));
    }

    #[test]
    fn unsafe_lines_are_sorted() {
        let mut diags = Diagnostics::new();
        diags.mark_unsafe("res://a.gd", 7);
        diags.mark_unsafe("res://a.gd", 2);
        diags.mark_unsafe("res://a.gd", 7);
        assert_eq!(diags.unsafe_lines("res://a.gd").collect::<Vec<_>>(), vec![2, 7]);
        assert!(diags.is_unsafe_line("res://a.gd", 2));
        assert!(!diags.is_unsafe_line("res://b.gd", 2));
    }

    #[test]
    fn display_format() {
        let mut diags = Diagnostics::new();
        diags.error("res://a.gd", "boom", Span::point(1, 2));
        assert_eq!(diags.to_string(), "res://a.gd:1:2: error: boom\n");
    }

    #[test]
    fn warning_code_names_round_trip() {
        for code in WarningCode::ALL {
            assert_eq!(WarningCode::from_name(code.name()), Some(code));
        }
    }
}
