//! Compiler configuration.

use gdscript_core::WarningCode;
use rustc_hash::FxHashSet;

/// Which warnings are reported.
///
/// Starts from [`WarningCode::enabled_by_default`]; individual codes can be
/// switched on or off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningSettings {
    enabled: FxHashSet<WarningCode>,
}

impl Default for WarningSettings {
    fn default() -> Self {
        Self {
            enabled: WarningCode::ALL
                .into_iter()
                .filter(|code| code.enabled_by_default())
                .collect(),
        }
    }
}

impl WarningSettings {
    /// Every warning enabled.
    pub fn all() -> Self {
        Self {
            enabled: WarningCode::ALL.into_iter().collect(),
        }
    }

    /// Every warning disabled.
    pub fn none() -> Self {
        Self {
            enabled: FxHashSet::default(),
        }
    }

    pub fn is_enabled(&self, code: WarningCode) -> bool {
        self.enabled.contains(&code)
    }

    pub fn enable(&mut self, code: WarningCode) -> &mut Self {
        self.enabled.insert(code);
        self
    }

    pub fn disable(&mut self, code: WarningCode) -> &mut Self {
        self.enabled.remove(&code);
        self
    }
}

/// Options for one [`Compiler`](crate::Compiler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub warnings: WarningSettings,
    /// Report every enabled warning as an error instead.
    pub warnings_as_errors: bool,
    /// Record a source line per emitted instruction.
    pub emit_line_info: bool,
    /// Base of a class without an `extends` clause.
    pub default_base: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            warnings: WarningSettings::default(),
            warnings_as_errors: false,
            emit_line_info: true,
            default_base: "RefCounted".to_string(),
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_warnings(mut self, warnings: WarningSettings) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_warning(mut self, code: WarningCode, enabled: bool) -> Self {
        if enabled {
            self.warnings.enable(code);
        } else {
            self.warnings.disable(code);
        }
        self
    }

    pub fn with_warnings_as_errors(mut self, value: bool) -> Self {
        self.warnings_as_errors = value;
        self
    }

    pub fn with_line_info(mut self, value: bool) -> Self {
        self.emit_line_info = value;
        self
    }

    pub fn with_default_base(mut self, base: impl Into<String>) -> Self {
        self.default_base = base.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsafe_family_is_opt_in() {
        let settings = WarningSettings::default();
        assert!(settings.is_enabled(WarningCode::NarrowingConversion));
        assert!(!settings.is_enabled(WarningCode::UnsafeMethodAccess));
        assert!(WarningSettings::all().is_enabled(WarningCode::UnsafeMethodAccess));
    }

    #[test]
    fn builder_toggles_single_codes() {
        let options = CompilerOptions::new()
            .with_warning(WarningCode::IntegerDivision, false)
            .with_warning(WarningCode::UnsafeCast, true)
            .with_default_base("Node");
        assert!(!options.warnings.is_enabled(WarningCode::IntegerDivision));
        assert!(options.warnings.is_enabled(WarningCode::UnsafeCast));
        assert_eq!(options.default_base, "Node");
    }
}
