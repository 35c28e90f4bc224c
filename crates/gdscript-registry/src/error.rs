use thiserror::Error;

/// Errors raised while populating a [`HostRegistry`](crate::HostRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("class '{0}' is already registered")]
    DuplicateClass(String),

    #[error("class '{class}' inherits unknown class '{parent}'")]
    UnknownParent { class: String, parent: String },

    #[error("unknown class '{0}'")]
    UnknownClass(String),

    #[error("global '{0}' is already registered")]
    DuplicateGlobal(String),

    #[error("global class '{name}' must point at a script path, got '{path}'")]
    InvalidScriptPath { name: String, path: String },
}
