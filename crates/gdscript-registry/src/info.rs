//! Descriptions of host members returned by the oracle.

use std::fmt;

use bitflags::bitflags;
use gdscript_core::VariantType;

/// A type as the host describes it.
///
/// The analyzer converts these into its own `DataType`; the host never sees
/// user classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostType {
    Variant,
    /// No value, only valid as a return type.
    Void,
    Builtin(VariantType),
    /// Instance of a native class.
    Object(String),
    /// Value of a native or global enum. `class` is empty for global enums.
    Enum { class: String, name: String },
}

impl HostType {
    pub fn object(class: impl Into<String>) -> Self {
        HostType::Object(class.into())
    }

    pub fn enum_of(class: impl Into<String>, name: impl Into<String>) -> Self {
        HostType::Enum {
            class: class.into(),
            name: name.into(),
        }
    }
}

impl From<VariantType> for HostType {
    fn from(ty: VariantType) -> Self {
        HostType::Builtin(ty)
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Variant => f.write_str("Variant"),
            HostType::Void => f.write_str("void"),
            HostType::Builtin(ty) => f.write_str(ty.name()),
            HostType::Object(class) => f.write_str(class),
            HostType::Enum { class, name } if class.is_empty() => f.write_str(name),
            HostType::Enum { class, name } => write!(f, "{class}.{name}"),
        }
    }
}

bitflags! {
    /// Method traits reported by the host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MethodFlags: u8 {
        /// Accepts any number of extra arguments.
        const VARARG = 1 << 0;
        /// Callable without an instance.
        const STATIC = 1 << 1;
        /// Does not mutate the receiver.
        const CONST = 1 << 2;
        /// Suspends; the result must be awaited.
        const COROUTINE = 1 << 3;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: HostType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: String,
    pub ty: HostType,
    /// Read-only from scripts.
    pub read_only: bool,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, ty: impl Into<HostType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Signature of a method, signal or utility function.
///
/// The last `default_count` parameters are optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub params: Vec<ParamInfo>,
    pub return_type: HostType,
    pub default_count: usize,
    pub flags: MethodFlags,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, return_type: impl Into<HostType>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: return_type.into(),
            default_count: 0,
            flags: MethodFlags::empty(),
        }
    }

    /// A method returning nothing.
    pub fn void(name: impl Into<String>) -> Self {
        Self::new(name, HostType::Void)
    }

    /// A signal. Signals carry parameters but never a return value.
    pub fn signal(name: impl Into<String>) -> Self {
        Self::new(name, HostType::Void)
    }

    pub fn param(mut self, name: impl Into<String>, ty: impl Into<HostType>) -> Self {
        self.params.push(ParamInfo {
            name: name.into(),
            ty: ty.into(),
        });
        self
    }

    /// Mark the last `count` parameters as optional.
    pub fn defaults(mut self, count: usize) -> Self {
        self.default_count = count;
        self
    }

    pub fn flags(mut self, flags: MethodFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn vararg(self) -> Self {
        self.flags(MethodFlags::VARARG)
    }

    pub fn is_vararg(&self) -> bool {
        self.flags.contains(MethodFlags::VARARG)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    pub fn is_coroutine(&self) -> bool {
        self.flags.contains(MethodFlags::COROUTINE)
    }

    /// Number of parameters that must be passed.
    pub fn required_count(&self) -> usize {
        self.params.len().saturating_sub(self.default_count)
    }
}

/// A global utility function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityInfo {
    pub info: MethodInfo,
    /// Deterministic and free of side effects, so calls with constant
    /// arguments may be folded.
    pub pure: bool,
}
