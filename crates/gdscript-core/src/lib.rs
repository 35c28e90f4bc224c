//! Core types shared by the GDScript analyzer and compiler.
//!
//! - [`Span`], [`UnitId`], [`ClassId`] and [`TypeHash`] identify source
//!   positions, compilation units and types.
//! - [`DataType`] is the resolved static type every parse tree node carries.
//! - [`Variant`] and [`VariantType`] form the host value model used for
//!   constant folding and operator typing.
//! - [`CompilationError`] and [`Diagnostics`] carry the analysis results.

pub mod data_type;
pub mod diagnostics;
pub mod error;
pub mod ids;
pub mod operator;
pub mod span;
pub mod type_hash;
pub mod variant;

pub use data_type::{ClassRef, DataType, EnumType, TypeKind, TypeSource};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, WarningCode};
pub use error::{CompilationError, EvalError};
pub use ids::{ClassId, UnitId};
pub use operator::{BinaryOp, UnaryOp};
pub use span::Span;
pub use type_hash::TypeHash;
pub use variant::{
    builtin_property_names, can_convert, can_convert_strict, construct, constructor_signatures,
    convert, default_for, evaluate, evaluate_unary, get_indexed, get_named, placeholder_for, Color,
    ConstructorSignature, Dictionary, ObjectRef, Rect2, Transform2D, Variant, VariantType,
    Vector2, Vector2i, Vector3, Vector3i,
};
