//! Bytecode model.
//!
//! - [`Address`]: typed operand slots
//! - [`Instruction`]: the three-address instruction set and its encoding
//! - [`ConstantPool`]: per-script deduplicated constants
//! - [`CompiledFunction`], [`CompiledClass`], [`CompiledScript`]: the output

mod address;
mod constant;
mod function;
mod instruction;

pub use address::{Address, GlobalRef};
pub use constant::ConstantPool;
pub use function::{CompiledClass, CompiledFunction, CompiledScript, ParamInfo, RuntimeType};
pub use instruction::{Instruction, OpCode};
