//! Instruction set.
//!
//! Instructions are three-address: they read operand addresses and write a
//! destination address. Names (methods, properties, utilities) are constant
//! pool indices; types are indices into the function's type table; jump
//! targets are instruction indices.

use gdscript_core::{BinaryOp, UnaryOp, VariantType};

use super::Address;

/// Opcodes of the encoded form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    Assign = 0,
    Convert,
    Binary,
    Unary,
    TypeTest,
    Cast,
    GetNamed,
    SetNamed,
    GetIndexed,
    SetIndexed,
    Construct,
    ConstructArray,
    ConstructDictionary,
    Call,
    CallSuper,
    CallUtility,
    CallBuiltinStatic,
    Await,
    IterBegin,
    IterNext,
    Jump,
    JumpIf,
    JumpIfNot,
    Return,
    Assert,
    Breakpoint,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Assign {
        dst: Address,
        src: Address,
    },
    /// Store `src` into `dst`, converting to a builtin type.
    Convert {
        dst: Address,
        src: Address,
        to: VariantType,
    },
    Binary {
        op: BinaryOp,
        dst: Address,
        left: Address,
        right: Address,
    },
    Unary {
        op: UnaryOp,
        dst: Address,
        operand: Address,
    },
    /// `value is Type`
    TypeTest {
        dst: Address,
        value: Address,
        ty: u32,
    },
    /// `value as Type`
    Cast {
        dst: Address,
        value: Address,
        ty: u32,
    },
    GetNamed {
        dst: Address,
        base: Address,
        name: u32,
    },
    SetNamed {
        base: Address,
        name: u32,
        value: Address,
    },
    GetIndexed {
        dst: Address,
        base: Address,
        index: Address,
    },
    SetIndexed {
        base: Address,
        index: Address,
        value: Address,
    },
    Construct {
        dst: Address,
        ty: VariantType,
        args: Vec<Address>,
    },
    ConstructArray {
        dst: Address,
        items: Vec<Address>,
    },
    /// Keys and values interleaved.
    ConstructDictionary {
        dst: Address,
        entries: Vec<Address>,
    },
    Call {
        dst: Address,
        base: Address,
        method: u32,
        args: Vec<Address>,
    },
    CallSuper {
        dst: Address,
        method: u32,
        args: Vec<Address>,
    },
    CallUtility {
        dst: Address,
        function: u32,
        args: Vec<Address>,
    },
    CallBuiltinStatic {
        dst: Address,
        ty: VariantType,
        method: u32,
        args: Vec<Address>,
    },
    /// Suspend until `value` (a signal or coroutine call result) completes.
    Await {
        dst: Address,
        value: Address,
    },
    /// Start iterating `container`; jumps to `exit` when it is empty.
    IterBegin {
        counter: Address,
        container: Address,
        iterator: Address,
        exit: u32,
    },
    IterNext {
        counter: Address,
        container: Address,
        iterator: Address,
        exit: u32,
    },
    Jump {
        target: u32,
    },
    JumpIf {
        condition: Address,
        target: u32,
    },
    JumpIfNot {
        condition: Address,
        target: u32,
    },
    Return {
        value: Address,
    },
    Assert {
        condition: Address,
        message: Address,
    },
    Breakpoint,
    End,
}

impl Instruction {
    pub fn opcode(&self) -> OpCode {
        match self {
            Instruction::Assign { .. } => OpCode::Assign,
            Instruction::Convert { .. } => OpCode::Convert,
            Instruction::Binary { .. } => OpCode::Binary,
            Instruction::Unary { .. } => OpCode::Unary,
            Instruction::TypeTest { .. } => OpCode::TypeTest,
            Instruction::Cast { .. } => OpCode::Cast,
            Instruction::GetNamed { .. } => OpCode::GetNamed,
            Instruction::SetNamed { .. } => OpCode::SetNamed,
            Instruction::GetIndexed { .. } => OpCode::GetIndexed,
            Instruction::SetIndexed { .. } => OpCode::SetIndexed,
            Instruction::Construct { .. } => OpCode::Construct,
            Instruction::ConstructArray { .. } => OpCode::ConstructArray,
            Instruction::ConstructDictionary { .. } => OpCode::ConstructDictionary,
            Instruction::Call { .. } => OpCode::Call,
            Instruction::CallSuper { .. } => OpCode::CallSuper,
            Instruction::CallUtility { .. } => OpCode::CallUtility,
            Instruction::CallBuiltinStatic { .. } => OpCode::CallBuiltinStatic,
            Instruction::Await { .. } => OpCode::Await,
            Instruction::IterBegin { .. } => OpCode::IterBegin,
            Instruction::IterNext { .. } => OpCode::IterNext,
            Instruction::Jump { .. } => OpCode::Jump,
            Instruction::JumpIf { .. } => OpCode::JumpIf,
            Instruction::JumpIfNot { .. } => OpCode::JumpIfNot,
            Instruction::Return { .. } => OpCode::Return,
            Instruction::Assert { .. } => OpCode::Assert,
            Instruction::Breakpoint => OpCode::Breakpoint,
            Instruction::End => OpCode::End,
        }
    }

    /// Jump target, for instructions that have one.
    pub fn target_mut(&mut self) -> Option<&mut u32> {
        match self {
            Instruction::Jump { target }
            | Instruction::JumpIf { target, .. }
            | Instruction::JumpIfNot { target, .. } => Some(target),
            Instruction::IterBegin { exit, .. } | Instruction::IterNext { exit, .. } => Some(exit),
            _ => None,
        }
    }

    /// Append the encoded words: the opcode, then operands in declaration
    /// order. Operand lists are prefixed by their length.
    pub fn encode_into(&self, out: &mut Vec<u32>) {
        out.push(self.opcode() as u32);
        let mut list = |out: &mut Vec<u32>, items: &[Address]| {
            out.push(items.len() as u32);
            out.extend(items.iter().map(|a| a.encode()));
        };
        match self {
            Instruction::Assign { dst, src } => out.extend([dst.encode(), src.encode()]),
            Instruction::Convert { dst, src, to } => {
                out.extend([dst.encode(), src.encode(), *to as u32])
            }
            Instruction::Binary {
                op,
                dst,
                left,
                right,
            } => out.extend([*op as u32, dst.encode(), left.encode(), right.encode()]),
            Instruction::Unary { op, dst, operand } => {
                out.extend([*op as u32, dst.encode(), operand.encode()])
            }
            Instruction::TypeTest { dst, value, ty } | Instruction::Cast { dst, value, ty } => {
                out.extend([dst.encode(), value.encode(), *ty])
            }
            Instruction::GetNamed { dst, base, name } => {
                out.extend([dst.encode(), base.encode(), *name])
            }
            Instruction::SetNamed { base, name, value } => {
                out.extend([base.encode(), *name, value.encode()])
            }
            Instruction::GetIndexed { dst, base, index } => {
                out.extend([dst.encode(), base.encode(), index.encode()])
            }
            Instruction::SetIndexed { base, index, value } => {
                out.extend([base.encode(), index.encode(), value.encode()])
            }
            Instruction::Construct { dst, ty, args } => {
                out.extend([dst.encode(), *ty as u32]);
                list(out, args);
            }
            Instruction::ConstructArray { dst, items } => {
                out.push(dst.encode());
                list(out, items);
            }
            Instruction::ConstructDictionary { dst, entries } => {
                out.push(dst.encode());
                list(out, entries);
            }
            Instruction::Call {
                dst,
                base,
                method,
                args,
            } => {
                out.extend([dst.encode(), base.encode(), *method]);
                list(out, args);
            }
            Instruction::CallSuper { dst, method, args } => {
                out.extend([dst.encode(), *method]);
                list(out, args);
            }
            Instruction::CallUtility {
                dst,
                function,
                args,
            } => {
                out.extend([dst.encode(), *function]);
                list(out, args);
            }
            Instruction::CallBuiltinStatic {
                dst,
                ty,
                method,
                args,
            } => {
                out.extend([dst.encode(), *ty as u32, *method]);
                list(out, args);
            }
            Instruction::Await { dst, value } => out.extend([dst.encode(), value.encode()]),
            Instruction::IterBegin {
                counter,
                container,
                iterator,
                exit,
            }
            | Instruction::IterNext {
                counter,
                container,
                iterator,
                exit,
            } => out.extend([counter.encode(), container.encode(), iterator.encode(), *exit]),
            Instruction::Jump { target } => out.push(*target),
            Instruction::JumpIf { condition, target }
            | Instruction::JumpIfNot { condition, target } => {
                out.extend([condition.encode(), *target])
            }
            Instruction::Return { value } => out.push(value.encode()),
            Instruction::Assert { condition, message } => {
                out.extend([condition.encode(), message.encode()])
            }
            Instruction::Breakpoint | Instruction::End => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_lists_carry_their_length() {
        let call = Instruction::Call {
            dst: Address::Temporary(0),
            base: Address::SelfRef,
            method: 4,
            args: vec![Address::Parameter(0), Address::Constant(2)],
        };
        let mut words = Vec::new();
        call.encode_into(&mut words);
        assert_eq!(words[0], OpCode::Call as u32);
        assert_eq!(words[3], 4);
        assert_eq!(words[4], 2);
        assert_eq!(words.len(), 7);
    }

    #[test]
    fn only_jumps_have_targets() {
        assert!(Instruction::Jump { target: 3 }.target_mut().is_some());
        assert!(Instruction::End.target_mut().is_none());
    }
}
