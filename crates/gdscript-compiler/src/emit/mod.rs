//! Instruction emitter.
//!
//! A [`FunctionBuilder`] collects the instructions of one function together
//! with their source lines, the function's type and global tables, jump
//! bookkeeping and the temporary stack. Constants go to the script-level
//! pool shared by every function.
//!
//! # Example
//!
//! ```
//! use gdscript_compiler::bytecode::{Address, ConstantPool, Instruction};
//! use gdscript_compiler::emit::FunctionBuilder;
//! use gdscript_core::Variant;
//!
//! let mut pool = ConstantPool::new();
//! let mut builder = FunctionBuilder::new(&mut pool, true);
//! builder.set_line(3);
//! let one = builder.constant(Variant::Int(1));
//! builder.emit(Instruction::Return { value: one });
//! let code = builder.finish();
//! assert_eq!(code.lines, vec![3]);
//! ```

mod jumps;
mod temps;

pub use jumps::{JumpManager, LoopExit};
pub use temps::{TempError, TempStack};

use gdscript_core::{TypeHash, Variant};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::bytecode::{Address, ConstantPool, GlobalRef, Instruction, RuntimeType};

/// A forward jump waiting for its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpLabel(pub(crate) usize);

impl JumpLabel {
    /// Index of the jump instruction.
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoopError {
    #[error("not inside a loop")]
    NotInLoop,
}

/// What a finished builder hands back.
#[derive(Debug, Default)]
pub struct EmittedCode {
    pub code: Vec<Instruction>,
    pub lines: Vec<u32>,
    pub types: Vec<RuntimeType>,
    pub globals: Vec<GlobalRef>,
    pub temp_count: u32,
}

/// Placeholder target of an unpatched jump.
const UNPATCHED: u32 = u32::MAX;

/// Emits the instructions of one function.
pub struct FunctionBuilder<'pool> {
    code: Vec<Instruction>,
    lines: Vec<u32>,
    constants: &'pool mut ConstantPool,
    jumps: JumpManager,
    temps: TempStack,
    types: Vec<RuntimeType>,
    type_index: FxHashMap<TypeHash, u32>,
    globals: Vec<GlobalRef>,
    global_index: FxHashMap<GlobalRef, u32>,
    current_line: u32,
    line_info: bool,
}

impl<'pool> FunctionBuilder<'pool> {
    pub fn new(constants: &'pool mut ConstantPool, line_info: bool) -> Self {
        Self {
            code: Vec::new(),
            lines: Vec::new(),
            constants,
            jumps: JumpManager::new(),
            temps: TempStack::new(),
            types: Vec::new(),
            type_index: FxHashMap::default(),
            globals: Vec::new(),
            global_index: FxHashMap::default(),
            current_line: 1,
            line_info,
        }
    }

    /// Line recorded for the following instructions.
    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Append an instruction, returning its index.
    pub fn emit(&mut self, instruction: Instruction) -> usize {
        self.code.push(instruction);
        if self.line_info {
            self.lines.push(self.current_line);
        }
        self.code.len() - 1
    }

    /// Index the next instruction will get.
    pub fn offset(&self) -> u32 {
        self.code.len() as u32
    }

    pub fn last(&self) -> Option<&Instruction> {
        self.code.last()
    }

    // ==========================================================================
    // Operand Tables
    // ==========================================================================

    pub fn constant(&mut self, value: Variant) -> Address {
        Address::Constant(self.constants.add(value))
    }

    /// Pool index of a method, property or function name.
    pub fn name(&mut self, name: &str) -> u32 {
        self.constants.add_name(name)
    }

    pub fn type_index(&mut self, ty: RuntimeType) -> u32 {
        let hash = ty.hash();
        if let Some(&index) = self.type_index.get(&hash) {
            return index;
        }
        let index = self.types.len() as u32;
        self.types.push(ty);
        self.type_index.insert(hash, index);
        index
    }

    pub fn global(&mut self, global: GlobalRef) -> Address {
        if let Some(&index) = self.global_index.get(&global) {
            return Address::Global(index);
        }
        let index = self.globals.len() as u32;
        self.globals.push(global.clone());
        self.global_index.insert(global, index);
        Address::Global(index)
    }

    // ==========================================================================
    // Temporaries
    // ==========================================================================

    pub fn push_temp(&mut self) -> Address {
        self.temps.push()
    }

    pub fn pop_temp(&mut self, address: Address) -> Result<(), TempError> {
        self.temps.pop(address)
    }

    pub fn temp_depth(&self) -> u32 {
        self.temps.depth()
    }

    // ==========================================================================
    // Jumps
    // ==========================================================================

    /// Emit a jump whose target is patched later.
    pub fn emit_jump(&mut self, mut instruction: Instruction) -> JumpLabel {
        if let Some(target) = instruction.target_mut() {
            *target = UNPATCHED;
        }
        JumpLabel(self.emit(instruction))
    }

    /// Point a jump at the next instruction.
    pub fn patch_jump(&mut self, label: JumpLabel) {
        let here = self.offset();
        self.patch_jump_to(label, here);
    }

    pub fn patch_jump_to(&mut self, label: JumpLabel, target: u32) {
        if let Some(slot) = self.code.get_mut(label.0).and_then(Instruction::target_mut) {
            *slot = target;
        }
    }

    pub fn patch_all(&mut self, labels: impl IntoIterator<Item = JumpLabel>) {
        for label in labels {
            self.patch_jump(label);
        }
    }

    // ==========================================================================
    // Loop Control
    // ==========================================================================

    /// Enter a loop. `continue_target` is `None` when it is only known
    /// after the body; see [`set_continue_target`](Self::set_continue_target).
    pub fn enter_loop(&mut self, continue_target: Option<u32>) {
        self.jumps.enter_loop(continue_target);
    }

    /// Exit a loop, patching its breaks to the next instruction.
    pub fn exit_loop(&mut self) {
        let exit = self.jumps.exit_loop();
        self.patch_all(exit.breaks);
        // continues still pending have nowhere else to go
        self.patch_all(exit.continues);
    }

    /// Mark the next instruction as the current loop's continue target.
    pub fn set_continue_target(&mut self) {
        let here = self.offset();
        let pending = self.jumps.set_continue_target(here);
        for label in pending {
            self.patch_jump_to(label, here);
        }
    }

    pub fn emit_break(&mut self) -> Result<(), LoopError> {
        if !self.jumps.in_loop() {
            return Err(LoopError::NotInLoop);
        }
        let label = self.emit_jump(Instruction::Jump { target: UNPATCHED });
        self.jumps.add_break(label);
        Ok(())
    }

    pub fn emit_continue(&mut self) -> Result<(), LoopError> {
        match self.jumps.continue_target()? {
            Some(target) => {
                self.emit(Instruction::Jump { target });
            }
            None => {
                let label = self.emit_jump(Instruction::Jump { target: UNPATCHED });
                self.jumps.add_continue(label);
            }
        }
        Ok(())
    }

    pub fn in_loop(&self) -> bool {
        self.jumps.in_loop()
    }

    // ==========================================================================
    // Finalization
    // ==========================================================================

    pub fn finish(self) -> EmittedCode {
        EmittedCode {
            code: self.code,
            lines: self.lines,
            types: self.types,
            globals: self.globals,
            temp_count: self.temps.max_depth(),
        }
    }
}

impl std::fmt::Debug for FunctionBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionBuilder")
            .field("code_len", &self.code.len())
            .field("temp_depth", &self.temps.depth())
            .field("current_line", &self.current_line)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_shared_through_the_pool() {
        let mut pool = ConstantPool::new();
        {
            let mut builder = FunctionBuilder::new(&mut pool, false);
            assert_eq!(builder.constant(Variant::Int(7)), Address::Constant(0));
            assert_eq!(builder.constant(Variant::Int(7)), Address::Constant(0));
        }
        let mut builder = FunctionBuilder::new(&mut pool, false);
        assert_eq!(builder.constant(Variant::Int(7)), Address::Constant(0));
    }

    #[test]
    fn jump_and_patch() {
        let mut pool = ConstantPool::new();
        let mut builder = FunctionBuilder::new(&mut pool, false);
        let label = builder.emit_jump(Instruction::JumpIfNot {
            condition: Address::Parameter(0),
            target: 0,
        });
        builder.emit(Instruction::Breakpoint);
        builder.patch_jump(label);
        builder.emit(Instruction::End);

        let code = builder.finish().code;
        assert_eq!(
            code[0],
            Instruction::JumpIfNot {
                condition: Address::Parameter(0),
                target: 2
            }
        );
    }

    #[test]
    fn loop_break_continue() {
        let mut pool = ConstantPool::new();
        let mut builder = FunctionBuilder::new(&mut pool, false);
        builder.enter_loop(Some(0));
        builder.emit_continue().unwrap();
        builder.emit_break().unwrap();
        builder.exit_loop();
        builder.emit(Instruction::End);

        let code = builder.finish().code;
        assert_eq!(code[0], Instruction::Jump { target: 0 });
        assert_eq!(code[1], Instruction::Jump { target: 2 });
    }

    #[test]
    fn late_continue_target() {
        let mut pool = ConstantPool::new();
        let mut builder = FunctionBuilder::new(&mut pool, false);
        builder.enter_loop(None);
        builder.emit_continue().unwrap();
        builder.emit(Instruction::Breakpoint);
        builder.set_continue_target();
        builder.emit_continue().unwrap();
        builder.exit_loop();

        let code = builder.finish().code;
        assert_eq!(code[0], Instruction::Jump { target: 2 });
        assert_eq!(code[2], Instruction::Jump { target: 2 });
    }

    #[test]
    fn break_outside_loop() {
        let mut pool = ConstantPool::new();
        let mut builder = FunctionBuilder::new(&mut pool, false);
        assert_eq!(builder.emit_break(), Err(LoopError::NotInLoop));
        assert_eq!(builder.emit_continue(), Err(LoopError::NotInLoop));
    }

    #[test]
    fn tables_deduplicate() {
        let mut pool = ConstantPool::new();
        let mut builder = FunctionBuilder::new(&mut pool, false);
        let node = builder.type_index(RuntimeType::Native("Node".into()));
        builder.type_index(RuntimeType::Variant);
        assert_eq!(builder.type_index(RuntimeType::Native("Node".into())), node);
        let g = builder.global(GlobalRef::Named("Input".into()));
        assert_eq!(builder.global(GlobalRef::Named("Input".into())), g);
        assert_eq!(builder.finish().globals.len(), 1);
    }

    #[test]
    fn line_tracking() {
        let mut pool = ConstantPool::new();
        let mut builder = FunctionBuilder::new(&mut pool, true);
        builder.set_line(4);
        builder.emit(Instruction::Breakpoint);
        builder.set_line(9);
        builder.emit(Instruction::End);
        assert_eq!(builder.finish().lines, vec![4, 9]);
    }
}
