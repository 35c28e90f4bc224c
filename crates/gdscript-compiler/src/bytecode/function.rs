//! Compiled functions, classes and scripts.

use gdscript_core::{DataType, TypeHash, TypeKind, Variant, VariantType};

use super::{ConstantPool, GlobalRef, Instruction};

/// Type operand of `is`, `as` and typed returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuntimeType {
    Variant,
    Builtin(VariantType),
    Native(String),
    /// User class by fully-qualified name.
    Script(String),
}

impl RuntimeType {
    /// The run-time check for a static type. Enum values are integers.
    pub fn of(datatype: &DataType) -> Self {
        if datatype.is_meta_type {
            return RuntimeType::Variant;
        }
        match &datatype.kind {
            TypeKind::Builtin(ty) => RuntimeType::Builtin(*ty),
            TypeKind::Enum(_) => RuntimeType::Builtin(VariantType::Int),
            TypeKind::Native(name) => RuntimeType::Native(name.clone()),
            TypeKind::Class(class) => RuntimeType::Script(class.fqcn.clone()),
            TypeKind::Variant | TypeKind::Unresolved => RuntimeType::Variant,
        }
    }

    /// Identity of the type operand. Builtin and class names never collide.
    pub fn hash(&self) -> TypeHash {
        match self {
            RuntimeType::Variant => TypeHash::from_name("Variant"),
            RuntimeType::Builtin(ty) => TypeHash::from_name(ty.name()),
            RuntimeType::Native(name) | RuntimeType::Script(name) => TypeHash::from_name(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub has_default: bool,
}

/// One function lowered to instructions.
#[derive(Debug, Clone)]
pub struct CompiledFunction {
    pub name: String,
    pub params: Vec<ParamInfo>,
    /// Where execution starts when `i` optional arguments were passed.
    /// Holds one entry per optional parameter plus the body start.
    pub default_entries: Vec<u32>,
    pub code: Vec<Instruction>,
    /// Source line of each instruction; empty when line info is off.
    pub lines: Vec<u32>,
    /// Operand table of `TypeTest` and `Cast`.
    pub types: Vec<RuntimeType>,
    /// Operand table of `Address::Global`.
    pub globals: Vec<GlobalRef>,
    pub local_count: u32,
    pub temp_count: u32,
    pub is_static: bool,
    pub is_coroutine: bool,
    pub return_type: RuntimeType,
}

impl CompiledFunction {
    /// Parameters, locals and temporaries.
    pub fn stack_size(&self) -> u32 {
        self.params.len() as u32 + self.local_count + self.temp_count
    }

    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| !p.has_default).count()
    }

    /// Entry point for a call passing `arg_count` arguments.
    pub fn entry_for(&self, arg_count: usize) -> Option<u32> {
        let optional = arg_count.checked_sub(self.required_count())?;
        self.default_entries.get(optional).copied()
    }

    pub fn line_of(&self, instruction: usize) -> Option<u32> {
        self.lines.get(instruction).copied()
    }

    /// Encode to words. Jump targets become word offsets.
    pub fn encode(&self) -> Vec<u32> {
        let mut offsets = Vec::with_capacity(self.code.len() + 1);
        let mut scratch = Vec::new();
        let mut total = 0u32;
        for instruction in &self.code {
            scratch.clear();
            instruction.encode_into(&mut scratch);
            offsets.push(total);
            total += scratch.len() as u32;
        }
        offsets.push(total);

        let mut words = Vec::with_capacity(total as usize);
        for instruction in &self.code {
            let mut instruction = instruction.clone();
            if let Some(target) = instruction.target_mut() {
                *target = offsets.get(*target as usize).copied().unwrap_or(total);
            }
            instruction.encode_into(&mut words);
        }
        words
    }
}

/// One class with its nested classes.
#[derive(Debug, Clone, Default)]
pub struct CompiledClass {
    pub name: String,
    pub fqcn: String,
    /// Named constants, addressed by `Address::ClassConstant`.
    pub constants: Vec<(String, Variant)>,
    /// Instance fields declared by this class, in slot order.
    pub fields: Vec<String>,
    /// Fields including the inherited ones.
    pub field_count: u32,
    pub statics: Vec<String>,
    pub functions: Vec<CompiledFunction>,
    pub subclasses: Vec<CompiledClass>,
}

impl CompiledClass {
    pub fn function(&self, name: &str) -> Option<&CompiledFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn constant_index(&self, name: &str) -> Option<u32> {
        self.constants
            .iter()
            .position(|(n, _)| n == name)
            .map(|i| i as u32)
    }

    pub fn subclass(&self, name: &str) -> Option<&CompiledClass> {
        self.subclasses.iter().find(|c| c.name == name)
    }

    /// Functions of this class and every nested class.
    pub fn function_count(&self) -> usize {
        self.functions.len()
            + self
                .subclasses
                .iter()
                .map(CompiledClass::function_count)
                .sum::<usize>()
    }
}

/// The output for one script file.
#[derive(Debug, Clone)]
pub struct CompiledScript {
    pub path: String,
    pub main: CompiledClass,
    /// Shared by every function of the script.
    pub constants: ConstantPool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{Address, OpCode};

    fn function(code: Vec<Instruction>) -> CompiledFunction {
        CompiledFunction {
            name: "f".into(),
            params: vec![
                ParamInfo {
                    name: "a".into(),
                    has_default: false,
                },
                ParamInfo {
                    name: "b".into(),
                    has_default: true,
                },
            ],
            default_entries: vec![0, 2],
            code,
            lines: Vec::new(),
            types: Vec::new(),
            globals: Vec::new(),
            local_count: 1,
            temp_count: 2,
            is_static: false,
            is_coroutine: false,
            return_type: RuntimeType::Variant,
        }
    }

    #[test]
    fn jump_targets_become_word_offsets() {
        let f = function(vec![
            Instruction::Assign {
                dst: Address::Local(0),
                src: Address::Parameter(0),
            },
            Instruction::Jump { target: 2 },
            Instruction::End,
        ]);
        let words = f.encode();
        // assign: 3 words, jump: 2 words, end at offset 5
        assert_eq!(words[3], OpCode::Jump as u32);
        assert_eq!(words[4], 5);
        assert_eq!(words[5], OpCode::End as u32);
    }

    #[test]
    fn entry_points_follow_argument_count() {
        let f = function(vec![Instruction::End]);
        assert_eq!(f.entry_for(1), Some(0));
        assert_eq!(f.entry_for(2), Some(2));
        assert_eq!(f.entry_for(0), None);
        assert_eq!(f.stack_size(), 5);
    }

    #[test]
    fn enum_values_are_checked_as_ints() {
        let e = gdscript_core::EnumType::new("", "E", vec![]);
        assert_eq!(
            RuntimeType::of(&DataType::enum_value(e)),
            RuntimeType::Builtin(VariantType::Int)
        );
    }
}
