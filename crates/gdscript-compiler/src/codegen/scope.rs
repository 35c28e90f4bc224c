//! Local slot allocation for function compilation.
//!
//! Locals are keyed by the node that declares them, as classified by the
//! binder, so shadowed names never collide. Slots of a block are reused
//! once the block ends; the frame size covers the deepest nesting.

use gdscript_ast::{PatternId, StmtId};
use rustc_hash::FxHashMap;

/// The declaration a local slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalKey {
    /// `var` statement or `for` iterator.
    Stmt(StmtId),
    /// `var` binding in a match pattern.
    Pattern(PatternId),
    /// Compiler-internal slot (loop state, match subject).
    Hidden(u32),
}

#[derive(Debug, Default)]
pub struct LocalScope {
    slots: FxHashMap<LocalKey, u32>,
    /// Keys declared per open block, innermost last.
    blocks: Vec<Vec<LocalKey>>,
    next_slot: u32,
    max_slot: u32,
    hidden: u32,
}

impl LocalScope {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Scope Management
    // ==========================================================================

    pub fn push_scope(&mut self) {
        self.blocks.push(Vec::new());
    }

    /// Close the innermost block and free its slots.
    pub fn pop_scope(&mut self) {
        let Some(keys) = self.blocks.pop() else {
            return;
        };
        for key in &keys {
            self.slots.remove(key);
        }
        self.next_slot -= keys.len() as u32;
    }

    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    // ==========================================================================
    // Declaration
    // ==========================================================================

    /// Slot for a declaration; redeclaring returns the same slot.
    pub fn declare(&mut self, key: LocalKey) -> u32 {
        if let Some(&slot) = self.slots.get(&key) {
            return slot;
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        self.max_slot = self.max_slot.max(self.next_slot);
        self.slots.insert(key, slot);
        // outside any block the slot lives for the whole function
        if let Some(block) = self.blocks.last_mut() {
            block.push(key);
        }
        slot
    }

    /// A slot not tied to any source declaration.
    pub fn declare_hidden(&mut self) -> u32 {
        let key = LocalKey::Hidden(self.hidden);
        self.hidden += 1;
        self.declare(key)
    }

    pub fn get(&self, key: LocalKey) -> Option<u32> {
        self.slots.get(&key).copied()
    }

    /// Slots needed by the function.
    pub fn frame_size(&self) -> u32 {
        self.max_slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_blocks_share_slots() {
        let mut scope = LocalScope::new();
        scope.push_scope();
        let a = scope.declare(LocalKey::Stmt(StmtId(1)));
        scope.pop_scope();
        scope.push_scope();
        let b = scope.declare(LocalKey::Stmt(StmtId(2)));
        scope.pop_scope();

        assert_eq!(a, b);
        assert_eq!(scope.frame_size(), 1);
        assert_eq!(scope.get(LocalKey::Stmt(StmtId(1))), None);
    }

    #[test]
    fn nested_blocks_need_more_slots() {
        let mut scope = LocalScope::new();
        scope.push_scope();
        scope.declare(LocalKey::Stmt(StmtId(1)));
        scope.push_scope();
        let inner = scope.declare(LocalKey::Pattern(PatternId(0)));
        let hidden = scope.declare_hidden();
        scope.pop_scope();
        scope.pop_scope();

        assert_eq!(inner, 1);
        assert_eq!(hidden, 2);
        assert_eq!(scope.frame_size(), 3);
        assert_eq!(scope.depth(), 0);
    }

    #[test]
    fn declaring_twice_keeps_the_slot() {
        let mut scope = LocalScope::new();
        scope.push_scope();
        let key = LocalKey::Stmt(StmtId(5));
        assert_eq!(scope.declare(key), scope.declare(key));
        assert_eq!(scope.frame_size(), 1);
    }
}
