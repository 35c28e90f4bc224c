//! Jump management for control flow.
//!
//! Tracks a stack of loop contexts so `break` and `continue` inside nested
//! loops jump to the right place. A `for` loop only knows where `continue`
//! goes after its body is emitted, so continue jumps can be left pending and
//! patched later.

use super::{JumpLabel, LoopError};

/// Manages jump targets for control flow.
#[derive(Debug, Default)]
pub struct JumpManager {
    /// Innermost last.
    loops: Vec<LoopContext>,
}

#[derive(Debug)]
struct LoopContext {
    /// Known target for `continue`, if any yet.
    continue_target: Option<u32>,
    continue_labels: Vec<JumpLabel>,
    /// Patched past the loop on exit.
    break_labels: Vec<JumpLabel>,
}

/// Jumps left to patch when a loop is exited.
#[derive(Debug, Default)]
pub struct LoopExit {
    pub breaks: Vec<JumpLabel>,
    pub continues: Vec<JumpLabel>,
}

impl JumpManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_loop(&mut self, continue_target: Option<u32>) {
        self.loops.push(LoopContext {
            continue_target,
            continue_labels: Vec::new(),
            break_labels: Vec::new(),
        });
    }

    pub fn exit_loop(&mut self) -> LoopExit {
        self.loops
            .pop()
            .map(|ctx| LoopExit {
                breaks: ctx.break_labels,
                continues: ctx.continue_labels,
            })
            .unwrap_or_default()
    }

    pub fn in_loop(&self) -> bool {
        !self.loops.is_empty()
    }

    pub fn add_break(&mut self, label: JumpLabel) {
        if let Some(ctx) = self.loops.last_mut() {
            ctx.break_labels.push(label);
        }
    }

    pub fn add_continue(&mut self, label: JumpLabel) {
        if let Some(ctx) = self.loops.last_mut() {
            ctx.continue_labels.push(label);
        }
    }

    /// Fix the continue target of the current loop, returning the jumps
    /// emitted before it was known.
    pub fn set_continue_target(&mut self, target: u32) -> Vec<JumpLabel> {
        match self.loops.last_mut() {
            Some(ctx) => {
                ctx.continue_target = Some(target);
                std::mem::take(&mut ctx.continue_labels)
            }
            None => Vec::new(),
        }
    }

    /// `Ok(None)` when the current loop's target is not known yet.
    pub fn continue_target(&self) -> Result<Option<u32>, LoopError> {
        self.loops
            .last()
            .map(|ctx| ctx.continue_target)
            .ok_or(LoopError::NotInLoop)
    }

    pub fn loop_depth(&self) -> usize {
        self.loops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manager_not_in_loop() {
        let manager = JumpManager::new();
        assert!(!manager.in_loop());
        assert_eq!(manager.loop_depth(), 0);
    }

    #[test]
    fn nested_loops() {
        let mut manager = JumpManager::new();
        manager.enter_loop(Some(10));
        manager.enter_loop(Some(20));
        assert_eq!(manager.continue_target(), Ok(Some(20)));

        manager.exit_loop();
        assert_eq!(manager.loop_depth(), 1);
        assert_eq!(manager.continue_target(), Ok(Some(10)));
    }

    #[test]
    fn exit_loop_returns_breaks() {
        let mut manager = JumpManager::new();
        manager.enter_loop(Some(0));
        manager.add_break(JumpLabel(4));
        manager.add_break(JumpLabel(9));

        let exit = manager.exit_loop();
        assert_eq!(exit.breaks, vec![JumpLabel(4), JumpLabel(9)]);
        assert!(exit.continues.is_empty());
    }

    #[test]
    fn pending_continues_are_handed_back() {
        let mut manager = JumpManager::new();
        manager.enter_loop(None);
        assert_eq!(manager.continue_target(), Ok(None));
        manager.add_continue(JumpLabel(3));

        assert_eq!(manager.set_continue_target(7), vec![JumpLabel(3)]);
        assert_eq!(manager.continue_target(), Ok(Some(7)));
    }

    #[test]
    fn continue_target_error_outside_loop() {
        let manager = JumpManager::new();
        assert_eq!(manager.continue_target(), Err(LoopError::NotInLoop));
    }
}
