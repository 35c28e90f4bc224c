//! Temporary slot allocation.
//!
//! Temporaries hold intermediate values. They are handed out and released
//! strictly last-in first-out, so the live temporaries always occupy the
//! slots `0..depth`.

use thiserror::Error;

use crate::bytecode::Address;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TempError {
    #[error("released {released} but the top temporary is {top:?}")]
    NotTop { released: Address, top: Option<u32> },
    #[error("{0} is not a temporary")]
    NotTemporary(Address),
}

#[derive(Debug, Default)]
pub struct TempStack {
    depth: u32,
    max_depth: u32,
    pushes: u32,
    pops: u32,
}

impl TempStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self) -> Address {
        let slot = self.depth;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.pushes += 1;
        Address::Temporary(slot)
    }

    /// Release the top temporary.
    pub fn pop(&mut self, address: Address) -> Result<(), TempError> {
        let Address::Temporary(slot) = address else {
            return Err(TempError::NotTemporary(address));
        };
        if self.depth == 0 || slot != self.depth - 1 {
            return Err(TempError::NotTop {
                released: address,
                top: self.depth.checked_sub(1),
            });
        }
        self.depth -= 1;
        self.pops += 1;
        Ok(())
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Slots needed for the whole function.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn is_balanced(&self) -> bool {
        self.depth == 0 && self.pushes == self.pops
    }

    pub fn pushes(&self) -> u32 {
        self.pushes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_in_first_out() {
        let mut temps = TempStack::new();
        let a = temps.push();
        let b = temps.push();
        assert_eq!(b, Address::Temporary(1));
        assert!(temps.pop(a).is_err());
        temps.pop(b).unwrap();
        temps.pop(a).unwrap();
        assert!(temps.is_balanced());
        assert_eq!(temps.max_depth(), 2);
    }

    #[test]
    fn slots_are_reused_after_release() {
        let mut temps = TempStack::new();
        let a = temps.push();
        temps.pop(a).unwrap();
        assert_eq!(temps.push(), a);
        assert_eq!(temps.max_depth(), 1);
    }

    #[test]
    fn only_temporaries_are_released() {
        let mut temps = TempStack::new();
        temps.push();
        assert_eq!(
            temps.pop(Address::Local(0)),
            Err(TempError::NotTemporary(Address::Local(0)))
        );
    }
}
