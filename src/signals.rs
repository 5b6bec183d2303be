//! Interrupt handling
//!
//! The Ctrl+C handler only sets a flag; sending loops check it between
//! requests so a run stops at a request boundary.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[inline]
pub fn was_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

#[inline]
pub fn set_interrupted() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

#[inline]
pub fn reset_interrupted() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_flag() {
        reset_interrupted();
        assert!(!was_interrupted());

        set_interrupted();
        assert!(was_interrupted());

        reset_interrupted();
        assert!(!was_interrupted());
    }
}
