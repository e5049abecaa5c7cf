//! Reentrancy guards for the single-threaded selection logic.
//!
//! Selecting a chapter moves the cursor and fires notifications, and listeners attached to those
//! may try to select again before the first selection finishes. A [`Lockout`] turns such nested
//! attempts into no-ops. The returned guard releases the lock on drop, so early returns, `?` and
//! unwinding all leave it free.

use std::cell::Cell;

#[derive(Debug, Default)]
/// A flag that at most one scope may hold at a time.
pub struct Lockout {
    held: Cell<bool>,
}

impl Lockout {
    #[must_use]
    /// Creates a free lockout.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    /// Takes the lock, or returns `None` when some outer scope already holds it.
    pub fn try_acquire(&self) -> Option<LockoutGuard<'_>> {
        if self.held.replace(true) {
            None
        } else {
            Some(LockoutGuard { held: &self.held })
        }
    }

    #[must_use]
    /// True while a guard is alive.
    pub fn is_held(&self) -> bool {
        self.held.get()
    }
}

#[must_use = "the lockout is released as soon as the guard is dropped"]
/// Holds a [`Lockout`] until dropped.
pub struct LockoutGuard<'a> {
    held: &'a Cell<bool>,
}

impl Drop for LockoutGuard<'_> {
    fn drop(&mut self) {
        debug_assert!(self.held.get(), "lockout released twice");
        self.held.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused() {
        let lockout = Lockout::new();
        let guard = lockout.try_acquire();
        assert!(guard.is_some());
        assert!(lockout.is_held());
        assert!(lockout.try_acquire().is_none());
        drop(guard);
        assert!(!lockout.is_held());
        assert!(lockout.try_acquire().is_some());
    }

    #[test]
    fn test_released_on_early_return() {
        fn bail(lockout: &Lockout) -> Option<()> {
            let _guard = lockout.try_acquire()?;
            let missing: Option<()> = None;
            missing?;
            Some(())
        }

        let lockout = Lockout::new();
        assert!(bail(&lockout).is_none());
        assert!(!lockout.is_held());
    }

    #[test]
    fn test_released_on_unwind() {
        let lockout = Lockout::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = lockout.try_acquire();
            panic!("listener failed");
        }));
        assert!(result.is_err());
        assert!(!lockout.is_held());
    }
}
