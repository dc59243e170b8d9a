//! Thread affinity verification for Horizon Outliner.
//!
//! The outliner engine is owned by the single thread that drives the view.
//! Models record that thread when they are created and verify, in debug
//! builds, that every protocol entry point is called from it.
//!
//! ```
//! use horizon_outliner_core::thread_check::ThreadAffinity;
//!
//! struct Outline {
//!     affinity: ThreadAffinity,
//!     expanded: std::cell::Cell<usize>,
//! }
//!
//! impl Outline {
//!     fn expand(&self) {
//!         self.affinity.debug_assert_same_thread();
//!         self.expanded.set(self.expanded.get() + 1);
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

/// Flag to enable/disable runtime thread checks globally.
static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Enable or disable runtime thread checks.
///
/// Checks are enabled in debug builds and disabled in release builds by default.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Check if runtime thread checks are currently enabled.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// Records the thread on which an object was created.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Create a new thread affinity tracker for the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Get the thread ID this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Assert that we are on the same thread as the affinity.
    ///
    /// Always runs, regardless of build profile or the global check flag.
    ///
    /// # Panics
    ///
    /// Panics with a descriptive message if called from a different thread.
    #[inline]
    pub fn assert_same_thread(&self) {
        self.assert_same_thread_with_msg("outliner accessed from a thread other than its owner")
    }

    /// Assert that we are on the same thread, with a custom message.
    ///
    /// # Panics
    ///
    /// Panics if called from a different thread.
    pub fn assert_same_thread_with_msg(&self, msg: &str) {
        if !self.is_same_thread() {
            self.panic_wrong_thread(msg);
        }
    }

    /// Assertion that only runs while thread checks are enabled
    /// (debug builds by default).
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        if are_thread_checks_enabled() {
            self.assert_same_thread();
        }
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self, msg: &str) -> ! {
        let current = std::thread::current();
        let current_name = current.name().unwrap_or("<unnamed>");
        let current_id = current.id();

        panic!(
            "THREAD AFFINITY VIOLATION: {msg}\n\
             Owner thread: {:?}\n\
             Current thread: \"{current_name}\" (ID: {current_id:?})\n\
             Outliner models, items and their backing stores must only be used from the \
             thread that drives the view.",
            self.thread_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_affinity_same_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        affinity.assert_same_thread();
        affinity.debug_assert_same_thread();
    }

    #[test]
    fn test_thread_affinity_different_thread() {
        let affinity = ThreadAffinity::current();
        let seen_same = std::thread::spawn(move || affinity.is_same_thread())
            .join()
            .unwrap();
        assert!(!seen_same);
    }

    #[test]
    fn test_thread_affinity_panic_on_wrong_thread() {
        let affinity = ThreadAffinity::current();

        let result = std::thread::spawn(move || {
            affinity.assert_same_thread();
        })
        .join();

        assert!(result.is_err(), "expected affinity violation to panic");
    }

    #[test]
    fn test_disabled_checks_skip_debug_assert() {
        let affinity = ThreadAffinity::current();
        let previous = are_thread_checks_enabled();

        set_thread_checks_enabled(false);
        assert!(!are_thread_checks_enabled());
        let result = std::thread::spawn(move || affinity.debug_assert_same_thread()).join();
        assert!(result.is_ok(), "disabled checks must not panic");

        set_thread_checks_enabled(true);
        let result = std::thread::spawn(move || affinity.debug_assert_same_thread()).join();
        assert!(result.is_err(), "enabled checks must panic off-thread");

        set_thread_checks_enabled(previous);
    }

    #[test]
    fn test_thread_affinity_default() {
        let affinity = ThreadAffinity::default();
        assert_eq!(affinity.thread_id(), std::thread::current().id());
    }
}
