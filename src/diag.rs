//! Diagnostic macros for conditions that indicate a bug in the core
//! itself (an unimplemented opcode, an invariant violation) rather than
//! a bus access a real DMG would also tolerate.
//!
//! Unlike a malformed ROM or an out-of-range bus read, these are dev-time
//! bugs: reaching them means an instruction or register combination
//! wasn't implemented, so panicking with context is more useful than
//! trying to limp forward.

/// Panics with a formatted message, used for opcodes or states that
/// should be unreachable in a complete implementation.
#[macro_export]
macro_rules! panic_gb {
    ($($arg:tt)*) => {
        panic!($($arg)*)
    };
}

/// Debug-only assertion, compiled out entirely in release builds unless
/// the `pedantic` feature is enabled. Used for invariants that are
/// expensive to check on every step (e.g. bank-index bounds) but worth
/// catching during development.
#[cfg(feature = "pedantic")]
#[macro_export]
macro_rules! assert_gb {
    ($cond:expr, $($arg:tt)*) => {
        assert!($cond, $($arg)*)
    };
}

#[cfg(not(feature = "pedantic"))]
#[macro_export]
macro_rules! assert_gb {
    ($cond:expr, $($arg:tt)*) => {
        ()
    };
}
