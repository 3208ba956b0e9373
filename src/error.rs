//! Error types surfaced by the emulation core.
//!
//! The core is designed so that almost nothing inside the hot emulation
//! loop can fail: bad bus accesses return sentinel values, disabled
//! peripherals degrade gracefully. The only operation that can genuinely
//! fail is restoring a save state from a buffer that doesn't match what
//! the running core expects.

use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A save-state buffer was shorter than the minimum required to hold
    /// the named component's payload.
    BufferUnderrun {
        component: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A save-state payload carried a version tag this build doesn't
    /// know how to interpret.
    UnsupportedVersion { component: &'static str, version: u8 },
    /// Any other condition that doesn't map cleanly onto the above,
    /// carrying a human-readable description.
    CustomError(String),
}

impl Error {
    pub fn description(&self) -> String {
        match self {
            Self::BufferUnderrun {
                component,
                expected,
                actual,
            } => format!(
                "buffer too short for {} state (expected at least {} bytes, got {})",
                component, expected, actual
            ),
            Self::UnsupportedVersion { component, version } => format!(
                "unsupported {} state version: {}",
                component, version
            ),
            Self::CustomError(message) => message.clone(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::error::Error for Error {}
