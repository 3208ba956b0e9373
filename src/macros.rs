//! Logging macros used throughout the core.
//!
//! Both are no-ops unless their feature is enabled, so that the hot
//! emulation loop never pays for formatting it isn't going to use.

/// Verbose tracing, gated behind the `debug` feature.
#[cfg(feature = "debug")]
#[macro_export]
macro_rules! debugln {
    ($($rest:tt)*) => {
        std::println!($($rest)*)
    }
}

#[cfg(not(feature = "debug"))]
#[macro_export]
macro_rules! debugln {
    ($($rest:tt)*) => {
        ()
    };
}

/// Non-fatal anomaly reporting (unknown bus addresses, malformed
/// register writes). Always compiled in, since these indicate a bug
/// in the host or ROM and are cheap to print.
#[macro_export]
macro_rules! warnln {
    ($($rest:tt)*) => {
        std::eprintln!($($rest)*)
    }
}
