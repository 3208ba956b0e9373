//! General information about the crate and the emulator it implements.

use crate::gen::{COMPILATION_DATE, COMPILATION_TIME, PKG_NAME, PKG_VERSION, RUSTC_VERSION};

/// Static accessors for build and version metadata, useful for
/// diagnostics and about screens in host applications.
pub struct Info;

impl Info {
    /// Name of the crate as declared in `Cargo.toml`.
    pub fn name() -> String {
        String::from(PKG_NAME)
    }

    /// Version of the crate as declared in `Cargo.toml`.
    pub fn version() -> String {
        String::from(PKG_VERSION)
    }

    /// Name of the hardware system this crate emulates.
    pub fn system() -> String {
        String::from("Game Boy")
    }

    /// Version of the Rust compiler used to build this crate.
    pub fn compiler_version() -> String {
        String::from(RUSTC_VERSION)
    }

    /// Date at which the crate was compiled.
    pub fn compilation_date() -> String {
        String::from(COMPILATION_DATE)
    }

    /// Time at which the crate was compiled.
    pub fn compilation_time() -> String {
        String::from(COMPILATION_TIME)
    }
}
