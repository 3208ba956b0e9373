//! Build script (https://doc.rust-lang.org/cargo/reference/build-scripts.html)
//!
//! Generates compile-time metadata (compilation timestamp, compiler version,
//! dependency graph) consumed by `info.rs` for diagnostics. The heavy lifting
//! is delegated to the `built` crate; this script only adds the handful of
//! extra constants `built` doesn't provide on its own.

use chrono::Utc;
use std::{env, fs::OpenOptions, io::Write, path::Path};

fn main() {
    if env::var("DOCS_RS").is_ok() {
        return;
    }

    let out_dir = env::var("OUT_DIR").unwrap();

    built::write_built_file().expect("Failed to acquire build-time information");

    let extra_path = Path::new(&out_dir).join("extra.rs");
    let mut file = OpenOptions::new()
        .truncate(true)
        .write(true)
        .create(true)
        .open(&extra_path)
        .unwrap_or_else(|_| panic!("Can't open '{}'", extra_path.display()));

    let now_utc = Utc::now();
    writeln!(
        file,
        "pub const COMPILATION_DATE: &str = \"{}\";",
        now_utc.format("%b %d %Y")
    )
    .unwrap();
    writeln!(
        file,
        "pub const COMPILATION_TIME: &str = \"{}\";",
        now_utc.format("%H:%M:%S")
    )
    .unwrap();

    println!("cargo:rerun-if-changed=build.rs");
}
