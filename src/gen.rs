//! Constants describing the current build, generated by `build.rs`.

include!(concat!(env!("OUT_DIR"), "/built.rs"));
include!(concat!(env!("OUT_DIR"), "/extra.rs"));
