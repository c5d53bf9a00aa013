//! Linker setup for the STM32F407 target.
#![allow(clippy::expect_used)] // build scripts fail by panicking
//!
//! Host builds (tests) link nothing board-specific; only `--features hardware`
//! needs `memory.x` on the linker search path.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../../memory.x");

    if env::var_os("CARGO_FEATURE_HARDWARE").is_none() {
        return;
    }

    let out = PathBuf::from(env::var_os("OUT_DIR").expect("cargo sets OUT_DIR"));
    fs::write(out.join("memory.x"), include_bytes!("../../memory.x"))
        .expect("write memory.x to OUT_DIR");
    println!("cargo:rustc-link-search={}", out.display());
}
