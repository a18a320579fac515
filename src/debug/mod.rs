// src/debug/mod.rs

//! The `debug` module is functions and macros for printing in debug builds
//! and test builds.

#[cfg(test)]
pub mod helpers;

pub mod printers;
