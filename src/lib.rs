//! ssevolution application library
//!
//! Wires the corpus and database modules into the kernel registry.

pub mod modules;

pub use modules::*;
