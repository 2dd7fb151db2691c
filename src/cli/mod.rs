//! Demo command-line tool
//!
//! This module wires a small command tree together to exercise the library
//! from a real binary.

pub mod app;

// Re-export main types
pub use app::*;
