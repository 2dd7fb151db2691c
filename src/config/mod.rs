//! Command manifests
//!
//! This module handles parsing of YAML command manifests, their validation,
//! and turning them into command trees.

pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use types::*;
