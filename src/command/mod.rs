//! Command trees, typed flags and parsed arguments
//!
//! Hosts declare [`Options`] and [`FlagOptions`], compose [`Command`] nodes
//! bottom-up and execute the root once.

pub mod args;
pub mod cmd;
pub mod flag;
pub mod options;

// Re-export main types
pub use args::*;
pub use cmd::*;
pub use flag::*;
pub use options::*;
