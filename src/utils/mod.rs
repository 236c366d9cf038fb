//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Command line splitting and process output decoding
//! - `validation` - Input validation helpers

pub mod command;
pub mod validation;
