// Public modules
pub mod bootstrap;
pub mod console;
pub mod defaults;
pub mod error;
pub mod interrupt;
pub mod invocation;
pub mod readiness;
pub mod runner;
pub mod scaffold;
pub mod shell;

// Path resolution for config files
pub mod paths;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
