//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, logging setup,
//! and the pipeline runner.

pub mod app;
pub mod args;
pub mod logging;
pub mod presenter;

// Re-export commonly used types
pub use app::{deliver, run, EXIT_ERROR, EXIT_SUCCESS};
pub use args::{parse_args, ParsedArgs, USAGE};
pub use presenter::{Captured, Presenter};
