//! NotifyTool - post macOS notifications from a command-line binary
//!
//! The notification service only talks to processes that look like an
//! installed application. This crate builds a small synthetic application
//! container for the running executable, makes the process report that
//! container as its own identity, then asks for permission and posts the
//! notification.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Identity descriptor, notification value objects, configuration, errors
//! - **Application**: Pipeline stages and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (Foundation, UserNotifications, plist, codesign)
//! - **CLI**: Argument parsing, output formatting, and the pipeline runner

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
