//! Signing and registration tool port interface

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

/// What happened when an external tool ran.
///
/// Never an error: the pipeline degrades instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Succeeded,
    /// Ran, exited unsuccessfully
    Failed { status: String },
    /// Could not be started at all
    Unavailable { reason: String },
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed { status } => write!(f, "failed ({})", status),
            Self::Unavailable { reason } => write!(f, "unavailable ({})", reason),
        }
    }
}

/// Port for the external tools that make a container trustworthy to the OS
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Ad-hoc sign the whole container
    async fn sign(&self, container: &Path) -> ToolOutcome;

    /// Announce the container to the OS application catalog
    async fn register(&self, container: &Path) -> ToolOutcome;
}
