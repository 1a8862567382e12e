//! codesign / lsregister adapter

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{ToolOutcome, Toolchain};
use crate::domain::config::Settings;

/// Runs the system signing and catalog-registration tools
pub struct SystemToolchain {
    codesign: PathBuf,
    lsregister: PathBuf,
}

impl SystemToolchain {
    /// Create with tool paths from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            codesign: settings.codesign_path.clone(),
            lsregister: settings.lsregister_path.clone(),
        }
    }

    /// Run a tool with output suppressed and wait for it
    async fn run(program: &Path, args: &[&OsStr]) -> ToolOutcome {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => ToolOutcome::Succeeded,
            Ok(status) => ToolOutcome::Failed {
                status: status.to_string(),
            },
            Err(e) => ToolOutcome::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl Toolchain for SystemToolchain {
    async fn sign(&self, container: &Path) -> ToolOutcome {
        Self::run(
            &self.codesign,
            &[
                OsStr::new("--force"),
                OsStr::new("--deep"),
                OsStr::new("--sign"),
                OsStr::new("-"),
                container.as_os_str(),
            ],
        )
        .await
    }

    async fn register(&self, container: &Path) -> ToolOutcome {
        if !self.lsregister.exists() {
            return ToolOutcome::Unavailable {
                reason: format!("{} not found", self.lsregister.display()),
            };
        }
        Self::run(&self.lsregister, &[OsStr::new("-f"), container.as_os_str()]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_signer_is_unavailable() {
        let toolchain = SystemToolchain {
            codesign: PathBuf::from("/nonexistent/codesign"),
            lsregister: PathBuf::from("/nonexistent/lsregister"),
        };
        let outcome = toolchain.sign(Path::new("/tmp/NotifyTool.app")).await;
        assert!(matches!(outcome, ToolOutcome::Unavailable { .. }));
    }

    #[tokio::test]
    async fn missing_registrar_is_skipped() {
        let toolchain = SystemToolchain {
            codesign: PathBuf::from("/nonexistent/codesign"),
            lsregister: PathBuf::from("/nonexistent/lsregister"),
        };
        let outcome = toolchain.register(Path::new("/tmp/NotifyTool.app")).await;
        match outcome {
            ToolOutcome::Unavailable { reason } => assert!(reason.contains("not found")),
            other => panic!("expected unavailable, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_reports_status() {
        let toolchain = SystemToolchain {
            codesign: PathBuf::from("/bin/false"),
            lsregister: PathBuf::from("/bin/false"),
        };
        let outcome = toolchain.sign(Path::new("/tmp/NotifyTool.app")).await;
        assert!(matches!(outcome, ToolOutcome::Failed { .. }));
    }

    #[test]
    fn outcome_display() {
        assert_eq!(ToolOutcome::Succeeded.to_string(), "succeeded");
        assert!(ToolOutcome::Unavailable {
            reason: "nope".into()
        }
        .to_string()
        .contains("nope"));
    }
}
