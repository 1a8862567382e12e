//! Synthetic application container provisioning
//!
//! Makes sure an application container for this executable exists on
//! disk, is current, is signed, and is registered with the OS. Every step
//! is best-effort: failures are logged and recorded, never returned.

use std::path::{Path, PathBuf};

use plist::Value;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::domain::config::Settings;
use crate::domain::identity::{ContainerLayout, IdentityDescriptor};
use crate::infrastructure::manifest::{self, ManifestDefaults};

use super::ports::{BundleIntrospection, BundleRef, ToolOutcome, Toolchain};

/// A provisioning step that failed without stopping the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Degradation {
    #[error("Failed to remove stale container: {0}")]
    RemoveStale(String),

    #[error("Failed to create container directories: {0}")]
    CreateDirs(String),

    #[error("Manifest template unusable: {0}")]
    Template(String),

    #[error("Failed to write manifest: {0}")]
    WriteManifest(String),

    #[error("Failed to create bundle at {0}")]
    Unloadable(PathBuf),

    #[error("Bundle identifier not set correctly (expected {expected}, found {found})")]
    IdentifierMismatch { expected: String, found: String },

    #[error("Failed to copy executable: {0}")]
    CopyExecutable(String),

    #[error("Signing {0}")]
    Signing(ToolOutcome),

    #[error("Registration {0}")]
    Registration(ToolOutcome),
}

/// What a rebuild did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub template: Option<PathBuf>,
    pub degraded: Vec<Degradation>,
    pub signing: Option<ToolOutcome>,
    pub registration: Option<ToolOutcome>,
}

impl ProvisionReport {
    fn degrade(&mut self, degradation: Degradation) {
        warn!("{}", degradation);
        self.degraded.push(degradation);
    }

    pub fn is_clean(&self) -> bool {
        self.degraded.is_empty()
    }
}

/// How the identity was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The executable already runs from inside an application container
    AlreadyInstalled(IdentityDescriptor),
    /// The synthetic container was current
    Reused(IdentityDescriptor),
    /// The synthetic container was (re)built
    Rebuilt {
        descriptor: IdentityDescriptor,
        report: ProvisionReport,
    },
}

impl ProvisionOutcome {
    pub fn descriptor(&self) -> &IdentityDescriptor {
        match self {
            Self::AlreadyInstalled(descriptor) | Self::Reused(descriptor) => descriptor,
            Self::Rebuilt { descriptor, .. } => descriptor,
        }
    }

    /// True when the process must impersonate the container
    pub fn is_synthetic(&self) -> bool {
        !matches!(self, Self::AlreadyInstalled(_))
    }
}

/// Builds and maintains the synthetic application container
pub struct IdentityProvisioner<T, B>
where
    T: Toolchain,
    B: BundleIntrospection,
{
    toolchain: T,
    loader: B,
    container: PathBuf,
    bundle_name: String,
    default_identifier: String,
    home: Option<PathBuf>,
}

impl<T, B> IdentityProvisioner<T, B>
where
    T: Toolchain,
    B: BundleIntrospection,
{
    /// Create a provisioner
    ///
    /// # Arguments
    /// * `toolchain` - Signing and registration tools
    /// * `loader` - The OS container loader, used to verify the manifest
    /// * `settings` - Container location, name, and default identifier
    pub fn new(toolchain: T, loader: B, settings: &Settings) -> Self {
        Self {
            toolchain,
            loader,
            container: settings.container_path(),
            bundle_name: settings.bundle_name.clone(),
            default_identifier: settings.bundle_identifier.clone(),
            home: dirs::home_dir(),
        }
    }

    /// Override the home directory bounding the manifest template search
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Where the synthetic container lives
    pub fn container_path(&self) -> &Path {
        &self.container
    }

    /// Produce the identity for the executable at `executable`.
    pub async fn provision(&self, executable: &Path) -> ProvisionOutcome {
        let executable_name = executable
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.bundle_name.to_lowercase());
        let fingerprint = file_size(executable).await.unwrap_or(0);

        if let Some(container) = ContainerLayout::enclosing(executable) {
            let identifier = self
                .loader
                .identifier(&BundleRef::At(container.clone()))
                .unwrap_or_else(|| self.default_identifier.clone());
            debug!(container = %container.display(), "running from an installed container");
            return ProvisionOutcome::AlreadyInstalled(IdentityDescriptor {
                container_path: container,
                identifier,
                executable_name,
                fingerprint,
            });
        }

        let layout = ContainerLayout::new(&self.container);

        if let Some(identifier) = self.current_identifier(&layout, &executable_name, fingerprint).await {
            debug!(container = %self.container.display(), "container is current");
            return ProvisionOutcome::Reused(IdentityDescriptor {
                container_path: self.container.clone(),
                identifier,
                executable_name,
                fingerprint,
            });
        }

        info!(container = %self.container.display(), "building application container");
        let (identifier, report) = self.rebuild(executable, &layout, &executable_name).await;

        ProvisionOutcome::Rebuilt {
            descriptor: IdentityDescriptor {
                container_path: self.container.clone(),
                identifier,
                executable_name,
                fingerprint,
            },
            report,
        }
    }

    /// Identifier of the existing container, if it can be reused as is.
    ///
    /// Only the executable's byte size is compared. A container built for
    /// a different configured identifier is never reused.
    async fn current_identifier(
        &self,
        layout: &ContainerLayout<'_>,
        executable_name: &str,
        fingerprint: u64,
    ) -> Option<String> {
        let copy_size = file_size(&layout.executable_path(executable_name)).await?;
        if copy_size != fingerprint {
            debug!(live = fingerprint, copy = copy_size, "executable changed");
            return None;
        }

        let manifest = manifest::read(&layout.manifest_path()).ok()?;
        let built_for = manifest::configured_identifier(&manifest);
        if built_for != Some(self.default_identifier.as_str()) {
            debug!(built_for = ?built_for, configured = %self.default_identifier, "identifier changed");
            return None;
        }
        manifest::identifier(&manifest)
    }

    async fn rebuild(
        &self,
        executable: &Path,
        layout: &ContainerLayout<'_>,
        executable_name: &str,
    ) -> (String, ProvisionReport) {
        let mut report = ProvisionReport::default();
        let root = layout.root();

        if fs::try_exists(root).await.unwrap_or(false) {
            if let Err(e) = fs::remove_dir_all(root).await {
                report.degrade(Degradation::RemoveStale(e.to_string()));
            }
        }
        if let Err(e) = fs::create_dir_all(layout.executables_dir()).await {
            report.degrade(Degradation::CreateDirs(e.to_string()));
        }

        // Manifest: discovered template over required defaults
        let template_path = executable
            .parent()
            .and_then(|dir| manifest::find_template(dir, self.home.as_deref()));
        let template = match &template_path {
            Some(path) => match manifest::read(path) {
                Ok(dict) => {
                    debug!(template = %path.display(), "using manifest template");
                    report.template = Some(path.clone());
                    Some(dict)
                }
                Err(e) => {
                    report.degrade(Degradation::Template(e.to_string()));
                    None
                }
            },
            None => None,
        };
        let defaults = ManifestDefaults {
            identifier: &self.default_identifier,
            name: &self.bundle_name,
            executable: executable_name,
        };
        let mut merged = manifest::merge(template, defaults.to_dictionary());
        merged.insert(
            manifest::KEY_CONFIGURED_IDENTIFIER.to_string(),
            Value::from(self.default_identifier.as_str()),
        );
        let identifier =
            manifest::identifier(&merged).unwrap_or_else(|| self.default_identifier.clone());

        if let Err(e) = manifest::write(&layout.manifest_path(), &merged) {
            report.degrade(Degradation::WriteManifest(e.to_string()));
        }

        match self.loader.identifier(&BundleRef::At(root.to_path_buf())) {
            Some(found) if found == identifier => {}
            Some(found) => report.degrade(Degradation::IdentifierMismatch {
                expected: identifier.clone(),
                found,
            }),
            None => report.degrade(Degradation::Unloadable(root.to_path_buf())),
        }

        let target = layout.executable_path(executable_name);
        if let Err(e) = install_executable(executable, &target).await {
            report.degrade(Degradation::CopyExecutable(e.to_string()));
        }

        let signing = self.toolchain.sign(root).await;
        log_tool("codesign", root, &signing);
        if !signing.is_success() {
            report.degrade(Degradation::Signing(signing.clone()));
        }
        report.signing = Some(signing);

        let registration = self.toolchain.register(root).await;
        log_tool("lsregister", root, &registration);
        if !registration.is_success() {
            report.degrade(Degradation::Registration(registration.clone()));
        }
        report.registration = Some(registration);

        (identifier, report)
    }
}

async fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).await.ok().map(|meta| meta.len())
}

/// Copy the executable into the container and mark it executable
async fn install_executable(source: &Path, target: &Path) -> std::io::Result<()> {
    let _ = fs::remove_file(target).await;
    fs::copy(source, target).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(target, std::fs::Permissions::from_mode(0o755)).await?;
    }

    Ok(())
}

fn log_tool(tool: &str, container: &Path, outcome: &ToolOutcome) {
    if outcome.is_success() {
        debug!(tool, container = %container.display(), status = %outcome, "external tool finished");
    } else {
        warn!(tool, container = %container.display(), status = %outcome, "external tool did not succeed");
    }
}
