//! Identity introspection adapters
//!
//! `ManifestBundles` reads container manifests straight from disk and
//! works everywhere. On macOS, `FoundationBundles` asks Foundation's own
//! container loader and `BundleOverride` redirects Foundation's answer for
//! the running process.

#[cfg(target_os = "macos")]
mod foundation;
mod manifest_bundles;
#[cfg(target_os = "macos")]
mod runtime_override;

#[cfg(target_os = "macos")]
pub use foundation::FoundationBundles;
pub use manifest_bundles::ManifestBundles;
#[cfg(target_os = "macos")]
pub use runtime_override::BundleOverride;

use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{BundleIntrospection, IdentityOverride};

/// The OS container loader for the current platform
#[cfg(target_os = "macos")]
pub fn platform_bundles(_executable: &Path) -> Arc<dyn BundleIntrospection> {
    Arc::new(FoundationBundles)
}

/// The OS container loader for the current platform
#[cfg(not(target_os = "macos"))]
pub fn platform_bundles(executable: &Path) -> Arc<dyn BundleIntrospection> {
    Arc::new(ManifestBundles::new(executable))
}

/// The runtime identity override for the current platform
#[cfg(target_os = "macos")]
pub fn platform_override() -> Box<dyn IdentityOverride> {
    Box::new(BundleOverride)
}

/// The runtime identity override for the current platform
#[cfg(not(target_os = "macos"))]
pub fn platform_override() -> Box<dyn IdentityOverride> {
    Box::new(crate::application::ports::NoIdentityOverride)
}
