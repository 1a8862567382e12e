//! Identity introspection port interface

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::identity::IdentityDescriptor;

/// Which identity object a query is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleRef {
    /// "What application am I"
    Main,
    /// A container loaded from an explicit path
    At(PathBuf),
}

/// Port for "what application is this" queries.
///
/// The OS's own container loader implements it; the identity shim wraps
/// it to answer for the running process.
pub trait BundleIntrospection: Send + Sync {
    fn container_path(&self, bundle: &BundleRef) -> Option<PathBuf>;

    fn identifier(&self, bundle: &BundleRef) -> Option<String>;
}

impl<T: BundleIntrospection + ?Sized> BundleIntrospection for Arc<T> {
    fn container_path(&self, bundle: &BundleRef) -> Option<PathBuf> {
        self.as_ref().container_path(bundle)
    }

    fn identifier(&self, bundle: &BundleRef) -> Option<String> {
        self.as_ref().identifier(bundle)
    }
}

/// The runtime override could not be applied
#[derive(Debug, Clone, Error)]
#[error("Identity override unavailable: {0}")]
pub struct OverrideUnavailable(pub String);

/// Port for redirecting the OS framework's own identity lookups.
///
/// Applied at most once per process, before the notification service is
/// first touched.
pub trait IdentityOverride: Send + Sync {
    fn apply(&self, descriptor: &IdentityDescriptor) -> Result<(), OverrideUnavailable>;
}

impl<T: IdentityOverride + ?Sized> IdentityOverride for Box<T> {
    fn apply(&self, descriptor: &IdentityDescriptor) -> Result<(), OverrideUnavailable> {
        self.as_ref().apply(descriptor)
    }
}

/// Used where the OS offers no override point
pub struct NoIdentityOverride;

impl IdentityOverride for NoIdentityOverride {
    fn apply(&self, _descriptor: &IdentityDescriptor) -> Result<(), OverrideUnavailable> {
        Err(OverrideUnavailable(
            "no runtime override on this platform".to_string(),
        ))
    }
}
