//! Identity shim
//!
//! Makes "what application am I" queries answer with the synthetic
//! container while leaving queries about any other container alone.
//! Two strategies exist: pass-through when the executable already lives in
//! a real container, and synthetic when it had to be provisioned.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::domain::identity::IdentityDescriptor;

use super::ports::{BundleIntrospection, BundleRef, IdentityOverride};
use super::provision::ProvisionOutcome;

/// Answers every query the way the OS does
pub struct PassThroughIdentity<B: BundleIntrospection> {
    os: B,
}

impl<B: BundleIntrospection> PassThroughIdentity<B> {
    pub fn new(os: B) -> Self {
        Self { os }
    }
}

impl<B: BundleIntrospection> BundleIntrospection for PassThroughIdentity<B> {
    fn container_path(&self, bundle: &BundleRef) -> Option<PathBuf> {
        self.os.container_path(bundle)
    }

    fn identifier(&self, bundle: &BundleRef) -> Option<String> {
        self.os.identifier(bundle)
    }
}

/// Reports the synthetic container as the running process's own identity
pub struct SyntheticIdentity<B: BundleIntrospection> {
    descriptor: IdentityDescriptor,
    os: B,
}

impl<B: BundleIntrospection> SyntheticIdentity<B> {
    pub fn new(descriptor: IdentityDescriptor, os: B) -> Self {
        Self { descriptor, os }
    }
}

impl<B: BundleIntrospection> BundleIntrospection for SyntheticIdentity<B> {
    fn container_path(&self, bundle: &BundleRef) -> Option<PathBuf> {
        match bundle {
            BundleRef::Main => Some(self.descriptor.container_path.clone()),
            other => self.os.container_path(other),
        }
    }

    fn identifier(&self, bundle: &BundleRef) -> Option<String> {
        match bundle {
            BundleRef::Main => Some(self.descriptor.identifier.clone()),
            other => self.os.identifier(other),
        }
    }
}

/// The identity every later stage runs under.
///
/// Only obtainable from [`IdentityShim::install`], so holding one means the
/// override has been put in place.
#[derive(Clone)]
pub struct IdentityContext {
    descriptor: IdentityDescriptor,
    resolver: Arc<dyn BundleIntrospection>,
    synthetic: bool,
    runtime_override: bool,
}

impl IdentityContext {
    pub fn descriptor(&self) -> &IdentityDescriptor {
        &self.descriptor
    }

    /// Container the process reports as its own
    pub fn container_path(&self) -> Option<PathBuf> {
        self.resolver.container_path(&BundleRef::Main)
    }

    /// Identifier the process reports as its own
    pub fn identifier(&self) -> Option<String> {
        self.resolver.identifier(&BundleRef::Main)
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Whether the OS framework's own lookups were redirected too
    pub fn has_runtime_override(&self) -> bool {
        self.runtime_override
    }
}

/// Installs the identity strategy for this process
pub struct IdentityShim<O: IdentityOverride> {
    runtime: O,
}

impl<O: IdentityOverride> IdentityShim<O> {
    pub fn new(runtime: O) -> Self {
        Self { runtime }
    }

    /// Select and install the strategy matching how the identity was
    /// obtained. Must run before anything touches the notification service.
    pub fn install(
        &self,
        outcome: &ProvisionOutcome,
        os: Arc<dyn BundleIntrospection>,
    ) -> IdentityContext {
        let descriptor = outcome.descriptor().clone();

        if !outcome.is_synthetic() {
            return IdentityContext {
                descriptor,
                resolver: Arc::new(PassThroughIdentity::new(os)),
                synthetic: false,
                runtime_override: false,
            };
        }

        let runtime_override = match self.runtime.apply(&descriptor) {
            Ok(()) => true,
            Err(e) => {
                debug!("{}", e);
                false
            }
        };

        IdentityContext {
            resolver: Arc::new(SyntheticIdentity::new(descriptor.clone(), os)),
            descriptor,
            synthetic: true,
            runtime_override,
        }
    }
}
