//! Application layer - Use cases and port interfaces
//!
//! Contains the four pipeline stages (provision, identity shim,
//! permission, dispatch) and the trait definitions for external systems.

pub mod dispatch;
pub mod identity;
pub mod permission;
pub mod ports;
pub mod provision;

// Re-export use cases
pub use dispatch::{DispatchCallbacks, DispatchOptions, DispatchReport, NotificationDispatcher};
pub use identity::{IdentityContext, IdentityShim, PassThroughIdentity, SyntheticIdentity};
pub use permission::{PermissionCallbacks, PermissionGrant, PermissionOrchestrator};
pub use provision::{Degradation, IdentityProvisioner, ProvisionOutcome, ProvisionReport};
