//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod bundles;
pub mod config;
pub mod notification_center;
pub mod toolchain;

// Re-export common types
pub use bundles::{BundleIntrospection, BundleRef, IdentityOverride, NoIdentityOverride, OverrideUnavailable};
pub use config::ConfigStore;
pub use notification_center::{NotificationCenter, NotificationCenterError};
pub use toolchain::{ToolOutcome, Toolchain};
