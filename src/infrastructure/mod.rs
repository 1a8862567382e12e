//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with Foundation, UserNotifications, plist manifests and
//! the signing/registration tools.

pub mod bundle;
pub mod config;
pub mod manifest;
pub mod notification;
pub mod toolchain;

// Re-export adapters
pub use bundle::{platform_bundles, platform_override, ManifestBundles};
pub use config::XdgConfigStore;
pub use notification::create_notification_center;
pub use toolchain::SystemToolchain;
