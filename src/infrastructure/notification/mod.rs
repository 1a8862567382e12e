//! Notification infrastructure module
//!
//! Only macOS exposes a notification service this tool can talk to;
//! elsewhere the factory reports the platform as unsupported.

#[cfg(target_os = "macos")]
mod user_notifications;

#[cfg(target_os = "macos")]
pub use user_notifications::UserNotificationCenter;

use crate::application::ports::{NotificationCenter, NotificationCenterError};

/// Whether this build can post notifications at all
pub const fn is_supported() -> bool {
    cfg!(target_os = "macos")
}

/// Connect to the notification service for the current platform.
///
/// Call after the identity shim is installed.
#[cfg(target_os = "macos")]
pub fn create_notification_center() -> Result<Box<dyn NotificationCenter>, NotificationCenterError>
{
    Ok(Box::new(UserNotificationCenter::new()?))
}

/// Connect to the notification service for the current platform.
#[cfg(not(target_os = "macos"))]
pub fn create_notification_center() -> Result<Box<dyn NotificationCenter>, NotificationCenterError>
{
    Err(NotificationCenterError::Unavailable(
        "unsupported platform".to_string(),
    ))
}
