//! Notification service port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::notification::{AuthorizationResponse, AuthorizationState, NotificationRequest};

/// Notification service errors
#[derive(Debug, Clone, Error)]
pub enum NotificationCenterError {
    #[error("{0}")]
    Rejected(String),

    #[error("Notification service unavailable: {0}")]
    Unavailable(String),
}

/// Port for the OS notification service.
///
/// Each method wraps one callback-based OS call. Implementations resolve
/// when the OS calls back and may never resolve if it does not; callers
/// bound every call with a timeout.
#[async_trait]
pub trait NotificationCenter: Send + Sync {
    /// Ask the OS to show notifications even while this process is
    /// considered foreground.
    fn install_presentation_policy(&self);

    /// Current authorization status for this identity
    async fn authorization_status(&self) -> AuthorizationState;

    /// Request alert, sound, and badge permission from the user
    async fn request_authorization(&self) -> AuthorizationResponse;

    /// Hand a request to the service for delivery
    async fn schedule(&self, request: &NotificationRequest) -> Result<(), NotificationCenterError>;

    /// Identifiers of notifications currently shown in Notification Center
    async fn delivered_identifiers(&self) -> Vec<String>;
}

/// Blanket implementation for boxed notification center types
#[async_trait]
impl NotificationCenter for Box<dyn NotificationCenter> {
    fn install_presentation_policy(&self) {
        self.as_ref().install_presentation_policy()
    }

    async fn authorization_status(&self) -> AuthorizationState {
        self.as_ref().authorization_status().await
    }

    async fn request_authorization(&self) -> AuthorizationResponse {
        self.as_ref().request_authorization().await
    }

    async fn schedule(&self, request: &NotificationRequest) -> Result<(), NotificationCenterError> {
        self.as_ref().schedule(request).await
    }

    async fn delivered_identifiers(&self) -> Vec<String> {
        self.as_ref().delivered_identifiers().await
    }
}
