//! Notification permission use case

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::config::Timeouts;
use crate::domain::error::PermissionDenial;
use crate::domain::notification::AuthorizationState;

use super::ports::NotificationCenter;

/// How permission was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionGrant {
    /// The user had already allowed notifications
    AlreadyAuthorized,
    /// Status was provisional, unknown, or did not arrive in time
    Assumed,
    /// The user just allowed notifications
    Granted,
}

/// Callbacks for the interactive part of the flow
#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct PermissionCallbacks {
    /// Called before the consent prompt is requested
    pub on_request_start: Option<Box<dyn Fn() + Send + Sync>>,
    /// Called once the consent wait resolves, whatever the result
    pub on_request_end: Option<Box<dyn Fn() + Send + Sync>>,
}

/// Checks and, if needed, requests notification permission.
///
/// The status query gets a short bound so an unresponsive service cannot
/// hang the process; the consent request gets a long one because a person
/// has to answer it.
pub struct PermissionOrchestrator<'a, C: NotificationCenter> {
    center: &'a C,
    timeouts: Timeouts,
}

impl<'a, C: NotificationCenter> PermissionOrchestrator<'a, C> {
    pub fn new(center: &'a C, timeouts: Timeouts) -> Self {
        Self { center, timeouts }
    }

    /// Make sure notifications may be posted
    pub async fn ensure_permission(
        &self,
        callbacks: &PermissionCallbacks,
    ) -> Result<PermissionGrant, PermissionDenial> {
        let state = self.query_status().await;
        debug!(%state, "authorization status");

        match state {
            AuthorizationState::NotDetermined => self.request(callbacks).await,
            AuthorizationState::Denied => Err(PermissionDenial::PreviouslyDenied),
            AuthorizationState::Authorized => Ok(PermissionGrant::AlreadyAuthorized),
            AuthorizationState::Other => Ok(PermissionGrant::Assumed),
        }
    }

    async fn query_status(&self) -> AuthorizationState {
        match timeout(self.timeouts.status_query, self.center.authorization_status()).await {
            Ok(state) => state,
            Err(_) => {
                warn!(
                    "authorization status not reported within {:?}, continuing",
                    self.timeouts.status_query
                );
                AuthorizationState::Other
            }
        }
    }

    async fn request(
        &self,
        callbacks: &PermissionCallbacks,
    ) -> Result<PermissionGrant, PermissionDenial> {
        if let Some(ref cb) = callbacks.on_request_start {
            cb();
        }

        let response = timeout(self.timeouts.consent, self.center.request_authorization()).await;

        if let Some(ref cb) = callbacks.on_request_end {
            cb();
        }

        match response {
            Err(_) => Err(PermissionDenial::TimedOut),
            Ok(response) if response.granted => {
                if let Some(error) = response.error {
                    warn!("authorization granted with error: {}", error);
                }
                Ok(PermissionGrant::Granted)
            }
            Ok(response) => Err(PermissionDenial::Denied {
                reason: response.error,
            }),
        }
    }
}
