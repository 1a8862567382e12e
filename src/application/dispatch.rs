//! Notification dispatch use case

use tokio::time::{sleep, timeout};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::config::Timeouts;
use crate::domain::notification::{DeliveryOutcome, NotificationRequest, NotifyConfig};

use super::identity::IdentityContext;
use super::ports::NotificationCenter;

/// Dispatch tuning
#[derive(Debug, Clone, Copy)]
pub struct DispatchOptions {
    pub timeouts: Timeouts,
    /// Check the delivered list after scheduling
    pub confirm_delivery: bool,
    /// Mark the notification time-sensitive where supported
    pub time_sensitive: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            timeouts: Timeouts::default(),
            confirm_delivery: true,
            time_sensitive: true,
        }
    }
}

/// Result of one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub request_id: String,
    pub outcome: DeliveryOutcome,
}

/// Callbacks for progress updates
#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct DispatchCallbacks {
    /// Called with the request id as soon as the service accepts it
    pub on_scheduled: Option<Box<dyn Fn(&str) + Send + Sync>>,
}

/// Build a request with a fresh identifier
pub fn build_request(config: &NotifyConfig, options: &DispatchOptions) -> NotificationRequest {
    NotificationRequest {
        identifier: Uuid::new_v4().to_string().to_uppercase(),
        title: config.title.clone(),
        subtitle: config.subtitle.clone(),
        body: config.body.clone(),
        sound: config.sound.into(),
        time_sensitive: options.time_sensitive,
        trigger_delay: options.timeouts.trigger_delay,
    }
}

/// Schedules one notification and confirms its delivery
pub struct NotificationDispatcher<'a, C: NotificationCenter> {
    center: &'a C,
    options: DispatchOptions,
}

impl<'a, C: NotificationCenter> NotificationDispatcher<'a, C> {
    pub fn new(center: &'a C, options: DispatchOptions) -> Self {
        Self { center, options }
    }

    /// Schedule the notification. Call only after permission was obtained.
    pub async fn dispatch(
        &self,
        config: &NotifyConfig,
        identity: &IdentityContext,
        callbacks: &DispatchCallbacks,
    ) -> DispatchReport {
        if identity.identifier().is_none() {
            warn!("process has no application identifier; the notification service may ignore it");
        }

        self.center.install_presentation_policy();

        let request = build_request(config, &self.options);
        let request_id = request.identifier.clone();
        let timeouts = self.options.timeouts;

        match timeout(timeouts.scheduling, self.center.schedule(&request)).await {
            Ok(Ok(())) => {
                debug!(id = %request_id, "notification scheduled");
                if let Some(ref cb) = callbacks.on_scheduled {
                    cb(&request_id);
                }
            }
            Ok(Err(e)) => {
                return DispatchReport {
                    request_id,
                    outcome: DeliveryOutcome::SchedulingFailed(e.to_string()),
                };
            }
            Err(_) => {
                warn!(
                    id = %request_id,
                    "no scheduling confirmation within {:?}",
                    timeouts.scheduling
                );
            }
        }

        if !self.options.confirm_delivery {
            return DispatchReport {
                request_id,
                outcome: DeliveryOutcome::Scheduled,
            };
        }

        sleep(timeouts.settle).await;

        let outcome = match timeout(timeouts.delivery_check, self.center.delivered_identifiers()).await {
            Ok(delivered) if delivered.iter().any(|id| *id == request_id) => {
                DeliveryOutcome::ConfirmedDelivered
            }
            Ok(_) => DeliveryOutcome::UnconfirmedDelivered,
            Err(_) => {
                debug!("delivered list not reported within {:?}", timeouts.delivery_check);
                DeliveryOutcome::UnconfirmedDelivered
            }
        };

        DispatchReport {
            request_id,
            outcome,
        }
    }
}
