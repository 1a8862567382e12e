//! Notification value objects

use std::fmt;
use std::time::Duration;

/// What the user asked to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    pub title: String,
    pub subtitle: Option<String>,
    pub body: String,
    pub sound: bool,
}

impl NotifyConfig {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            body: body.into(),
            sound: true,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn without_sound(mut self) -> Self {
        self.sound = false;
        self
    }
}

/// The OS's recorded permission decision for this identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationState {
    NotDetermined,
    Denied,
    Authorized,
    /// Provisional, ephemeral, or unknown to us
    Other,
}

impl fmt::Display for AuthorizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDetermined => write!(f, "not determined"),
            Self::Denied => write!(f, "denied"),
            Self::Authorized => write!(f, "authorized"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// The OS's answer to a permission request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub granted: bool,
    pub error: Option<String>,
}

/// Sound attached to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationSound {
    Default,
    Silent,
}

impl From<bool> for NotificationSound {
    fn from(sound: bool) -> Self {
        if sound {
            Self::Default
        } else {
            Self::Silent
        }
    }
}

/// A fully built request, ready to hand to the notification service
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    /// Fresh per invocation; the service overwrites requests sharing an id
    pub identifier: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub body: String,
    pub sound: NotificationSound,
    pub time_sensitive: bool,
    /// Deferred trigger; some OS versions drop immediate deliveries
    /// from non-GUI processes
    pub trigger_delay: Duration,
}

/// Result of one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Scheduled, delivery confirmation not attempted
    Scheduled,
    SchedulingFailed(String),
    ConfirmedDelivered,
    UnconfirmedDelivered,
}

impl DeliveryOutcome {
    /// Scheduling success is the success criterion
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::SchedulingFailed(_))
    }
}
