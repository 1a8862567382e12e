//! Domain layer - Core value objects and errors
//!
//! Contains the identity descriptor, notification value objects,
//! configuration, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod identity;
pub mod notification;

// Re-export common types
pub use config::{AppConfig, Settings, Timeouts};
pub use error::*;
pub use identity::{ContainerLayout, IdentityDescriptor};
pub use notification::{
    AuthorizationResponse, AuthorizationState, DeliveryOutcome, NotificationRequest,
    NotificationSound, NotifyConfig,
};
