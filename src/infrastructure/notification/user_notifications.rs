//! UserNotifications adapter (macOS)
//!
//! Every UNUserNotificationCenter call reports back through a completion
//! block on a queue of the OS's choosing. Each call gets a one-shot
//! channel: created before the call, fired from the block, awaited by the
//! caller under its own timeout. A block that fires after the caller gave
//! up finds the receiver gone and is ignored.

#![allow(unused_unsafe)]

use std::ptr::NonNull;
use std::sync::Mutex;

use async_trait::async_trait;
use block2::RcBlock;
use objc2::rc::Retained;
use objc2::runtime::{Bool, ProtocolObject};
use objc2::{define_class, msg_send, sel, AllocAnyThread};
use objc2_foundation::{NSArray, NSBundle, NSError, NSObject, NSObjectProtocol, NSString};
use objc2_user_notifications::{
    UNAuthorizationOptions, UNAuthorizationStatus, UNMutableNotificationContent, UNNotification,
    UNNotificationContent, UNNotificationInterruptionLevel, UNNotificationPresentationOptions,
    UNNotificationRequest, UNNotificationSettings, UNNotificationSound, UNNotificationTrigger,
    UNTimeIntervalNotificationTrigger, UNUserNotificationCenter, UNUserNotificationCenterDelegate,
};
use tokio::sync::oneshot;

use crate::application::ports::{NotificationCenter, NotificationCenterError};
use crate::domain::notification::{
    AuthorizationResponse, AuthorizationState, NotificationRequest, NotificationSound,
};

define_class!(
    // Shows notifications while the process counts as foreground
    #[unsafe(super(NSObject))]
    #[name = "NotifyToolPresentationDelegate"]
    struct PresentationDelegate;

    unsafe impl NSObjectProtocol for PresentationDelegate {}

    unsafe impl UNUserNotificationCenterDelegate for PresentationDelegate {
        #[unsafe(method(userNotificationCenter:willPresentNotification:withCompletionHandler:))]
        fn will_present(
            &self,
            _center: &UNUserNotificationCenter,
            _notification: &UNNotification,
            completion_handler: &block2::DynBlock<dyn Fn(UNNotificationPresentationOptions)>,
        ) {
            completion_handler.call((presentation_options(),));
        }
    }
);

impl PresentationDelegate {
    fn new() -> Retained<Self> {
        let this = Self::alloc().set_ivars(());
        unsafe { msg_send![super(this), init] }
    }
}

/// Most visible presentation available
fn presentation_options() -> UNNotificationPresentationOptions {
    UNNotificationPresentationOptions::Banner
        | UNNotificationPresentationOptions::List
        | UNNotificationPresentationOptions::Sound
        | UNNotificationPresentationOptions::Badge
}

fn map_status(status: UNAuthorizationStatus) -> AuthorizationState {
    if status == UNAuthorizationStatus::NotDetermined {
        AuthorizationState::NotDetermined
    } else if status == UNAuthorizationStatus::Denied {
        AuthorizationState::Denied
    } else if status == UNAuthorizationStatus::Authorized {
        AuthorizationState::Authorized
    } else {
        AuthorizationState::Other
    }
}

fn describe(error: *mut NSError) -> Option<String> {
    unsafe { error.as_ref() }.map(|error| unsafe { error.localizedDescription() }.to_string())
}

/// One-shot bridge from a completion block to an awaiting caller.
///
/// The returned closure is `Fn` because blocks are; only its first call
/// delivers a value.
fn completion<T: Send + 'static>() -> (impl Fn(T) + 'static, oneshot::Receiver<T>) {
    let (tx, rx) = oneshot::channel();
    let slot = Mutex::new(Some(tx));
    let signal = move |value: T| {
        let sender = slot.lock().ok().and_then(|mut slot| slot.take());
        if let Some(sender) = sender {
            let _ = sender.send(value);
        }
    };
    (signal, rx)
}

/// Wait for a completion; a dropped block never resolves
async fn settle<T>(rx: oneshot::Receiver<T>) -> T {
    match rx.await {
        Ok(value) => value,
        Err(_) => std::future::pending().await,
    }
}

/// UNUserNotificationCenter behind the notification port
pub struct UserNotificationCenter {
    center: Retained<UNUserNotificationCenter>,
    delegate: Retained<PresentationDelegate>,
}

// UNUserNotificationCenter is thread-safe; the delegate holds no state.
unsafe impl Send for UserNotificationCenter {}
unsafe impl Sync for UserNotificationCenter {}

impl UserNotificationCenter {
    /// Connect to the current notification center.
    ///
    /// The service refuses processes without a bundle identifier, so the
    /// identity shim must already be installed.
    pub fn new() -> Result<Self, NotificationCenterError> {
        let main_bundle = unsafe { NSBundle::mainBundle() };
        if unsafe { main_bundle.bundleIdentifier() }.is_none() {
            return Err(NotificationCenterError::Unavailable(
                "process has no bundle identifier".to_string(),
            ));
        }

        Ok(Self {
            center: unsafe { UNUserNotificationCenter::currentNotificationCenter() },
            delegate: PresentationDelegate::new(),
        })
    }

    fn begin_status(&self) -> oneshot::Receiver<AuthorizationState> {
        let (signal, rx) = completion();
        let handler = RcBlock::new(move |settings: NonNull<UNNotificationSettings>| {
            let status = unsafe { settings.as_ref().authorizationStatus() };
            signal(map_status(status));
        });
        unsafe { self.center.getNotificationSettingsWithCompletionHandler(&handler) };
        rx
    }

    fn begin_request_authorization(&self) -> oneshot::Receiver<AuthorizationResponse> {
        let (signal, rx) = completion();
        let handler = RcBlock::new(move |granted: Bool, error: *mut NSError| {
            signal(AuthorizationResponse {
                granted: granted.as_bool(),
                error: describe(error),
            });
        });
        let options = UNAuthorizationOptions::Alert
            | UNAuthorizationOptions::Sound
            | UNAuthorizationOptions::Badge;
        unsafe {
            self.center
                .requestAuthorizationWithOptions_completionHandler(options, &handler)
        };
        rx
    }

    fn begin_schedule(
        &self,
        request: &NotificationRequest,
    ) -> oneshot::Receiver<Result<(), NotificationCenterError>> {
        let content = unsafe { UNMutableNotificationContent::new() };
        unsafe {
            content.setTitle(&NSString::from_str(&request.title));
            if let Some(subtitle) = &request.subtitle {
                content.setSubtitle(&NSString::from_str(subtitle));
            }
            content.setBody(&NSString::from_str(&request.body));
            if request.sound == NotificationSound::Default {
                let sound = UNNotificationSound::defaultSound();
                content.setSound(Some(&*sound));
            }
            // macOS 12+
            if request.time_sensitive && content.respondsToSelector(sel!(setInterruptionLevel:)) {
                content.setInterruptionLevel(UNNotificationInterruptionLevel::TimeSensitive);
            }
        }

        let trigger = unsafe {
            UNTimeIntervalNotificationTrigger::triggerWithTimeInterval_repeats(
                request.trigger_delay.as_secs_f64(),
                false,
            )
        };
        let trigger: &UNNotificationTrigger = &trigger;
        let content: &UNNotificationContent = &content;
        let identifier = NSString::from_str(&request.identifier);
        let un_request = unsafe {
            UNNotificationRequest::requestWithIdentifier_content_trigger(
                &identifier,
                content,
                Some(trigger),
            )
        };

        let (signal, rx) = completion();
        let handler = RcBlock::new(move |error: *mut NSError| {
            signal(match describe(error) {
                Some(message) => Err(NotificationCenterError::Rejected(message)),
                None => Ok(()),
            });
        });
        unsafe {
            self.center
                .addNotificationRequest_withCompletionHandler(&un_request, Some(&*handler))
        };
        rx
    }

    fn begin_delivered(&self) -> oneshot::Receiver<Vec<String>> {
        let (signal, rx) = completion();
        let handler = RcBlock::new(move |notifications: NonNull<NSArray<UNNotification>>| {
            let notifications = unsafe { notifications.as_ref() };
            let identifiers = notifications
                .iter()
                .map(|notification| unsafe { notification.request().identifier() }.to_string())
                .collect();
            signal(identifiers);
        });
        unsafe { self.center.getDeliveredNotificationsWithCompletionHandler(&handler) };
        rx
    }
}

#[async_trait]
impl NotificationCenter for UserNotificationCenter {
    fn install_presentation_policy(&self) {
        let delegate = ProtocolObject::from_ref(&*self.delegate);
        unsafe { self.center.setDelegate(Some(delegate)) };
    }

    async fn authorization_status(&self) -> AuthorizationState {
        let rx = self.begin_status();
        settle(rx).await
    }

    async fn request_authorization(&self) -> AuthorizationResponse {
        let rx = self.begin_request_authorization();
        settle(rx).await
    }

    async fn schedule(&self, request: &NotificationRequest) -> Result<(), NotificationCenterError> {
        let rx = self.begin_schedule(request);
        settle(rx).await
    }

    async fn delivered_identifiers(&self) -> Vec<String> {
        let rx = self.begin_delivered();
        settle(rx).await
    }
}
