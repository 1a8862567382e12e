//! Permission and dispatch pipeline tests against a scripted notification center

use std::future::pending;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use notifytool::application::ports::{
    NoIdentityOverride, NotificationCenter, NotificationCenterError,
};
use notifytool::application::{IdentityContext, IdentityShim, ProvisionOutcome};
use notifytool::cli::{deliver, Captured, Presenter, EXIT_ERROR, EXIT_SUCCESS};
use notifytool::domain::config::Settings;
use notifytool::domain::identity::IdentityDescriptor;
use notifytool::domain::notification::{
    AuthorizationResponse, AuthorizationState, NotificationRequest, NotifyConfig,
};
use notifytool::infrastructure::ManifestBundles;

/// How the scripted service answers the consent prompt
enum Consent {
    Grant,
    Refuse(Option<&'static str>),
    NeverAnswer,
}

struct ScriptedCenter {
    status: AuthorizationState,
    consent: Consent,
    schedule_error: Option<&'static str>,
    answers_schedule: bool,
    show_delivered: bool,
    status_queries: AtomicUsize,
    consent_requests: AtomicUsize,
    delivered_queries: AtomicUsize,
    scheduled: Mutex<Vec<NotificationRequest>>,
}

impl ScriptedCenter {
    fn new(status: AuthorizationState, consent: Consent) -> Self {
        Self {
            status,
            consent,
            schedule_error: None,
            answers_schedule: true,
            show_delivered: true,
            status_queries: AtomicUsize::new(0),
            consent_requests: AtomicUsize::new(0),
            delivered_queries: AtomicUsize::new(0),
            scheduled: Mutex::new(Vec::new()),
        }
    }

    fn failing_schedule(mut self, error: &'static str) -> Self {
        self.schedule_error = Some(error);
        self
    }

    fn scheduled_count(&self) -> usize {
        self.scheduled.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationCenter for ScriptedCenter {
    fn install_presentation_policy(&self) {}

    async fn authorization_status(&self) -> AuthorizationState {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        self.status
    }

    async fn request_authorization(&self) -> AuthorizationResponse {
        self.consent_requests.fetch_add(1, Ordering::SeqCst);
        match self.consent {
            Consent::Grant => AuthorizationResponse {
                granted: true,
                error: None,
            },
            Consent::Refuse(error) => AuthorizationResponse {
                granted: false,
                error: error.map(str::to_string),
            },
            Consent::NeverAnswer => pending().await,
        }
    }

    async fn schedule(&self, request: &NotificationRequest) -> Result<(), NotificationCenterError> {
        self.scheduled.lock().unwrap().push(request.clone());
        if !self.answers_schedule {
            return pending().await;
        }
        match self.schedule_error {
            Some(error) => Err(NotificationCenterError::Rejected(error.to_string())),
            None => Ok(()),
        }
    }

    async fn delivered_identifiers(&self) -> Vec<String> {
        self.delivered_queries.fetch_add(1, Ordering::SeqCst);
        if self.show_delivered {
            self.scheduled
                .lock()
                .unwrap()
                .iter()
                .map(|request| request.identifier.clone())
                .collect()
        } else {
            Vec::new()
        }
    }
}

struct Harness {
    _dir: TempDir,
    settings: Settings,
    identity: IdentityContext,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let settings = Settings::defaults_in(dir.path());
        let descriptor = IdentityDescriptor {
            container_path: settings.container_path(),
            identifier: settings.bundle_identifier.clone(),
            executable_name: "notifytool".to_string(),
            fingerprint: 4096,
        };
        let os = Arc::new(ManifestBundles::new(PathBuf::from("/usr/local/bin/notifytool")));
        let identity =
            IdentityShim::new(NoIdentityOverride).install(&ProvisionOutcome::Reused(descriptor), os);

        Self {
            _dir: dir,
            settings,
            identity,
        }
    }

    async fn deliver(&self, center: &ScriptedCenter, notify: &NotifyConfig) -> (u8, Captured) {
        let (presenter, captured) = Presenter::capture();
        let code = deliver(
            center,
            &self.identity,
            notify,
            &self.settings,
            Arc::new(presenter),
        )
        .await;
        (code, captured)
    }
}

fn backup_notice() -> NotifyConfig {
    NotifyConfig::new("Backup Complete", "Your backup finished successfully.")
}

fn scheduled_id(stdout: &str) -> String {
    let start = stdout
        .find("Notification scheduled successfully (id: ")
        .expect("scheduled line present")
        + "Notification scheduled successfully (id: ".len();
    let end = stdout[start..].find(')').expect("closing paren") + start;
    stdout[start..end].to_string()
}

fn is_uppercase_uuid(id: &str) -> bool {
    let groups: Vec<&str> = id.split('-').collect();
    let lengths: Vec<usize> = groups.iter().map(|g| g.len()).collect();
    lengths == [8, 4, 4, 4, 12]
        && groups
            .iter()
            .all(|g| g.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)))
}

#[tokio::test(start_paused = true)]
async fn authorized_run_schedules_and_confirms() {
    let harness = Harness::new();
    let center = ScriptedCenter::new(AuthorizationState::Authorized, Consent::Grant);

    let (code, captured) = harness.deliver(&center, &backup_notice()).await;

    assert_eq!(code, EXIT_SUCCESS);
    let stdout = captured.stdout();
    let id = scheduled_id(&stdout);
    assert!(is_uppercase_uuid(&id), "malformed id: {}", id);
    assert!(stdout.contains("Notification was delivered to Notification Center."));
    assert!(!stdout.contains("Requesting notification permission"));
    assert_eq!(center.consent_requests.load(Ordering::SeqCst), 0);

    let scheduled = center.scheduled.lock().unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].identifier, id);
    assert_eq!(scheduled[0].title, "Backup Complete");
}

#[tokio::test(start_paused = true)]
async fn consent_timeout_prints_remediation_without_scheduling() {
    let harness = Harness::new();
    let center = ScriptedCenter::new(AuthorizationState::NotDetermined, Consent::NeverAnswer);

    let (code, captured) = harness.deliver(&center, &backup_notice()).await;

    assert_eq!(code, EXIT_ERROR);
    let stdout = captured.stdout();
    assert!(stdout.contains("Requesting notification permission..."));
    assert!(stdout.contains("Please look for the permission dialog on your screen."));

    let stderr = captured.stderr();
    assert!(stderr.contains("Permission dialog timed out."));
    assert!(stderr.contains("System Settings > Notifications"));
    assert!(stderr.contains("Look for 'NotifyTool' or 'com.agilesv.notifytool' in the list."));
    assert_eq!(center.consent_requests.load(Ordering::SeqCst), 1);
    assert_eq!(center.scheduled_count(), 0);
}

#[tokio::test]
async fn previously_denied_fails_without_prompting() {
    let harness = Harness::new();
    let center = ScriptedCenter::new(AuthorizationState::Denied, Consent::Grant);

    let (code, captured) = harness.deliver(&center, &backup_notice()).await;

    assert_eq!(code, EXIT_ERROR);
    assert!(captured
        .stderr()
        .contains("Please enable it in System Settings > Notifications > NotifyTool"));
    assert_eq!(center.consent_requests.load(Ordering::SeqCst), 0);
    assert_eq!(center.scheduled_count(), 0);
    assert!(captured.stdout().is_empty());
}

#[tokio::test(start_paused = true)]
async fn fresh_grant_is_announced() {
    let harness = Harness::new();
    let center = ScriptedCenter::new(AuthorizationState::NotDetermined, Consent::Grant);

    let (code, captured) = harness.deliver(&center, &backup_notice()).await;

    assert_eq!(code, EXIT_SUCCESS);
    let stdout = captured.stdout();
    let granted = stdout.find("Notification permission granted!").unwrap();
    let scheduled = stdout.find("Notification scheduled successfully").unwrap();
    assert!(granted < scheduled);
}

#[tokio::test]
async fn refusal_at_prompt_surfaces_reason() {
    let harness = Harness::new();
    let center = ScriptedCenter::new(
        AuthorizationState::NotDetermined,
        Consent::Refuse(Some("Notifications are not allowed for this application")),
    );

    let (code, captured) = harness.deliver(&center, &backup_notice()).await;

    assert_eq!(code, EXIT_ERROR);
    let stderr = captured.stderr();
    assert!(stderr.contains("Permission denied: Notifications are not allowed for this application"));
    assert!(stderr.contains("Please grant permission in System Settings > Notifications."));
    assert_eq!(center.scheduled_count(), 0);
}

#[tokio::test]
async fn silent_refusal_uses_generic_message() {
    let harness = Harness::new();
    let center = ScriptedCenter::new(AuthorizationState::NotDetermined, Consent::Refuse(None));

    let (code, captured) = harness.deliver(&center, &backup_notice()).await;

    assert_eq!(code, EXIT_ERROR);
    assert!(captured.stderr().contains("Notification permission not granted."));
}

#[tokio::test]
async fn scheduling_failure_exits_with_error() {
    let harness = Harness::new();
    let center = ScriptedCenter::new(AuthorizationState::Authorized, Consent::Grant)
        .failing_schedule("The operation couldn't be completed.");

    let (code, captured) = harness.deliver(&center, &backup_notice()).await;

    assert_eq!(code, EXIT_ERROR);
    assert!(captured
        .stderr()
        .contains("Failed to schedule notification: The operation couldn't be completed."));
    assert!(!captured.stdout().contains("Notification scheduled successfully"));
    assert_eq!(center.delivered_queries.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn unanswered_scheduling_still_exits_cleanly() {
    let harness = Harness::new();
    let mut center = ScriptedCenter::new(AuthorizationState::Authorized, Consent::Grant);
    center.answers_schedule = false;
    center.show_delivered = false;
    let started = tokio::time::Instant::now();

    let (code, captured) = harness.deliver(&center, &backup_notice()).await;

    let t = harness.settings.timeouts;
    assert!(started.elapsed() >= t.scheduling + t.settle + t.delivery_check);
    assert_eq!(code, EXIT_SUCCESS);
    let stdout = captured.stdout();
    assert!(!stdout.contains("Notification scheduled successfully"));
    assert!(stdout.contains("Notification not found in delivered notifications"));
    assert!(!captured.stderr().contains("Failed to schedule notification"));
}

#[tokio::test(start_paused = true)]
async fn missing_from_delivered_list_still_succeeds() {
    let harness = Harness::new();
    let mut center = ScriptedCenter::new(AuthorizationState::Authorized, Consent::Grant);
    center.show_delivered = false;

    let (code, captured) = harness.deliver(&center, &backup_notice()).await;

    assert_eq!(code, EXIT_SUCCESS);
    assert!(captured
        .stdout()
        .contains("Notification not found in delivered notifications"));
}

#[tokio::test]
async fn delivery_check_can_be_disabled() {
    let mut harness = Harness::new();
    harness.settings.confirm_delivery = false;
    let center = ScriptedCenter::new(AuthorizationState::Authorized, Consent::Grant);

    let (code, captured) = harness.deliver(&center, &backup_notice()).await;

    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(center.delivered_queries.load(Ordering::SeqCst), 0);
    assert!(!captured.stdout().contains("Notification Center"));
}

#[tokio::test(start_paused = true)]
async fn request_carries_subtitle_and_sound_choice() {
    let harness = Harness::new();
    let center = ScriptedCenter::new(AuthorizationState::Authorized, Consent::Grant);
    let notify = NotifyConfig::new("Job Done", "Task finished.")
        .with_subtitle("Job #42")
        .without_sound();

    let (code, _) = harness.deliver(&center, &notify).await;

    assert_eq!(code, EXIT_SUCCESS);
    let scheduled = center.scheduled.lock().unwrap();
    assert_eq!(scheduled[0].subtitle.as_deref(), Some("Job #42"));
    assert_eq!(
        scheduled[0].sound,
        notifytool::domain::notification::NotificationSound::Silent
    );
    assert!(scheduled[0].time_sensitive);
}
