//! Main app runner

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ports::{ConfigStore, NotificationCenter};
use crate::application::{
    DispatchCallbacks, DispatchOptions, IdentityContext, IdentityProvisioner, IdentityShim,
    NotificationDispatcher, PermissionCallbacks, PermissionGrant, PermissionOrchestrator,
    ProvisionOutcome,
};
use crate::domain::config::{AppConfig, Settings};
use crate::domain::error::PermissionDenial;
use crate::domain::notification::{DeliveryOutcome, NotifyConfig};
use crate::infrastructure::{
    create_notification_center, notification, platform_bundles, platform_override,
    SystemToolchain, XdgConfigStore,
};

use super::args::{parse_args, ParsedArgs, USAGE};
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;

/// Overrides the directory holding the synthetic container
pub const ENV_CONTAINER_DIR: &str = "NOTIFYTOOL_CONTAINER_DIR";
/// Overrides the bundle identifier
pub const ENV_BUNDLE_ID: &str = "NOTIFYTOOL_BUNDLE_ID";

/// Run the whole tool for `args` (program name excluded)
pub async fn run(args: Vec<String>) -> ExitCode {
    let presenter = Arc::new(Presenter::new());

    let notify = match parse_args(args) {
        Ok(ParsedArgs::Run(notify)) => notify,
        Ok(ParsedArgs::Help) => {
            presenter.note(USAGE);
            return ExitCode::from(EXIT_SUCCESS);
        }
        Err(e) => {
            presenter.note(&e.to_string());
            presenter.note(USAGE);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if !notification::is_supported() {
        presenter.error("unsupported platform: notifications require macOS");
        return ExitCode::from(EXIT_ERROR);
    }

    let settings = load_settings().await;
    let executable = current_executable(&settings);

    let outcome = provision(&settings, &executable).await;
    let identity =
        IdentityShim::new(platform_override()).install(&outcome, platform_bundles(&executable));

    if outcome.is_synthetic() && identity.descriptor().container_path.exists() {
        presenter.output(&format!(
            "Bundle location: {}",
            identity.descriptor().container_path.display()
        ));
    }

    // Without a bundle identifier the framework aborts the process, so the
    // center is refused up front and this run ends with exit 1.
    let center = match create_notification_center() {
        Ok(center) => center,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    ExitCode::from(deliver(&center, &identity, &notify, &settings, presenter).await)
}

async fn provision(settings: &Settings, executable: &Path) -> ProvisionOutcome {
    let provisioner = IdentityProvisioner::new(
        SystemToolchain::from_settings(settings),
        platform_bundles(executable),
        settings,
    );
    let outcome = provisioner.provision(executable).await;

    if let ProvisionOutcome::Rebuilt { report, .. } = &outcome {
        debug!(
            degraded = report.degraded.len(),
            template = ?report.template,
            "container rebuilt"
        );
    }
    outcome
}

fn current_executable(settings: &Settings) -> PathBuf {
    env::current_exe().unwrap_or_else(|e| {
        warn!("cannot locate the running executable: {}", e);
        PathBuf::from(settings.bundle_name.to_lowercase())
    })
}

/// Permission and dispatch, returning the exit code.
///
/// Runs after the identity shim is installed; `center` must already be
/// bound to that identity.
pub async fn deliver<C: NotificationCenter>(
    center: &C,
    identity: &IdentityContext,
    notify: &NotifyConfig,
    settings: &Settings,
    presenter: Arc<Presenter>,
) -> u8 {
    let display_name = settings.bundle_name.as_str();
    let identifier = identity.descriptor().identifier.as_str();

    let start = Arc::clone(&presenter);
    let end = Arc::clone(&presenter);
    let permission_callbacks = PermissionCallbacks {
        on_request_start: Some(Box::new(move || {
            start.output("Requesting notification permission...");
            start.output("Please look for the permission dialog on your screen.");
            start.start_spinner("Waiting for a response...");
        })),
        on_request_end: Some(Box::new(move || end.stop_spinner())),
    };

    let orchestrator = PermissionOrchestrator::new(center, settings.timeouts);
    match orchestrator.ensure_permission(&permission_callbacks).await {
        Ok(PermissionGrant::Granted) => presenter.output("Notification permission granted!"),
        Ok(grant) => debug!(?grant, "permission available"),
        Err(denial) => {
            report_denial(&presenter, &denial, display_name, identifier);
            return EXIT_ERROR;
        }
    }

    let scheduled = Arc::clone(&presenter);
    let dispatch_callbacks = DispatchCallbacks {
        on_scheduled: Some(Box::new(move |id: &str| {
            scheduled.output(&format!("Notification scheduled successfully (id: {})", id));
        })),
    };

    let options = DispatchOptions {
        timeouts: settings.timeouts,
        confirm_delivery: settings.confirm_delivery,
        time_sensitive: settings.time_sensitive,
    };
    let dispatcher = NotificationDispatcher::new(center, options);
    let report = dispatcher.dispatch(notify, identity, &dispatch_callbacks).await;

    match report.outcome {
        DeliveryOutcome::SchedulingFailed(error) => {
            presenter.error(&format!("Failed to schedule notification: {}", error));
            return EXIT_ERROR;
        }
        DeliveryOutcome::Scheduled => {}
        DeliveryOutcome::ConfirmedDelivered => {
            presenter.output("Notification was delivered to Notification Center.")
        }
        DeliveryOutcome::UnconfirmedDelivered => presenter.output(
            "Notification not found in delivered notifications (may have been dismissed or not delivered yet).",
        ),
    }

    EXIT_SUCCESS
}

fn report_denial(presenter: &Presenter, denial: &PermissionDenial, name: &str, identifier: &str) {
    match denial {
        PermissionDenial::TimedOut => {
            presenter.error(&denial.to_string());
            presenter.note(
                "You may need to manually enable notifications in System Settings > Notifications.",
            );
            presenter.note(&format!("Look for '{}' or '{}' in the list.", name, identifier));
        }
        PermissionDenial::Denied { .. } => {
            presenter.error(&denial.to_string());
            presenter.note("Please grant permission in System Settings > Notifications.");
        }
        PermissionDenial::PreviouslyDenied => {
            presenter.error(&format!(
                "{} Please enable it in System Settings > Notifications > {}",
                denial, name
            ));
        }
    }
}

/// Resolved settings; configuration problems fall back to the built-ins
pub async fn load_settings() -> Settings {
    let config = load_merged_config().await;
    match config.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            warn!("{}; using built-in settings", e);
            let container_dir = dirs::data_dir().unwrap_or_else(env::temp_dir);
            Settings::defaults_in(container_dir)
        }
    }
}

/// Load and merge configuration from file and env
pub async fn load_merged_config() -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|e| {
        warn!(path = %store.path().display(), "{}", e);
        AppConfig::empty()
    });

    // Merge: defaults < file < env
    AppConfig::defaults().merge(file_config).merge(env_config())
}

fn env_config() -> AppConfig {
    AppConfig {
        container_dir: env::var_os(ENV_CONTAINER_DIR)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from),
        bundle_identifier: env::var(ENV_BUNDLE_ID).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    }
}
