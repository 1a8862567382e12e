//! NotifyTool CLI entry point

use std::process::ExitCode;

use notifytool::cli::{app, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::init();
    let args = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    app::run(args).await
}
