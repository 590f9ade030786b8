//! Automatic all-interface scan.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use mdns_scout_core::{
    ExecutorConfig, MdnsBackend, NoopProgress, QueryOverrides, ScanEvent, ScanProgressHandler,
    ScanSession,
};

use super::build_orchestrator;
use crate::cli::AutoArgs;
use crate::error::CliError;
use crate::output::get_formatter;

/// CLI progress handler using an indicatif spinner
struct SpinnerProgress {
    spinner: ProgressBar,
}

impl SpinnerProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ScanProgressHandler for SpinnerProgress {
    fn on_event(&self, event: &ScanEvent) {
        let message = event.message();

        // Per-interface verdicts stay on screen above the spinner.
        if matches!(event, ScanEvent::InterfaceDone { .. } | ScanEvent::Cancelled { .. }) {
            self.spinner.println(&message);
        }
        self.spinner.set_message(message);
    }
}

/// Run the auto command
pub async fn run_auto(
    args: AutoArgs,
    backend: MdnsBackend,
    overrides: QueryOverrides,
    executor: ExecutorConfig,
    json: bool,
) -> Result<(), CliError> {
    let formatter = get_formatter(json);
    let mut orchestrator = build_orchestrator(backend, executor, &overrides).await?;

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        let quiet = json;
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                if !quiet {
                    eprintln!("Stopping after the current interface (press Ctrl+C again to abort)...");
                }
                debug!("scan cancellation requested");
                cancel.cancel();

                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(130);
                }
            }
        })
    };

    let session = if json {
        orchestrator.discover_all(&overrides, &NoopProgress, cancel).await
    } else {
        let progress = SpinnerProgress::new();
        let session = orchestrator.discover_all(&overrides, &progress, cancel).await;
        progress.finish();
        session
    };
    ctrl_c.abort();

    println!("{}", formatter.format_scan(session));

    scan_result(session, args.strict)
}

fn scan_result(session: &ScanSession, strict: bool) -> Result<(), CliError> {
    if let Some(reason) = session.error() {
        return Err(CliError::SearchFailed(reason.to_string()));
    }

    if !session.found_any() {
        return Err(CliError::NoDevicesFound);
    }

    if strict && session.failed() > 0 {
        return Err(CliError::PartialFailure {
            succeeded: session.succeeded(),
            failed: session.failed(),
        });
    }

    Ok(())
}
