// # ddnsd - Route 53 DDNS Daemon
//
// Thin integration layer: all reconciliation logic lives in ddns-core.
//
// The ddnsd daemon is responsible for:
// 1. Reading configuration from flags / environment variables
// 2. Setting up console and rotating JSON file logging
// 3. Building the HTTP probe and the Route 53 session
// 4. Running the scheduler until SIGTERM or SIGINT
//
// ## Configuration
//
// Required (flag / environment variable):
// - `--awsId` / `DDNS_AWS_ID`: access key id
// - `--awsSecret` / `DDNS_AWS_SECRET`: secret access key
// - `--hostedZoneId` / `DDNS_HOSTED_ZONE_ID`: hosted zone id
// - `--domainName` / `DDNS_DOMAIN_NAME`: record to keep up to date
//
// Run `ddnsd --help` for the optional tuning and logging flags.
//
// ## Example
//
// ```bash
// export DDNS_AWS_ID=AKIA...
// export DDNS_AWS_SECRET=...
// ddnsd --hostedZoneId Z0123456789 --domainName home.example.com
// ```

mod cli;
mod logging;

use std::any::Any;
use std::future::Future;
use std::panic::{self, PanicHookInfo};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use ddns_core::{DdnsConfig, EngineEvent, Reconciler, Scheduler};
use ddns_probe_http::HttpAddressProbe;
use ddns_zone_route53::Route53Zone;
use tracing::{debug, error, info};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use crate::cli::Args;

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
/// - 3: Credentials could not be turned into a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
    /// Session construction failed
    AuthFailure = 3,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init(&args.log_options()) {
        eprintln!("Logging setup error: {:#}", e);
        return DdnsExitCode::ConfigError.into();
    }
    install_panic_hook();

    let config = args.to_config();
    if let Err(e) = config.validate() {
        error!(kind = %e.kind(), error = %e, "Invalid configuration");
        eprintln!("Configuration error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!(
        record = %config.record_name,
        hosted_zone_id = %config.hosted_zone_id,
        interval_secs = config.scheduler.interval_secs,
        dry_run = config.zone.dry_run,
        "Starting ddnsd daemon"
    );

    // One logical worker: a single-threaded runtime is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Build the components and run until a shutdown signal
async fn run_daemon(config: DdnsConfig) -> DdnsExitCode {
    let zone = match Route53Zone::connect(&config) {
        Ok(zone) => zone,
        Err(e) => {
            error!(kind = %e.kind(), error = %e, "Failed to create Route 53 session");
            return DdnsExitCode::AuthFailure;
        }
    };

    let probe = match HttpAddressProbe::from_config(&config.probe) {
        Ok(probe) => probe,
        Err(e) => {
            error!(kind = %e.kind(), error = %e, "Failed to create address probe");
            return DdnsExitCode::ConfigError;
        }
    };

    let (reconciler, mut events) = match Reconciler::new(Box::new(probe), Box::new(zone), &config)
    {
        Ok(pair) => pair,
        Err(e) => {
            error!(kind = %e.kind(), error = %e, "Failed to create reconciler");
            return DdnsExitCode::ConfigError;
        }
    };

    let shutdown = match shutdown_signal() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            error!("Shutdown handler error: {}", e);
            return DdnsExitCode::RuntimeError;
        }
    };

    let event_log = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                EngineEvent::Stopped { reason } => info!(reason = %reason, "Engine stopped"),
                other => debug!(event = ?other, "Engine event"),
            }
        }
    });

    let mut scheduler = Scheduler::new(reconciler, config.scheduler.interval());
    let ticks = scheduler.run_until(shutdown).await;

    // Dropping the scheduler closes the event channel
    drop(scheduler);
    if let Err(e) = event_log.await {
        error!("Event logger task failed: {}", e);
    }

    info!(ticks, "Shutting down daemon");
    DdnsExitCode::CleanShutdown
}

/// Route panics into the log before the previous hook prints them
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "<unknown>".to_string());
        error!(panic = %panic_message(info), location = %location, "panic");
        previous(info);
    }));
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    payload_message(info.payload())
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

/// Install handlers for shutdown signals (SIGTERM, SIGINT)
///
/// Handlers are registered before the scheduler starts so a registration
/// failure is reported at startup. The returned future resolves on the
/// first signal.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
    })
}

/// Wait for CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: SIGINT"),
            Err(e) => error!("Failed to wait for CTRL-C: {}", e),
        }
    })
}
