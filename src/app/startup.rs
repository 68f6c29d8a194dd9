//! Application startup
//!
//! Resolves settings, sets up logging and signal handling, builds the
//! backend for the configured mode and hands stdin to the console host.

use crate::app::cli::args::Args;
use crate::app::cli::config::{load_args, Settings};
use crate::app::console::Console;
use crate::app::error::{AppError, AppResult};
use crate::attendance::api::{AttendanceApi, HttpApiConfig, HttpAttendanceApi, LinkLauncher};
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::styles::help_styles;
use crate::core::version::banner;
use crate::notifications::api::notification_service;
use crate::scan::api::{ScanMode, ScanSession, ScanStatistics, SessionConfig};
use clap::{CommandFactory, FromArgMatches};
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::io::BufReader;

/// Session id used by the console host
pub const CONSOLE_SESSION_ID: &str = "console";

/// Run the application until input ends or a shutdown signal arrives
pub async fn startup() -> AppResult<ScanStatistics> {
    let terminal = std::io::stdout().is_terminal();
    let matches = Args::command().styles(help_styles(terminal)).get_matches();
    let cli = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let args = load_args(cli).await?;
    let settings = Settings::resolve(&args, terminal)?;

    init_logging(
        Some(&settings.log_level),
        Some(settings.log_format),
        settings.log_file.as_deref(),
        settings.color,
    )
    .map_err(|e| AppError::Logging {
        message: e.to_string(),
    })?;

    log::info!("{}", banner());
    log::debug!("Settings: {:?}", redacted(&settings));

    let (coordinator, shutdown_rx) = ShutdownCoordinator::new();
    coordinator.install_signal_handlers();

    let api = build_backend(&settings)?;
    let service = notification_service();
    let session = ScanSession::open(
        SessionConfig::new(CONSOLE_SESSION_ID, settings.mode),
        api,
        service.clone(),
    )
    .await;

    let console = Console::new(service, settings.color);
    let statistics = console
        .run(
            session,
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            shutdown_rx,
        )
        .await?;

    if coordinator.is_shutdown_requested() {
        log::info!("Stopped by signal");
    }
    Ok(statistics)
}

/// Backend for the configured scan mode
pub fn build_backend(settings: &Settings) -> AppResult<Arc<dyn AttendanceApi>> {
    match settings.mode {
        ScanMode::Attendance => {
            let mut config = HttpApiConfig::new(settings.base_url.as_str());
            config.timeout = settings.timeout;
            config.token = settings.token.clone();
            let api = HttpAttendanceApi::new(&config)?;
            log::info!("Submitting attendance to {}", api.endpoint());
            Ok(Arc::new(api))
        }
        // The console has no URL handler; the success notice shows the link
        ScanMode::Link => Ok(Arc::new(LinkLauncher::new(|url| {
            log::debug!("Link ready for the host: {}", url)
        }))),
    }
}

fn redacted(settings: &Settings) -> Settings {
    Settings {
        token: settings.token.as_ref().map(|_| "***".to_string()),
        ..settings.clone()
    }
}
