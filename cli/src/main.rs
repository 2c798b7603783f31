use std::path::PathBuf;

use clap::Parser;
use nekobend_cli::commands::{cli, clip, http, watch};
use nekobend_core::config::LoggingConfig;
use nekobend_core::error;
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, error::CliError> {
    let args = cli::Args::parse();
    let cfg =
        nekobend_core::config::load_default().map_err(|e| error::CliError::Config(e.to_string()))?;
    init_tracing(&cfg.logging).map_err(error::CliError::Config)?;

    match args.command {
        cli::Commands::Watch(watch_args) => watch::run_watch(watch_args, &cfg).await,
        cli::Commands::Http(http_cmd) => http::run_http(http_cmd, &cfg).await,
        cli::Commands::Clip(clip_cmd) => clip::run_clip(clip_cmd),
    }
}

fn exit_code_for_error(e: &error::CliError) -> i32 {
    // 0: success
    // 11: config error
    // 20: spawn / IO error
    // 50: internal/uncategorized
    match e {
        error::CliError::Config(_) => 11,
        error::CliError::Observer(oe) => match oe {
            error::ObserverError::Spawn { .. }
            | error::ObserverError::MissingPipe(_)
            | error::ObserverError::StreamIo { .. } => 20,
            error::ObserverError::AlreadyRunning(_) => 50,
        },
        error::CliError::Io(_) => 20,
        error::CliError::Command(_) => 20,
        error::CliError::Anyhow(_) => 50,
    }
}

fn log_dir(logging: &LoggingConfig) -> PathBuf {
    logging
        .directory
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("nekobend"))
}

fn file_writer(logging: &LoggingConfig) -> Result<NonBlocking, String> {
    let dir = log_dir(logging);
    std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
    let appender =
        tracing_appender::rolling::never(dir, format!("nekobend.{}.log", std::process::id()));
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    Ok(writer)
}

/// Console layer on stderr plus an optional per-process log file.
fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }
    if !logging.console && !logging.file {
        return Err("logging disabled for both console and file".to_string());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(&logging.level).map_err(|e| e.to_string())?,
    };

    let file_layer = if logging.file {
        let writer = file_writer(logging)?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
    } else {
        None
    };

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
