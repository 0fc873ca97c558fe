mod cli;
mod error_fmt;
mod run;

use std::ffi::OsStr;
use std::path::Path;

use clap::Parser;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

use boom_core::RunFlag;
use boom_core::error::BoomError;
use cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use error_fmt::{exit_code_for_error, format_error_json, humanize};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    let code = match real_main(cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "boom failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    // process::exit skips destructors; flush the file sink first.
    if let Ok(mut slot) = FILE_GUARD.lock() {
        slot.take();
    }
    std::process::exit(code);
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = boom_config::load_file(&cli.config).map_err(|e| {
        BoomError::Config(format!(
            "{} could not be loaded: {e}",
            cli.config.display()
        ))
    })?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging);
    cfg.validate()
        .map_err(|e| BoomError::Config(format!("invalid configuration: {e}")))?;
    tracing::info!(config = %cli.config.display(), "configuration loaded");

    let shutdown = RunFlag::raised();
    {
        let flag = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            tracing::warn!("interrupt received, stopping");
            flag.clear();
        }) {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }

    match cli.cmd {
        Commands::Run { duration_ms } => {
            let summary = run::run_controller(&cfg, duration_ms, &shutdown)?;
            let angle = summary.final_angle.unwrap_or(cfg.servo.mid_deg);
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "final_angle": angle,
                        "moves": summary.moves,
                        "samples": summary.samples,
                    })
                );
            } else {
                println!(
                    "stopped at {angle:.1} deg ({} moves, {} samples)",
                    summary.moves, summary.samples
                );
            }
        }
        Commands::SelfCheck => {
            let (polls, sample) = run::self_check(&cfg, &shutdown)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "ok": true,
                        "polls": polls,
                        "x": sample.x,
                        "y": sample.y,
                        "z": sample.z,
                    })
                );
            } else {
                println!(
                    "sensor ok after {polls} polls: x={:.3} y={:.3} z={:.3} m/s²",
                    sample.x, sample.y, sample.z
                );
            }
        }
    }
    Ok(())
}

/// Console logs go to stderr (pretty or JSON); `[logging] file` adds a JSON-lines sink.
fn init_tracing(json: bool, level: &str, logging: &boom_config::Logging) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console: BoxedLayer = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    };

    let mut layers = vec![console];
    if let Some(path) = logging.file.as_deref() {
        match file_appender(path, logging.rotation.as_deref()) {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                if let Ok(mut slot) = FILE_GUARD.lock() {
                    *slot = Some(guard);
                }
                let filter = EnvFilter::new(logging.level.as_deref().unwrap_or("info"));
                layers.push(
                    fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_writer(writer)
                        .with_filter(filter)
                        .boxed(),
                );
            }
            Err(e) => eprintln!("warning: log file {path} unavailable: {e}"),
        }
    }

    let _ = tracing_subscriber::registry().with(layers).try_init();
}

fn file_appender(
    path: &str,
    rotation: Option<&str>,
) -> Result<tracing_appender::rolling::RollingFileAppender, tracing_appender::rolling::InitError> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};

    let path = Path::new(path);
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path.file_name().unwrap_or_else(|| OsStr::new("boom.log"));
    let rotation = match rotation {
        Some("daily") => Rotation::DAILY,
        Some("hourly") => Rotation::HOURLY,
        _ => Rotation::NEVER,
    };
    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
}
