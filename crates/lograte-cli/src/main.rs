//! lograte CLI - write leveled lines to rotating log backends

use anyhow::{bail, Context, Result};
use clap::Parser;
use lograte::constants::DEFAULT_BACKEND_NAME;
use lograte::{crash_log, BackendConfig, LogConfig, LogType, Registry};
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{Cli, RotateArg};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Diagnostics go to stderr; stdout carries the log lines
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("lograte={0},lograte_cli={0}", log_level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(io::stderr),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    if let Some(path) = &cli.crash_log {
        if let Err(e) = crash_log(path) {
            warn!("Continuing without crash log: {}", e);
        }
    }

    let registry = build_registry(&cli)?;
    let log_type = LogType::from(cli.log_type);

    if cli.message.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("Failed to read stdin")?;
            emit(&registry, log_type, &line);
        }
    } else {
        emit(&registry, log_type, &cli.message.join(" "));
    }

    registry.flush()?;
    Ok(())
}

fn emit(registry: &Registry, log_type: LogType, line: &str) {
    if log_type == LogType::Fatal {
        registry.fatal(line).exit();
    }
    registry.log(log_type, line);
}

fn build_registry(cli: &Cli) -> Result<Registry> {
    let config = match config_path(cli)? {
        Some(path) if !cli.is_ad_hoc() => {
            debug!("Loading config from {}", path.display());
            let mut config = LogConfig::load(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            apply_overrides(cli, &mut config)?;
            config
        }
        _ => LogConfig {
            backends: vec![ad_hoc_backend(cli)],
        },
    };

    let registry = Registry::from_config(&config)?;
    debug!("Backends: {:?}", registry.names());
    Ok(registry)
}

fn config_path(cli: &Cli) -> Result<Option<PathBuf>> {
    if let Some(path) = &cli.config {
        return Ok(Some(path.clone()));
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(LogConfig::discover(&cwd))
}

/// Command line options win over every configured backend. Rotation only
/// reaches backends that write to a file.
fn apply_overrides(cli: &Cli, config: &mut LogConfig) -> Result<()> {
    let rotates = cli.rotate != RotateArg::None || cli.rotate_size.is_some();
    if rotates && !config.backends.iter().any(|b| b.path.is_some()) {
        bail!("--rotate and --rotate-size need a backend with a path");
    }

    for backend in &mut config.backends {
        apply_line_options(cli, backend);
        if backend.path.is_some() {
            apply_rotation(cli, backend);
        }
    }
    Ok(())
}

fn apply_line_options(cli: &Cli, backend: &mut BackendConfig) {
    if cli.level.is_some() {
        backend.level = cli.level.clone();
    }
    if cli.no_color {
        backend.colored = Some(false);
    }
    if let Some(names) = &cli.flags {
        backend.flags = Some(
            names
                .iter()
                .filter(|name| !name.is_empty())
                .cloned()
                .collect(),
        );
    }
    if let Some(prefix) = &cli.prefix {
        backend.prefix = prefix.clone();
    }
}

fn apply_rotation(cli: &Cli, backend: &mut BackendConfig) {
    if cli.rotate != RotateArg::None {
        backend.rotate = Some(cli.rotate.as_str().to_string());
    }
    if cli.rotate_size.is_some() {
        backend.rotate_size = cli.rotate_size;
    }
}

/// Single backend described entirely by command line flags
fn ad_hoc_backend(cli: &Cli) -> BackendConfig {
    let mut backend = BackendConfig::console(DEFAULT_BACKEND_NAME);
    backend.path = cli.file.clone();
    if cli.stderr {
        backend.output = Some("stderr".to_string());
    }
    apply_line_options(cli, &mut backend);
    apply_rotation(cli, &mut backend);
    backend
}
