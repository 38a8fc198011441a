use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use stress_config::{ConfigLoader, LogLevel, SelectionMode, StressConfig};
use stress_engine::{is_extreme, EndpointCatalog, LoadEngine};
use tracing::{debug, info, warn};

mod cli;
mod formatter;
mod run;

use cli::Cli;
use formatter::OutputFormatter;
use run::{run_load, RunOptions};

/// Load configuration from file or environment
fn load_config(config_path: Option<&PathBuf>) -> Result<StressConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => {
            if path.exists() {
                info!("Loading configuration from: {:?}", path);
                loader
                    .from_file(path)
                    .context(format!("Failed to load configuration from {:?}", path))
            } else {
                warn!("Configuration file not found: {:?}. Using defaults.", path);
                loader
                    .from_env()
                    .context("Failed to load configuration from environment")
            }
        }
        None => {
            debug!("No configuration file specified. Loading from environment or defaults.");
            loader
                .from_env()
                .context("Failed to load configuration from environment")
        }
    }
}

/// Layer command-line flags over loaded configuration
fn apply_cli_overrides(config: &mut StressConfig, cli: &Cli) -> Result<()> {
    if let Some(intensity) = cli.intensity {
        config.engine.intensity_percent = intensity;
    }
    if let Some(threads) = cli.threads {
        config.engine.concurrency = threads;
    }
    if let Some(delay) = cli.delay {
        config.engine.delay_millis = delay;
    }
    if let Some(timeout) = cli.timeout {
        if !timeout.is_finite() || timeout <= 0.0 {
            anyhow::bail!("Timeout must be a positive number of seconds, got {}", timeout);
        }
        config.http.timeout = Duration::from_secs_f64(timeout);
    }
    if let Some(seed) = cli.seed {
        config.targets.seed = Some(seed);
    }
    if cli.round_robin {
        config.targets.selection = SelectionMode::RoundRobin;
    }
    if let Some(level) = &cli.log_level {
        match level.parse::<LogLevel>() {
            Ok(level) => config.logging.level = level,
            Err(_) => eprintln!("Invalid log level '{}', keeping '{}'", level, config.logging.level),
        }
    }

    config
        .validate_all()
        .context("Invalid settings after applying command-line flags")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.sample_config {
        print!("{}", StressConfig::generate_sample());
        return Ok(());
    }

    let formatter = OutputFormatter::new(cli.json);

    let mut config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            formatter.print_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };
    if let Err(e) = apply_cli_overrides(&mut config, &cli) {
        formatter.print_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    if let Err(e) = stress_logging::init_logging_from_config(&config.logging) {
        eprintln!(
            "Failed to initialize structured logging: {}, falling back to simple tracing",
            e
        );
        stress_logging::init_simple_tracing(&config.logging.level.to_string())?;
    }

    if cli.list_urls {
        let catalog = EndpointCatalog::from_config(&config.targets)
            .context("Failed to build endpoint catalog")?;
        formatter.print_urls(&catalog);
        return Ok(());
    }

    let engine = LoadEngine::from_config(&config).context("Failed to create load engine")?;
    let plan = stress_engine::compute_worker_plan(&config.engine);
    let duration = cli.duration.filter(|s| *s > 0).map(Duration::from_secs);

    formatter.print_banner();
    formatter.print_configuration(
        &config.engine,
        &plan,
        duration,
        engine.request_timeout(),
        engine.catalog().len(),
    );

    if is_extreme(&config.engine) {
        formatter.print_warning("WARNING: Extreme settings detected!");
        formatter.print_warning(
            "This may cause high CPU usage, network congestion, or system instability",
        );
        formatter.print_warning("Use responsibly and ensure you have permission to test this network");
    }

    let options = RunOptions {
        duration,
        interval: Duration::from_secs(cli.interval.max(1)),
    };
    let summary = run_load(&engine, config.engine, options, &formatter).await?;
    formatter.print_summary(&summary)?;

    Ok(())
}
