mod args;
mod config;
mod report;

use std::error::Error;
use std::io;

use compress::{Compressor, ImageResizer, Resizer, TinifyClient};
use tinybatch_app::AppState;
use tinybatch_core::RunStats;
use tracing_subscriber::EnvFilter;

use crate::config::ConfigLoad;

fn main() -> Result<(), Box<dyn Error>> {
    let args = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;
    init_logging(args.verbose);

    let loaded = config::load_or_create(args.config.as_deref()).map_err(io::Error::other)?;
    tracing::debug!(config = %loaded.paths.file.display(), "loaded config");

    let client = TinifyClient::new(&loaded.config.api_base);
    execute(loaded, args.status_only, &client, &ImageResizer)?;
    Ok(())
}

/// Runs one invocation against a loaded config. Returns the run statistics,
/// or `None` when only the status was printed.
fn execute(
    loaded: ConfigLoad,
    status_only: bool,
    compressor: &dyn Compressor,
    resizer: &dyn Resizer,
) -> Result<Option<RunStats>, Box<dyn Error>> {
    if loaded.created {
        println!(
            "Created config at {}. Fill in your TinyPNG API keys; this run uses the placeholders.",
            loaded.paths.file.display()
        );
    } else if loaded.config.has_placeholder_keys() {
        eprintln!(
            "{} still contains placeholder API keys; replace them before compressing.",
            loaded.paths.file.display()
        );
    }

    let app_state = AppState::new(loaded.config);
    if let Some(quota) = app_state
        .initialize()
        .map_err(|err| io::Error::other(err.to_string()))?
    {
        println!("Moved API key usage into {}", quota.display());
    }

    if status_only {
        let snapshot = app_state
            .services
            .status
            .snapshot()
            .map_err(|err| io::Error::other(err.to_string()))?;
        report::print_status(&snapshot);
        return Ok(None);
    }

    let mut session = app_state
        .services
        .compress
        .open()
        .map_err(|err| io::Error::other(format!("failed to load state: {err}")))?;
    if session.report.credentials_replaced {
        println!("API keys changed since the last run; per-key usage was reset.");
    }
    report::print_status(&session.status());

    let stats = session
        .run_with(compressor, resizer)
        .map_err(|err| io::Error::other(err.to_string()))?;
    report::print_run(&stats);
    report::print_status(&session.status());

    Ok(Some(stats))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
