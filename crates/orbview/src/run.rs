use std::time::Duration;

use anyhow::{Context, Result};
use orb_config::OrbConfig;
use tracing_subscriber::EnvFilter;

use crate::bindings::apply_overrides;
use crate::cli::RunArgs;
use crate::headless::run_headless;
use crate::paths::resolve_config;
use crate::window::run_window;

pub fn run(args: RunArgs) -> Result<()> {
    let config = load_config(&args)?;
    if args.headless {
        let report = run_headless(
            &config,
            args.frames,
            Duration::from_millis(args.frame_interval_ms),
        )?;
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to encode headless report")?
        );
        return Ok(());
    }
    run_window(&config)
}

pub fn print_config(args: &RunArgs) -> Result<()> {
    let config = load_config(args)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&config).context("failed to encode configuration")?
    );
    Ok(())
}

fn load_config(args: &RunArgs) -> Result<OrbConfig> {
    let (mut config, source) = resolve_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    config
        .validate()
        .context("invalid configuration after applying command-line overrides")?;
    tracing::debug!(?source, "resolved orbview configuration");
    Ok(config)
}

/// Logs go to stderr so stdout stays machine-readable.
pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
