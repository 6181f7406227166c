//! Gesture Recognition Demo - Main Entry Point

use anyhow::{Context, Result};
use gesture::DemoConfig;
use gesture_demo::{init_logging, run};
use tracing::{debug, info};

fn main() -> Result<()> {
    let config = DemoConfig::load().context("Failed to load configuration")?;
    init_logging(&config.log_level)?;

    info!("=== Gesture Recognition Demo v{} ===", env!("CARGO_PKG_VERSION"));

    // An aborted run is already logged and still exits cleanly
    let outcome = run(&config)?;
    if let Some(best) = outcome.report().and_then(|r| r.best()) {
        debug!("Top gesture: {} ({:.2}%)", best.label, best.percent());
    }

    Ok(())
}
