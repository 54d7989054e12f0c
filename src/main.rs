use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use sandrig::config::{self, Config};
use sandrig::hardware::{SimulatedActuator, TraceRenderer};
use sandrig::motion::SandPlate;
use sandrig::plan::Driver;

/// Drive a two-arm sand plate from a plan file.
#[derive(Debug, Parser)]
#[command(name = "sandrig", version)]
struct Cli {
    /// Plan file: JSON rows or the comma-separated plain-text format.
    plan: PathBuf,

    /// TOML configuration; built-in defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Park the arms after the plan completes.
    #[arg(long)]
    park: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    tracing::info!(
        radius = config.plate.radius,
        ms_per_step = config.motion.ms_per_step,
        "plate configured"
    );

    let actuator = Arc::new(SimulatedActuator::new(config.motion.ms_per_step));
    let plate = SandPlate::new(
        config.plate.radius,
        actuator,
        Arc::new(TraceRenderer),
        config.motion.clone(),
    );

    let cancel = plate.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling at the next instruction");
            cancel.cancel();
        }
    });

    let plan_text = std::fs::read_to_string(&cli.plan)?;
    let mut driver = Driver::new(plate);
    driver.load_from_str(&plan_text)?;
    driver.execute().await?;

    if cli.park {
        driver.plate().park().await?;
    }
    tracing::info!("plan complete");
    Ok(())
}
