//! # Swapgate Simulator
//!
//! Runs one complete order-match and HTLC handshake between two in-process
//! nodes and prints the outcome.
//!
//! ## Startup Sequence
//!
//! 1. Initialise logging from `SG_*` / `RUST_LOG`
//! 2. Load simulator configuration from the environment
//! 3. Start both nodes, place the two orders, wait for settlement
//! 4. Print the report

use anyhow::Result;
use sg_runtime::{run_swap, SimConfig};
use sg_telemetry::{init_logging, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logging(&TelemetryConfig::for_node("sim"))?;

    let config = SimConfig::from_env()?;
    info!(
        "Simulating {} {} for {} {} between {} and {}",
        config.base_amount, config.base, config.rel_amount, config.rel, config.alice, config.bob
    );

    let report = run_swap(&config).await?;
    println!("{}", report);
    Ok(())
}
