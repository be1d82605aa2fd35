//! # Simulated Node
//!
//! One swap engine joined to the in-memory network, with its receive loop
//! running.

use anyhow::Result;
use sg_swap_negotiation::adapters::{
    spawn_receiver, InMemoryLedgerRegistry, InMemoryNetwork, LoggingRefundReporter,
};
use sg_swap_negotiation::{
    NetworkClock, PeerAddress, SwapConfig, SwapDependencies, SwapEngine,
};
use sg_telemetry::log_peer_event;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A running node.
pub struct SimNode {
    name: String,
    engine: Arc<SwapEngine>,
    receiver: JoinHandle<()>,
}

impl SimNode {
    /// Join `network` at `address` and start processing inbound messages.
    pub fn start(
        name: &str,
        address: PeerAddress,
        network: &Arc<InMemoryNetwork>,
        ledgers: Arc<InMemoryLedgerRegistry>,
        clock: Arc<dyn NetworkClock>,
        config: SwapConfig,
    ) -> Result<Self> {
        let (messenger, inbox) = network.join(address);
        let engine = Arc::new(SwapEngine::with_config(
            address,
            SwapDependencies {
                ledgers,
                messenger: Arc::new(messenger),
                clock,
                refund_reporter: Arc::new(LoggingRefundReporter),
            },
            config,
        )?);
        let receiver = spawn_receiver(Arc::clone(&engine), inbox);
        log_peer_event!(info, "runtime", "node started", address, node = name);
        Ok(Self {
            name: name.to_string(),
            engine,
            receiver,
        })
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's engine.
    pub fn engine(&self) -> &Arc<SwapEngine> {
        &self.engine
    }

    /// Stop the receive loop.
    pub fn shutdown(self) {
        self.receiver.abort();
        log_peer_event!(
            info,
            "runtime",
            "node stopped",
            self.engine.local_address(),
            node = %self.name
        );
    }
}
