//! # Test Fixtures
//!
//! Shared simulated ledgers on a manual clock, and engines wired to them.

use sg_swap_negotiation::adapters::{
    ChannelRefundReporter, InMemoryLedgerRegistry, ManualClock, SimulatedLedger,
};
use sg_swap_negotiation::{
    MockPeerMessenger, Order, PeerAddress, PeerMessenger, RefundNotice, SwapDependencies,
    SwapEngine, Ticker,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Fixed start time for every fixture clock.
pub const NOW: u64 = 1_700_000_000;

/// `10.0.0.<n>:26868`
pub fn addr(n: u8) -> PeerAddress {
    format!("10.0.0.{}:26868", n).parse().unwrap()
}

/// Ticker that is known to be well formed.
pub fn ticker(symbol: &str) -> Ticker {
    Ticker::new(symbol).unwrap()
}

/// `base_amount base` for `rel_amount rel`, sent by `sender`.
pub fn order(
    base: &str,
    rel: &str,
    base_amount: u64,
    rel_amount: u64,
    sender: PeerAddress,
) -> Order {
    Order::new(ticker(base), ticker(rel), base_amount, rel_amount, sender)
}

/// LUX and BTC ledgers sharing one manual clock.
#[derive(Clone)]
pub struct Ledgers {
    /// Clock the ledgers and engines read.
    pub clock: Arc<ManualClock>,
    /// LUX chain.
    pub lux: Arc<SimulatedLedger>,
    /// BTC chain.
    pub btc: Arc<SimulatedLedger>,
}

impl Ledgers {
    /// Fresh ledgers at [`NOW`].
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(NOW));
        Self {
            lux: Arc::new(SimulatedLedger::new(ticker("LUX"), clock.clone())),
            btc: Arc::new(SimulatedLedger::new(ticker("BTC"), clock.clone())),
            clock,
        }
    }

    /// Registry resolving both tickers.
    pub fn registry(&self) -> Arc<InMemoryLedgerRegistry> {
        Arc::new(
            InMemoryLedgerRegistry::new()
                .with(self.lux.clone())
                .with(self.btc.clone()),
        )
    }

    /// Engine at `address` sending through `messenger`.
    pub fn engine(
        &self,
        address: PeerAddress,
        messenger: Arc<dyn PeerMessenger>,
    ) -> (SwapEngine, mpsc::UnboundedReceiver<RefundNotice>) {
        let (reporter, notices) = ChannelRefundReporter::new();
        let engine = SwapEngine::new(
            address,
            SwapDependencies {
                ledgers: self.registry(),
                messenger,
                clock: self.clock.clone(),
                refund_reporter: Arc::new(reporter),
            },
        );
        (engine, notices)
    }

    /// Engine recording its outbound traffic in a mock messenger.
    pub fn mock_engine(
        &self,
        address: PeerAddress,
    ) -> (
        SwapEngine,
        Arc<MockPeerMessenger>,
        mpsc::UnboundedReceiver<RefundNotice>,
    ) {
        let messenger = Arc::new(MockPeerMessenger::default());
        let (engine, notices) = self.engine(address, messenger.clone());
        (engine, messenger, notices)
    }
}

impl Default for Ledgers {
    fn default() -> Self {
        Self::new()
    }
}
