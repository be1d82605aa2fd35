//! Ledger Registry Adapter
//!
//! Map from ticker to the configured [`LedgerClient`].

use crate::domain::Ticker;
use crate::ports::{LedgerClient, LedgerClientRegistry};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry populated at start-up.
#[derive(Default)]
pub struct InMemoryLedgerRegistry {
    clients: RwLock<HashMap<Ticker, Arc<dyn LedgerClient>>>,
}

impl InMemoryLedgerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` under its own ticker, returning any client it replaced.
    pub fn register(&self, client: Arc<dyn LedgerClient>) -> Option<Arc<dyn LedgerClient>> {
        let ticker = client.ticker().clone();
        self.clients.write().insert(ticker, client)
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(self, client: Arc<dyn LedgerClient>) -> Self {
        self.register(client);
        self
    }

    /// Drop the client for `ticker`.
    pub fn unregister(&self, ticker: &Ticker) -> bool {
        self.clients.write().remove(ticker).is_some()
    }

    /// Supported tickers, sorted.
    pub fn tickers(&self) -> Vec<Ticker> {
        let mut tickers: Vec<_> = self.clients.read().keys().cloned().collect();
        tickers.sort();
        tickers
    }
}

impl LedgerClientRegistry for InMemoryLedgerRegistry {
    fn resolve(&self, ticker: &Ticker) -> Option<Arc<dyn LedgerClient>> {
        self.clients.read().get(ticker).cloned()
    }
}
