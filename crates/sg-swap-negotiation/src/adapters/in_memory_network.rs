//! In-Memory Network Adapter
//!
//! Byte-level transport between engines in one process. Every node owns a
//! bounded inbox; [`NetworkMessenger`] encodes with [`SwapCodec`] and pushes
//! into the recipient's inbox, and [`spawn_receiver`] drains an inbox into a
//! [`SwapProtocolApi`].

use crate::domain::{PeerAddress, SwapError};
use crate::events::{SwapCodec, SwapMessage};
use crate::ports::{PeerMessenger, SwapProtocolApi};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default inbox depth per node.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

/// Raw payload in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// Sending node
    pub from: PeerAddress,
    /// Encoded [`SwapMessage`]
    pub bytes: Vec<u8>,
}

/// Fully connected in-process network.
pub struct InMemoryNetwork {
    inboxes: RwLock<HashMap<PeerAddress, mpsc::Sender<Envelope>>>,
    codec: SwapCodec,
    capacity: usize,
}

impl InMemoryNetwork {
    /// Network with default inbox depth.
    pub fn new() -> Arc<Self> {
        Self::with_capacity(DEFAULT_INBOX_CAPACITY)
    }

    /// Network with `capacity`-deep inboxes.
    pub fn with_capacity(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            inboxes: RwLock::new(HashMap::new()),
            codec: SwapCodec::default(),
            capacity: capacity.max(1),
        })
    }

    /// Connect `address`, returning its messenger and inbox.
    ///
    /// Re-joining replaces the previous inbox.
    pub fn join(
        self: &Arc<Self>,
        address: PeerAddress,
    ) -> (NetworkMessenger, mpsc::Receiver<Envelope>) {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.inboxes.write().insert(address, tx);
        debug!("[swap] {} joined in-memory network", address);
        (
            NetworkMessenger {
                local: address,
                network: Arc::clone(self),
            },
            rx,
        )
    }

    /// Disconnect `address`. `true` if it was connected.
    pub fn leave(&self, address: PeerAddress) -> bool {
        self.inboxes.write().remove(&address).is_some()
    }

    /// Connected addresses.
    pub fn peers(&self) -> Vec<PeerAddress> {
        self.inboxes.read().keys().copied().collect()
    }

    async fn deliver(
        &self,
        from: PeerAddress,
        to: PeerAddress,
        bytes: Vec<u8>,
    ) -> Result<(), SwapError> {
        let inbox = self
            .inboxes
            .read()
            .get(&to)
            .cloned()
            .ok_or_else(|| SwapError::Messenger(format!("{} is not connected", to)))?;
        inbox
            .send(Envelope { from, bytes })
            .await
            .map_err(|_| SwapError::Messenger(format!("{} inbox closed", to)))
    }
}

/// [`PeerMessenger`] bound to one node of an [`InMemoryNetwork`].
#[derive(Clone)]
pub struct NetworkMessenger {
    local: PeerAddress,
    network: Arc<InMemoryNetwork>,
}

impl NetworkMessenger {
    /// Address this messenger sends from.
    pub fn local_address(&self) -> PeerAddress {
        self.local
    }
}

#[async_trait]
impl PeerMessenger for NetworkMessenger {
    async fn send(&self, peer: PeerAddress, message: SwapMessage) -> Result<(), SwapError> {
        let bytes = self.network.codec.encode(&message)?;
        debug!("[swap] {} -> {}: {}", self.local, peer, message.command());
        self.network.deliver(self.local, peer, bytes).await
    }

    async fn broadcast(
        &self,
        message: SwapMessage,
        exclude: Option<PeerAddress>,
    ) -> Result<(), SwapError> {
        let bytes = self.network.codec.encode(&message)?;
        let targets: Vec<PeerAddress> = self
            .network
            .peers()
            .into_iter()
            .filter(|p| *p != self.local && Some(*p) != exclude)
            .collect();
        for peer in targets {
            if let Err(e) = self.network.deliver(self.local, peer, bytes.clone()).await {
                warn!("[swap] broadcast to {} failed: {}", peer, e);
            }
        }
        Ok(())
    }
}

/// Feed every envelope in `inbox` to `api`, one at a time, until the
/// network drops the sender.
pub fn spawn_receiver<A>(api: Arc<A>, mut inbox: mpsc::Receiver<Envelope>) -> JoinHandle<()>
where
    A: SwapProtocolApi + ?Sized + 'static,
{
    tokio::spawn(async move {
        while let Some(envelope) = inbox.recv().await {
            // Failures are logged and counted by the engine.
            let _ = api.handle_bytes(envelope.from, &envelope.bytes).await;
        }
    })
}
