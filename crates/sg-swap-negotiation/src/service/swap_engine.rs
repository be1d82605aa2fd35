//! # Swap Engine
//!
//! The negotiation state machine. One instance per node, shared via `Arc`
//! between the transport's receive loop and the host's local API.
//!
//! ## Handshake
//!
//! ```text
//!   B (broadcaster)                          A (holder of complement)
//!   place_order ── create_order ──────────►  bind Open -> MATCH_FOUND
//!   Open -> SWAP_REQUESTED  ◄──── order_match
//!               ── request_swap_address ──►  MATCH_FOUND -> SWAP_ACKNOWLEDGED
//!   fund HTLC, arm refund ◄─ swap_address_ack
//!   SWAP_REQUESTED -> CONTRACT_CREATED
//!               ── contract_created ──────►  verify, fund reciprocal HTLC
//!   verify, redeem ◄────────── contract_ack  CONTRACT_ACKNOWLEDGED, removed
//!   removed, refund disarmed
//! ```
//!
//! Each handler looks the local order up, performs its ledger calls with no
//! lock held, commits by compare-and-set and only then sends its reply.

use super::order_book::OrderBook;
use super::refund_scheduler::RefundScheduler;
use super::relay_filter::RelayFilter;
use crate::algorithms::{generate_random_secret, initiator_timelock, validate_counterparty_timelock};
use crate::domain::{
    ContractDetails, ContractParams, ContractReference, ErrorKind, Order, OrderHandle,
    OrderSnapshot, PeerAddress, ReceivingAddress, RemoteOrder, SwapConfig, SwapError, SwapState,
    Ticker,
};
use crate::events::{SwapCodec, SwapMessage};
use crate::metrics::{MetricsSnapshot, SwapMetrics};
use crate::ports::{
    LedgerClient, LedgerClientRegistry, NetworkClock, PeerMessenger, RefundReporter,
    SwapProtocolApi,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Collaborators the engine is wired to.
#[derive(Clone)]
pub struct SwapDependencies {
    /// Ticker to ledger client lookup
    pub ledgers: Arc<dyn LedgerClientRegistry>,
    /// Transport
    pub messenger: Arc<dyn PeerMessenger>,
    /// Adjusted network time
    pub clock: Arc<dyn NetworkClock>,
    /// Sink for refund reports
    pub refund_reporter: Arc<dyn RefundReporter>,
}

/// Swap negotiation engine.
pub struct SwapEngine {
    local_address: PeerAddress,
    config: SwapConfig,
    book: Arc<OrderBook>,
    relay: RelayFilter,
    refunds: RefundScheduler,
    ledgers: Arc<dyn LedgerClientRegistry>,
    messenger: Arc<dyn PeerMessenger>,
    clock: Arc<dyn NetworkClock>,
    codec: SwapCodec,
    metrics: Arc<SwapMetrics>,
}

impl SwapEngine {
    /// Engine with default configuration.
    pub fn new(local_address: PeerAddress, deps: SwapDependencies) -> Self {
        Self::build(local_address, deps, SwapConfig::default())
    }

    /// Engine with custom configuration.
    pub fn with_config(
        local_address: PeerAddress,
        deps: SwapDependencies,
        config: SwapConfig,
    ) -> Result<Self, SwapError> {
        config.validate()?;
        Ok(Self::build(local_address, deps, config))
    }

    fn build(local_address: PeerAddress, deps: SwapDependencies, config: SwapConfig) -> Self {
        let book = Arc::new(OrderBook::new());
        let metrics = Arc::new(SwapMetrics::new());
        let refunds = RefundScheduler::new(
            Arc::clone(&book),
            Arc::clone(&deps.clock),
            deps.refund_reporter,
            Arc::clone(&metrics),
        );
        Self {
            local_address,
            relay: RelayFilter::new(config.relay_cache_size),
            codec: SwapCodec::new(config.max_message_bytes),
            config,
            book,
            refunds,
            ledgers: deps.ledgers,
            messenger: deps.messenger,
            clock: deps.clock,
            metrics,
        }
    }

    /// Address this node advertises as order sender.
    pub fn local_address(&self) -> PeerAddress {
        self.local_address
    }

    /// Active configuration.
    pub fn config(&self) -> &SwapConfig {
        &self.config
    }

    /// The local order book.
    pub fn book(&self) -> &Arc<OrderBook> {
        &self.book
    }

    /// Refund deadlines.
    pub fn refunds(&self) -> &RefundScheduler {
        &self.refunds
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Codec used by [`SwapProtocolApi::handle_bytes`].
    pub fn codec(&self) -> &SwapCodec {
        &self.codec
    }

    /// Order from this node offering `base_amount` of `base` for
    /// `rel_amount` of `rel`.
    pub fn make_order(&self, base: Ticker, rel: Ticker, base_amount: u64, rel_amount: u64) -> Order {
        Order::new(base, rel, base_amount, rel_amount, self.local_address)
    }

    fn resolve(&self, ticker: &Ticker) -> Result<Arc<dyn LedgerClient>, SwapError> {
        self.ledgers
            .resolve(ticker)
            .ok_or_else(|| SwapError::UnsupportedTicker(ticker.to_string()))
    }

    async fn check_address(
        &self,
        ticker: &Ticker,
        address: &ReceivingAddress,
    ) -> Result<(), SwapError> {
        let client = self.resolve(ticker)?;
        if !client.is_valid_address(address).await? {
            return Err(SwapError::InvalidAddress {
                ticker: ticker.to_string(),
                address: address.to_string(),
            });
        }
        Ok(())
    }

    fn log_drop(&self, command: &str, from: PeerAddress, error: &SwapError) {
        self.metrics.record_dropped();
        match error.kind() {
            ErrorKind::ProtocolMismatch => {
                debug!("[swap] {} from {} dropped: {}", command, from, error)
            }
            ErrorKind::Local => info!("[swap] {} from {} dropped: {}", command, from, error),
            ErrorKind::InvalidEvidence
            | ErrorKind::MissingCapability
            | ErrorKind::Malformed
            | ErrorKind::External => {
                warn!("[swap] {} from {} dropped: {}", command, from, error)
            }
        }
    }

    async fn dispatch(&self, from: PeerAddress, message: SwapMessage) -> Result<(), SwapError> {
        message.order().validate()?;
        match message {
            SwapMessage::CreateOrder(order) => self.on_create_order(from, order).await,
            SwapMessage::OrderMatch(order) => self.on_order_match(from, order).await,
            SwapMessage::RequestSwapAddress { order, address } => {
                self.on_request_swap_address(from, order, address).await
            }
            SwapMessage::SwapAddressAck { order, address } => {
                self.on_swap_address_ack(from, order, address).await
            }
            SwapMessage::ContractCreated { order, contract } => {
                self.on_contract_created(from, order, contract).await
            }
            SwapMessage::ContractAck { order, contract } => {
                self.on_contract_ack(from, order, contract).await
            }
        }
    }

    async fn on_create_order(&self, from: PeerAddress, remote: RemoteOrder) -> Result<(), SwapError> {
        if remote.sender == self.local_address {
            return Err(SwapError::AlreadySeen(remote.id().to_string()));
        }

        // Matching runs before the relay filter; the filter only limits relaying.
        match self
            .book
            .bind_complement(&remote, SwapState::Open, SwapState::MatchFound)
        {
            Ok(local) => {
                self.relay.first_sighting(&remote);
                self.metrics.record_match();
                info!(
                    "[swap] match found: local {} {} <-> {}",
                    local.record(),
                    local.order(),
                    remote
                );
                self.messenger
                    .send(remote.sender, SwapMessage::OrderMatch(local.order().clone()))
                    .await
            }
            Err(SwapError::NoComplementaryOrder { .. }) => {
                if !self.relay.first_sighting(&remote) {
                    return Err(SwapError::AlreadySeen(remote.id().to_string()));
                }
                debug!("[swap] relaying {} from {}", remote, from);
                self.messenger
                    .broadcast(SwapMessage::CreateOrder(remote), Some(from))
                    .await?;
                self.metrics.record_relayed();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn on_order_match(&self, from: PeerAddress, remote: RemoteOrder) -> Result<(), SwapError> {
        let (local, expected) = match self.book.find_in_state(&remote, SwapState::Open) {
            Ok(local) => (local, SwapState::Open),
            Err(e) => (self.crossed_match(&remote).ok_or(e)?, SwapState::MatchFound),
        };
        let client = self.resolve(&local.order().rel)?;
        let address = client.generate_receiving_address().await?;

        self.book
            .commit(&local, expected, SwapState::SwapRequested, |p| {
                p.counterparty = Some(remote.sender);
                p.our_address = Some(address.clone());
            })?;
        info!(
            "[swap] {} matched by {}; requesting swap address",
            local.record(),
            remote.sender
        );

        self.messenger
            .send(
                from,
                SwapMessage::RequestSwapAddress {
                    order: local.order().clone(),
                    address,
                },
            )
            .await
    }

    /// Both nodes bound each other's `create_order` and answered with
    /// `order_match`. The lower address carries on as the order owner; the
    /// other stays in `MatchFound` and waits for `request_swap_address`.
    fn crossed_match(&self, remote: &RemoteOrder) -> Option<OrderHandle> {
        if self.local_address >= remote.sender {
            return None;
        }
        let local = self.book.find_bound(remote, SwapState::MatchFound).ok()?;
        debug!(
            "[swap] {} crossed match with {}; taking the owner side",
            local.record(),
            remote.sender
        );
        Some(local)
    }

    async fn on_request_swap_address(
        &self,
        from: PeerAddress,
        remote: RemoteOrder,
        their_address: ReceivingAddress,
    ) -> Result<(), SwapError> {
        let local = self.book.find_bound(&remote, SwapState::MatchFound)?;
        self.check_address(&remote.rel, &their_address).await?;
        let client = self.resolve(&local.order().rel)?;
        let address = client.generate_receiving_address().await?;

        self.book.commit(
            &local,
            SwapState::MatchFound,
            SwapState::SwapAcknowledged,
            |p| {
                p.counterparty_address = Some(their_address);
                p.our_address = Some(address.clone());
            },
        )?;
        info!("[swap] {} addresses exchanged with {}", local.record(), from);

        self.messenger
            .send(
                from,
                SwapMessage::SwapAddressAck {
                    order: local.order().clone(),
                    address,
                },
            )
            .await
    }

    async fn on_swap_address_ack(
        &self,
        from: PeerAddress,
        remote: RemoteOrder,
        their_address: ReceivingAddress,
    ) -> Result<(), SwapError> {
        let local = self.book.find_bound(&remote, SwapState::SwapRequested)?;
        self.check_address(&remote.rel, &their_address).await?;

        let terms = local.order();
        let client = self.resolve(&terms.base)?;
        let refund_to = client.generate_receiving_address().await?;
        let secret = generate_random_secret();
        let hash_lock = secret.hash_lock();
        let time_lock = initiator_timelock(&self.config, self.clock.adjusted_time());

        let contract = client
            .create_contract(ContractParams {
                recipient: their_address.clone(),
                refund_to,
                amount: terms.base_amount,
                hash_lock,
                time_lock,
            })
            .await?;
        self.metrics.record_contract();

        let committed = self.book.commit(
            &local,
            SwapState::SwapRequested,
            SwapState::ContractCreated,
            |p| {
                p.counterparty_address = Some(their_address);
                p.our_contract = Some(contract.clone());
                p.hash_lock = Some(hash_lock);
                p.secret = Some(secret);
                p.refund_deadline = Some(time_lock);
            },
        );
        if let Err(e) = committed {
            self.refunds.report_orphaned(&local, contract, time_lock);
            return Err(e);
        }

        self.refunds.schedule_refund(Arc::clone(&local), time_lock);
        info!(
            "[swap] {} funded {} on {}; refund at {}",
            local.record(),
            contract,
            terms.base,
            time_lock
        );

        self.messenger
            .send(
                from,
                SwapMessage::ContractCreated {
                    order: terms.clone(),
                    contract,
                },
            )
            .await
    }

    async fn on_contract_created(
        &self,
        from: PeerAddress,
        remote: RemoteOrder,
        their_contract: ContractReference,
    ) -> Result<(), SwapError> {
        let local = self.book.find_bound(&remote, SwapState::SwapAcknowledged)?;
        let progress = local.progress();
        let terms = local.order();

        let rel_client = self.resolve(&terms.rel)?;
        let details = rel_client.verify_contract(&their_contract).await?;
        check_contract(&details, &terms.rel, progress.our_address.as_ref(), terms.rel_amount, None)?;
        let time_lock =
            validate_counterparty_timelock(&self.config, details.time_lock, self.clock.adjusted_time())?;

        let recipient = progress
            .counterparty_address
            .clone()
            .ok_or_else(|| missing(SwapState::SwapAcknowledged, "counter-party address"))?;
        let base_client = self.resolve(&terms.base)?;
        let refund_to = base_client.generate_receiving_address().await?;
        let contract = base_client
            .create_contract(ContractParams {
                recipient,
                refund_to,
                amount: terms.base_amount,
                hash_lock: details.hash_lock,
                time_lock,
            })
            .await?;
        self.metrics.record_contract();

        let committed = self.book.commit(
            &local,
            SwapState::SwapAcknowledged,
            SwapState::ContractAcknowledged,
            |p| {
                p.counterparty_contract = Some(their_contract);
                p.our_contract = Some(contract.clone());
                p.hash_lock = Some(details.hash_lock);
                p.refund_deadline = Some(time_lock);
            },
        );
        if let Err(e) = committed {
            self.refunds.report_orphaned(&local, contract, time_lock);
            return Err(e);
        }
        info!(
            "[swap] {} funded reciprocal {} on {}",
            local.record(),
            contract,
            terms.base
        );

        let sent = self
            .messenger
            .send(
                from,
                SwapMessage::ContractAck {
                    order: terms.clone(),
                    contract,
                },
            )
            .await;

        if self.book.remove(&local) {
            self.metrics.record_completed();
            info!("[swap] {} handshake complete", local.record());
        }
        sent
    }

    async fn on_contract_ack(
        &self,
        _from: PeerAddress,
        remote: RemoteOrder,
        their_contract: ContractReference,
    ) -> Result<(), SwapError> {
        let local = self.book.find_bound(&remote, SwapState::ContractCreated)?;
        let progress = local.progress();
        let terms = local.order();

        let client = self.resolve(&terms.rel)?;
        let details = client.verify_contract(&their_contract).await?;
        check_contract(
            &details,
            &terms.rel,
            progress.our_address.as_ref(),
            terms.rel_amount,
            progress.hash_lock.as_ref(),
        )?;

        let secret = progress
            .secret
            .as_ref()
            .ok_or_else(|| missing(SwapState::ContractCreated, "secret"))?;
        let deadline = progress
            .refund_deadline
            .ok_or_else(|| missing(SwapState::ContractCreated, "refund deadline"))?;

        // No refund may start once the secret is about to be revealed.
        self.refunds.cancel_refund(&local);
        self.book.commit(
            &local,
            SwapState::ContractCreated,
            SwapState::ContractAcknowledged,
            |p| p.counterparty_contract = Some(their_contract.clone()),
        )?;

        let redeemed = match client.redeem_contract(&their_contract, secret).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(SwapError::ledger(
                &terms.rel,
                format!("redeem of {} refused", their_contract),
            )),
            Err(e) => Err(e),
        };
        if let Err(e) = redeemed {
            warn!(
                "[swap] {} could not redeem {}; refund re-armed for {}",
                local.record(),
                their_contract,
                deadline
            );
            self.refunds.schedule_refund(Arc::clone(&local), deadline);
            return Err(e);
        }

        self.book.remove(&local);
        self.metrics.record_completed();
        info!(
            "[swap] {} redeemed {} on {}; swap complete",
            local.record(),
            their_contract,
            terms.rel
        );
        Ok(())
    }
}

fn check_contract(
    details: &ContractDetails,
    ticker: &Ticker,
    our_address: Option<&ReceivingAddress>,
    amount: u64,
    hash_lock: Option<&[u8; 32]>,
) -> Result<(), SwapError> {
    let invalid = |reason: String| SwapError::InvalidContract {
        ticker: ticker.to_string(),
        contract: details.contract.to_string(),
        reason,
    };
    if our_address != Some(&details.recipient) {
        return Err(invalid(format!("pays {}, not us", details.recipient)));
    }
    if details.amount != amount {
        return Err(invalid(format!(
            "locks {} instead of {}",
            details.amount, amount
        )));
    }
    if let Some(expected) = hash_lock {
        if &details.hash_lock != expected {
            return Err(invalid("hash lock differs from ours".to_string()));
        }
    }
    Ok(())
}

fn missing(state: SwapState, what: &str) -> SwapError {
    SwapError::StaleState {
        expected: format!("{} with {}", state, what),
        found: format!("{} without {}", state, what),
    }
}

#[async_trait]
impl SwapProtocolApi for SwapEngine {
    async fn handle_message(
        &self,
        from: PeerAddress,
        message: SwapMessage,
    ) -> Result<(), SwapError> {
        self.metrics.record_received();
        let command = message.command();
        debug!("[swap] {} from {}", message, from);
        let result = self.dispatch(from, message).await;
        if let Err(e) = &result {
            self.log_drop(command, from, e);
        }
        result
    }

    async fn handle_bytes(&self, from: PeerAddress, bytes: &[u8]) -> Result<(), SwapError> {
        match self.codec.decode(bytes) {
            Ok(message) => self.handle_message(from, message).await,
            Err(e) => {
                self.metrics.record_received();
                self.log_drop("<undecodable>", from, &e);
                Err(e)
            }
        }
    }

    async fn place_order(&self, order: Order) -> Result<OrderHandle, SwapError> {
        if order.sender != self.local_address {
            return Err(SwapError::InvalidOrder(format!(
                "sender {} is not this node ({})",
                order.sender, self.local_address
            )));
        }
        let handle = self.book.insert(order, self.clock.adjusted_time())?;
        self.metrics.record_placed();
        info!(
            "[swap] placed {} {} ({})",
            handle.record(),
            handle.order(),
            handle.id()
        );
        self.messenger
            .broadcast(SwapMessage::CreateOrder(handle.order().clone()), None)
            .await?;
        Ok(handle)
    }

    fn cancel_order(&self, handle: &OrderHandle) -> Result<(), SwapError> {
        let state = self.book.remove_negotiable(handle)?;
        self.refunds.cancel_refund(handle);
        self.metrics.record_cancelled(1);
        info!("[swap] cancelled {} in {}", handle.record(), state);
        Ok(())
    }

    fn handle_peer_disconnected(&self, peer: PeerAddress) -> usize {
        let removed = self.book.remove_bound_to(peer, |state| {
            matches!(
                state,
                SwapState::MatchFound | SwapState::SwapRequested | SwapState::SwapAcknowledged
            )
        });
        for handle in &removed {
            self.refunds.cancel_refund(handle);
            info!(
                "[swap] dropped {} after {} disconnected",
                handle.record(),
                peer
            );
        }
        self.metrics.record_cancelled(removed.len() as u64);
        removed.len()
    }

    fn complete_refund(&self, handle: &OrderHandle) -> Result<(), SwapError> {
        self.book.remove_if(handle, SwapState::Refunding)?;
        self.refunds.cancel_refund(handle);
        info!("[swap] refund of {} settled", handle.record());
        Ok(())
    }

    fn snapshot(&self) -> Vec<OrderSnapshot> {
        self.book.snapshot()
    }
}
