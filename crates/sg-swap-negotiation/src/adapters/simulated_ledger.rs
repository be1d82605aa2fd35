//! Simulated Ledger Adapter
//!
//! In-memory HTLC ledger implementing [`LedgerClient`]. Addresses are
//! `<ticker>1<counter>` in lower case; contracts are keyed by a hash of
//! their parameters. Used by the simulator binary and by tests.

use crate::algorithms::verify_secret;
use crate::domain::{
    ContractDetails, ContractParams, ContractReference, ReceivingAddress, SecureSecret, SwapError,
    Ticker,
};
use crate::ports::{LedgerClient, NetworkClock};
use async_trait::async_trait;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Lifecycle of a simulated HTLC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContractStatus {
    /// Funds locked.
    Funded,
    /// Recipient redeemed with the preimage.
    Redeemed,
    /// Funder reclaimed after the time lock.
    Refunded,
}

/// A contract held by the simulated ledger.
#[derive(Clone, Debug)]
pub struct SimulatedContract {
    /// Creation parameters.
    pub params: ContractParams,
    /// Current status.
    pub status: ContractStatus,
    /// Preimage published by redemption.
    pub revealed: Option<SecureSecret>,
}

#[derive(Default)]
struct LedgerState {
    next_address: u64,
    next_contract: u64,
    contracts: HashMap<ContractReference, SimulatedContract>,
    offline: bool,
}

/// In-memory HTLC ledger.
pub struct SimulatedLedger {
    ticker: Ticker,
    prefix: String,
    clock: Arc<dyn NetworkClock>,
    state: RwLock<LedgerState>,
}

impl SimulatedLedger {
    /// Ledger for `ticker` whose time locks are judged against `clock`.
    pub fn new(ticker: Ticker, clock: Arc<dyn NetworkClock>) -> Self {
        let prefix = format!("{}1", ticker.as_str().to_ascii_lowercase());
        Self {
            ticker,
            prefix,
            clock,
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Simulate the wallet going away: every call fails until restored.
    pub fn set_offline(&self, offline: bool) {
        self.state.write().offline = offline;
    }

    /// Look a contract up.
    pub fn contract(&self, contract: &ContractReference) -> Option<SimulatedContract> {
        self.state.read().contracts.get(contract).cloned()
    }

    /// Number of contracts ever funded.
    pub fn contract_count(&self) -> usize {
        self.state.read().contracts.len()
    }

    /// Preimage revealed by redeeming `contract`, if any.
    pub fn revealed_secret(&self, contract: &ContractReference) -> Option<SecureSecret> {
        self.state
            .read()
            .contracts
            .get(contract)
            .and_then(|c| c.revealed.clone())
    }

    /// Reclaim a funded contract once its time lock has passed.
    pub fn refund_contract(&self, contract: &ContractReference) -> Result<bool, SwapError> {
        let now = self.clock.adjusted_time();
        let mut state = self.state.write();
        self.ensure_online(&state)?;
        let entry = state
            .contracts
            .get_mut(contract)
            .ok_or_else(|| self.unknown(contract))?;
        if entry.status != ContractStatus::Funded || now < entry.params.time_lock {
            return Ok(false);
        }
        entry.status = ContractStatus::Refunded;
        info!("[swap] {} contract {} refunded", self.ticker, contract);
        Ok(true)
    }

    fn owns(&self, address: &ReceivingAddress) -> bool {
        address
            .as_str()
            .strip_prefix(&self.prefix)
            .map_or(false, |rest| {
                !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_hexdigit())
            })
    }

    fn ensure_online(&self, state: &LedgerState) -> Result<(), SwapError> {
        if state.offline {
            return Err(SwapError::ledger(&self.ticker, "wallet unavailable"));
        }
        Ok(())
    }

    fn unknown(&self, contract: &ContractReference) -> SwapError {
        SwapError::InvalidContract {
            ticker: self.ticker.to_string(),
            contract: contract.to_string(),
            reason: "unknown contract".to_string(),
        }
    }
}

#[async_trait]
impl LedgerClient for SimulatedLedger {
    fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    async fn generate_receiving_address(&self) -> Result<ReceivingAddress, SwapError> {
        let mut state = self.state.write();
        self.ensure_online(&state)?;
        state.next_address += 1;
        ReceivingAddress::new(format!("{}{:08x}", self.prefix, state.next_address))
    }

    async fn is_valid_address(&self, address: &ReceivingAddress) -> Result<bool, SwapError> {
        self.ensure_online(&self.state.read())?;
        Ok(self.owns(address))
    }

    async fn create_contract(
        &self,
        params: ContractParams,
    ) -> Result<ContractReference, SwapError> {
        let mut state = self.state.write();
        self.ensure_online(&state)?;
        for address in [&params.recipient, &params.refund_to] {
            if !self.owns(address) {
                return Err(SwapError::InvalidAddress {
                    ticker: self.ticker.to_string(),
                    address: address.to_string(),
                });
            }
        }
        if params.amount == 0 {
            return Err(SwapError::ledger(&self.ticker, "zero-value contract"));
        }

        state.next_contract += 1;
        let mut hasher = Sha256::new();
        hasher.update(self.ticker.as_str().as_bytes());
        hasher.update(state.next_contract.to_le_bytes());
        hasher.update(params.hash_lock);
        hasher.update(params.time_lock.to_le_bytes());
        let reference = ContractReference::new(hex::encode(&hasher.finalize()[..16]))?;

        debug!(
            "[swap] {} contract {} locks {} for {} until {}",
            self.ticker, reference, params.amount, params.recipient, params.time_lock
        );
        state.contracts.insert(
            reference.clone(),
            SimulatedContract {
                params,
                status: ContractStatus::Funded,
                revealed: None,
            },
        );
        Ok(reference)
    }

    async fn verify_contract(
        &self,
        contract: &ContractReference,
    ) -> Result<ContractDetails, SwapError> {
        let state = self.state.read();
        self.ensure_online(&state)?;
        let entry = state
            .contracts
            .get(contract)
            .ok_or_else(|| self.unknown(contract))?;
        if entry.status != ContractStatus::Funded {
            return Err(SwapError::InvalidContract {
                ticker: self.ticker.to_string(),
                contract: contract.to_string(),
                reason: format!("already {:?}", entry.status),
            });
        }
        Ok(ContractDetails {
            contract: contract.clone(),
            recipient: entry.params.recipient.clone(),
            amount: entry.params.amount,
            hash_lock: entry.params.hash_lock,
            time_lock: entry.params.time_lock,
        })
    }

    async fn redeem_contract(
        &self,
        contract: &ContractReference,
        secret: &SecureSecret,
    ) -> Result<bool, SwapError> {
        let now = self.clock.adjusted_time();
        let mut state = self.state.write();
        self.ensure_online(&state)?;
        let entry = state
            .contracts
            .get_mut(contract)
            .ok_or_else(|| self.unknown(contract))?;
        if entry.status != ContractStatus::Funded
            || now >= entry.params.time_lock
            || !verify_secret(secret.as_bytes(), &entry.params.hash_lock)
        {
            return Ok(false);
        }
        entry.status = ContractStatus::Redeemed;
        entry.revealed = Some(secret.clone());
        info!("[swap] {} contract {} redeemed", self.ticker, contract);
        Ok(true)
    }
}
