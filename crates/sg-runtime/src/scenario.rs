//! # Two-Node Swap
//!
//! Bob advertises the complement first, Alice answers with her order, and
//! the two engines run the handshake over the in-memory network. Once both
//! books are empty Bob claims Alice's HTLC with the secret her redemption
//! revealed, which settles the swap on both ledgers.

use crate::config::SimConfig;
use crate::node::SimNode;
use anyhow::{bail, ensure, Context, Result};
use sg_swap_negotiation::adapters::{
    AdjustedClock, InMemoryLedgerRegistry, InMemoryNetwork, SimulatedLedger,
};
use sg_swap_negotiation::{
    ContractReference, LedgerClient, MetricsSnapshot, NetworkClock, SwapProtocolApi,
};
use sg_telemetry::{log_event, log_order_event};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of [`run_swap`].
#[derive(Debug, Clone)]
pub struct SwapReport {
    /// Alice's counters.
    pub alice: MetricsSnapshot,
    /// Bob's counters.
    pub bob: MetricsSnapshot,
    /// HTLC Alice funded on the `base` ledger, claimed by Bob.
    pub base_contract: ContractReference,
    /// HTLC Bob funded on the `rel` ledger, redeemed by Alice.
    pub rel_contract: ContractReference,
    /// Wall time from Bob's order to settlement.
    pub elapsed: Duration,
}

impl fmt::Display for SwapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "swap settled in {:?}", self.elapsed)?;
        writeln!(f, "  base contract: {}", self.base_contract)?;
        writeln!(f, "  rel contract:  {}", self.rel_contract)?;
        for (name, m) in [("alice", &self.alice), ("bob", &self.bob)] {
            writeln!(
                f,
                "  {:<5} received={} dropped={} placed={} relayed={} matched={} funded={} completed={}",
                name,
                m.messages_received,
                m.messages_dropped,
                m.orders_placed,
                m.orders_relayed,
                m.matches_found,
                m.contracts_created,
                m.swaps_completed
            )?;
        }
        Ok(())
    }
}

/// Run one swap between two fresh nodes.
pub async fn run_swap(config: &SimConfig) -> Result<SwapReport> {
    config.validate()?;
    let started = Instant::now();

    let clock: Arc<dyn NetworkClock> = Arc::new(AdjustedClock::system());
    let base_ledger = Arc::new(SimulatedLedger::new(config.base.clone(), Arc::clone(&clock)));
    let rel_ledger = Arc::new(SimulatedLedger::new(config.rel.clone(), Arc::clone(&clock)));
    let registry = || {
        Arc::new(
            InMemoryLedgerRegistry::new()
                .with(base_ledger.clone())
                .with(rel_ledger.clone()),
        )
    };

    let network = InMemoryNetwork::new();
    let alice = SimNode::start(
        "alice",
        config.alice,
        &network,
        registry(),
        Arc::clone(&clock),
        config.swap.clone(),
    )?;
    let bob = SimNode::start(
        "bob",
        config.bob,
        &network,
        registry(),
        Arc::clone(&clock),
        config.swap.clone(),
    )?;

    let bob_order = bob.engine().make_order(
        config.rel.clone(),
        config.base.clone(),
        config.rel_amount,
        config.base_amount,
    );
    let bob_handle = bob.engine().place_order(bob_order).await?;
    log_order_event!(info, "runtime", "bob placed order", bob_handle.id(), terms = %bob_handle.order());

    // Bob holds the complement when Alice's order arrives, so Alice funds first.
    wait_until(config.timeout, || alice.engine().metrics().messages_received >= 1)
        .await
        .context("bob's order never reached alice")?;

    let alice_order = alice.engine().make_order(
        config.base.clone(),
        config.rel.clone(),
        config.base_amount,
        config.rel_amount,
    );
    let alice_handle = alice.engine().place_order(alice_order).await?;
    log_order_event!(info, "runtime", "alice placed order", alice_handle.id(), terms = %alice_handle.order());

    wait_until(config.timeout, || {
        alice.engine().book().is_empty() && bob.engine().book().is_empty()
    })
    .await
    .with_context(|| {
        format!(
            "handshake stalled: alice {}, bob {}",
            alice_handle.state(),
            bob_handle.state()
        )
    })?;

    let base_contract = bob_handle
        .counterparty_contract()
        .context("bob never saw alice's contract")?;
    let rel_contract = bob_handle
        .our_contract()
        .context("bob never funded his contract")?;

    let secret = rel_ledger
        .revealed_secret(&rel_contract)
        .context("alice's redemption revealed no secret")?;
    if !base_ledger.redeem_contract(&base_contract, &secret).await? {
        bail!("bob could not claim {}", base_contract);
    }
    log_event!(info, "runtime", "swap settled", base = %base_contract, rel = %rel_contract);

    let report = SwapReport {
        alice: alice.engine().metrics(),
        bob: bob.engine().metrics(),
        base_contract,
        rel_contract,
        elapsed: started.elapsed(),
    };
    ensure!(
        report.alice.swaps_completed == 1 && report.bob.swaps_completed == 1,
        "unexpected completion counts: {:?} / {:?}",
        report.alice,
        report.bob
    );

    alice.shutdown();
    bob.shutdown();
    Ok(report)
}

async fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while !done() {
        if Instant::now() >= deadline {
            bail!("timed out after {:?}", timeout);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    Ok(())
}
