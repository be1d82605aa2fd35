//! # Handshake Over The In-Memory Network
//!
//! Engines exchange encoded messages through [`InMemoryNetwork`] inboxes and
//! real receive loops, so these flows cover the codec, the relay filter and
//! both sides of the state machine together.
//!
//! ## Flow Tested:
//!
//! 1. Bob advertises 1 BTC for 100 LUX, nobody holds the complement
//! 2. Alice advertises 100 LUX for 1 BTC; Bob binds it and answers
//! 3. Six messages later both books are empty, two HTLCs share one hash lock
//! 4. Bob claims Alice's HTLC with the secret her redemption revealed

#[cfg(test)]
mod tests {
    use crate::fixtures::{addr, ticker, Ledgers};
    use sg_swap_negotiation::adapters::{
        spawn_receiver, ContractStatus, InMemoryNetwork, SimulatedLedger,
    };
    use sg_swap_negotiation::{
        create_hash_lock, ContractReference, LedgerClient, OrderHandle, SwapEngine,
        SwapProtocolApi, SwapState,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;
    use tokio_test::assert_ok;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Node {
        engine: Arc<SwapEngine>,
        receiver: JoinHandle<()>,
    }

    fn node(network: &Arc<InMemoryNetwork>, ledgers: &Ledgers, n: u8) -> Node {
        let (messenger, inbox) = network.join(addr(n));
        let (engine, _notices) = ledgers.engine(addr(n), Arc::new(messenger));
        let engine = Arc::new(engine);
        let receiver = spawn_receiver(Arc::clone(&engine), inbox);
        Node { engine, receiver }
    }

    async fn wait_for(mut done: impl FnMut() -> bool) {
        timeout(Duration::from_secs(5), async {
            while !done() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached within 5s");
    }

    async fn place(
        node: &Node,
        base: &str,
        rel: &str,
        base_amount: u64,
        rel_amount: u64,
    ) -> OrderHandle {
        let order = node
            .engine
            .make_order(ticker(base), ticker(rel), base_amount, rel_amount);
        assert_ok!(node.engine.place_order(order).await)
    }

    fn contract_of(ledger: &SimulatedLedger, handle: &OrderHandle, ours: bool) -> ContractReference {
        let contract = if ours {
            handle.our_contract()
        } else {
            handle.counterparty_contract()
        };
        let contract = contract.expect("contract recorded");
        assert!(ledger.contract(&contract).is_some(), "{} unknown to ledger", contract);
        contract
    }

    // =============================================================================
    // INTEGRATION TESTS: TWO NODES
    // =============================================================================

    #[tokio::test]
    async fn test_full_handshake_empties_both_books() {
        let ledgers = Ledgers::new();
        let network = InMemoryNetwork::new();
        let alice = node(&network, &ledgers, 1);
        let bob = node(&network, &ledgers, 2);

        let bob_handle = place(&bob, "BTC", "LUX", 1, 100).await;
        wait_for(|| alice.engine.metrics().orders_relayed == 1).await;

        let alice_handle = place(&alice, "LUX", "BTC", 100, 1).await;
        wait_for(|| alice.engine.book().is_empty() && bob.engine.book().is_empty()).await;

        // Bob held the complement, Alice initiated the contracts.
        assert_eq!(bob.engine.metrics().matches_found, 1);
        assert_eq!(bob_handle.state(), SwapState::ContractAcknowledged);
        assert_eq!(bob_handle.counterparty(), Some(addr(1)));
        assert_eq!(alice_handle.counterparty(), Some(addr(2)));
        assert_eq!(alice.engine.metrics().swaps_completed, 1);
        assert_eq!(bob.engine.metrics().swaps_completed, 1);
        assert_eq!(alice.engine.metrics().messages_dropped, 0);
        assert_eq!(bob.engine.metrics().messages_dropped, 0);
        assert_eq!(alice.engine.refunds().pending(), 0);

        // Alice's LUX HTLC pays Bob; Bob's BTC HTLC paid Alice and is redeemed.
        let lux_contract = contract_of(&ledgers.lux, &alice_handle, true);
        let btc_contract = contract_of(&ledgers.btc, &bob_handle, true);
        assert_eq!(contract_of(&ledgers.lux, &bob_handle, false), lux_contract);
        assert_eq!(
            ledgers.btc.contract(&btc_contract).unwrap().status,
            ContractStatus::Redeemed
        );

        let lux = ledgers.lux.contract(&lux_contract).unwrap();
        let btc = ledgers.btc.contract(&btc_contract).unwrap();
        assert_eq!(lux.params.amount, 100);
        assert_eq!(btc.params.amount, 1);
        assert_eq!(lux.params.hash_lock, btc.params.hash_lock);
        assert!(lux.params.time_lock > btc.params.time_lock);

        // The revealed preimage opens Alice's HTLC for Bob.
        let secret = ledgers.btc.revealed_secret(&btc_contract).unwrap();
        assert_eq!(create_hash_lock(secret.as_bytes()), lux.params.hash_lock);
        assert!(assert_ok!(ledgers.lux.redeem_contract(&lux_contract, &secret).await));

        alice.receiver.abort();
        bob.receiver.abort();
    }

    #[tokio::test]
    async fn test_non_matching_orders_stay_open() {
        let ledgers = Ledgers::new();
        let network = InMemoryNetwork::new();
        let alice = node(&network, &ledgers, 1);
        let bob = node(&network, &ledgers, 2);

        place(&bob, "BTC", "LUX", 1, 100).await;
        wait_for(|| alice.engine.metrics().orders_relayed == 1).await;
        // Different rel amount: no match.
        place(&alice, "LUX", "BTC", 100, 2).await;
        wait_for(|| bob.engine.metrics().orders_relayed == 1).await;

        assert_eq!(alice.engine.book().len(), 1);
        assert_eq!(bob.engine.book().len(), 1);
        for snapshot in alice.engine.snapshot().iter().chain(bob.engine.snapshot().iter()) {
            assert_eq!(snapshot.state, SwapState::Open);
        }
        assert_eq!(ledgers.lux.contract_count(), 0);
        assert_eq!(ledgers.btc.contract_count(), 0);
    }

    #[tokio::test]
    async fn test_simultaneous_complementary_orders_complete() {
        let ledgers = Ledgers::new();
        let network = InMemoryNetwork::new();
        let alice = node(&network, &ledgers, 1);
        let bob = node(&network, &ledgers, 2);

        // No wait between the two: each side may bind the other's order.
        let (alice_handle, bob_handle) = tokio::join!(
            place(&alice, "LUX", "BTC", 100, 1),
            place(&bob, "BTC", "LUX", 1, 100)
        );
        wait_for(|| alice.engine.book().is_empty() && bob.engine.book().is_empty()).await;

        assert_eq!(alice_handle.counterparty(), Some(addr(2)));
        assert_eq!(bob_handle.counterparty(), Some(addr(1)));
        assert_eq!(alice.engine.metrics().swaps_completed, 1);
        assert_eq!(bob.engine.metrics().swaps_completed, 1);
        assert_eq!(ledgers.lux.contract_count(), 1);
        assert_eq!(ledgers.btc.contract_count(), 1);
        assert_eq!(alice.engine.refunds().pending(), 0);
        assert_eq!(bob.engine.refunds().pending(), 0);

        alice.receiver.abort();
        bob.receiver.abort();
    }

    // =============================================================================
    // INTEGRATION TESTS: RELAY
    // =============================================================================

    #[tokio::test]
    async fn test_three_nodes_relay_each_order_once() {
        let ledgers = Ledgers::new();
        let network = InMemoryNetwork::new();
        let alice = node(&network, &ledgers, 1);
        let bob = node(&network, &ledgers, 2);
        let carol = node(&network, &ledgers, 3);

        place(&alice, "LUX", "BTC", 100, 1).await;
        wait_for(|| {
            bob.engine.metrics().orders_relayed == 1 && carol.engine.metrics().orders_relayed == 1
        })
        .await;
        // Let any duplicate copies drain.
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(bob.engine.metrics().orders_relayed, 1);
        assert_eq!(carol.engine.metrics().orders_relayed, 1);
        assert_eq!(alice.engine.metrics().orders_relayed, 0);
        assert!(bob.engine.book().is_empty());
        assert!(carol.engine.book().is_empty());
        assert_eq!(alice.engine.book().len(), 1);
    }

    #[tokio::test]
    async fn test_relayed_order_matched_by_third_node() {
        let ledgers = Ledgers::new();
        let network = InMemoryNetwork::new();
        let alice = node(&network, &ledgers, 1);
        let bob = node(&network, &ledgers, 2);
        let carol = node(&network, &ledgers, 3);

        let carol_handle = place(&carol, "BTC", "LUX", 1, 100).await;
        wait_for(|| {
            alice.engine.metrics().orders_relayed == 1 && bob.engine.metrics().orders_relayed == 1
        })
        .await;

        let alice_handle = place(&alice, "LUX", "BTC", 100, 1).await;
        wait_for(|| alice.engine.book().is_empty() && carol.engine.book().is_empty()).await;

        assert_eq!(alice_handle.counterparty(), Some(addr(3)));
        assert_eq!(carol_handle.counterparty(), Some(addr(1)));
        assert_eq!(carol.engine.metrics().matches_found, 1);
        assert_eq!(bob.engine.metrics().matches_found, 0);
        assert!(bob.engine.book().is_empty());
    }
}
