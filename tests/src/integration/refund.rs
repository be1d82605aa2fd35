//! # Refund Deadlines
//!
//! The initiator side funds a real simulated HTLC, the peer goes silent,
//! and the refund deadline fires on paused tokio time. The notice must name
//! a contract the ledger will refund once its time lock has passed.

#[cfg(test)]
mod tests {
    use crate::fixtures::{addr, order, Ledgers, NOW};
    use sg_swap_negotiation::adapters::ContractStatus;
    use sg_swap_negotiation::{
        ContractReference, LedgerClient, OrderHandle, RefundNotice, SwapConfig, SwapEngine,
        SwapError, SwapMessage, SwapProtocolApi, SwapState,
    };
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio_test::{assert_err, assert_ok};

    /// Place 100 LUX for 1 BTC at node 1 and drive it to CONTRACT_CREATED
    /// against a silent peer at node 2.
    async fn funded_order(
        ledgers: &Ledgers,
    ) -> (SwapEngine, OrderHandle, UnboundedReceiver<RefundNotice>) {
        let (engine, messenger, notices) = ledgers.mock_engine(addr(1));
        let local = order("LUX", "BTC", 100, 1, addr(1));
        let handle = assert_ok!(engine.place_order(local).await);

        let remote = order("BTC", "LUX", 1, 100, addr(2));
        assert_ok!(
            engine
                .handle_message(addr(2), SwapMessage::OrderMatch(remote.clone()))
                .await
        );
        let their_lux = assert_ok!(ledgers.lux.generate_receiving_address().await);
        assert_ok!(
            engine
                .handle_message(
                    addr(2),
                    SwapMessage::SwapAddressAck {
                        order: remote,
                        address: their_lux,
                    },
                )
                .await
        );
        assert_eq!(handle.state(), SwapState::ContractCreated);
        assert_eq!(messenger.sent().len(), 3);
        (engine, handle, notices)
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_peer_triggers_refund_of_funded_contract() {
        let ledgers = Ledgers::new();
        let (engine, handle, mut notices) = funded_order(&ledgers).await;
        let lock = SwapConfig::default().contract_lock_secs;

        tokio::time::advance(Duration::from_secs(lock + 1)).await;
        let notice = notices.recv().await.expect("refund notice");

        assert_eq!(notice.record, handle.record());
        assert_eq!(notice.ticker.as_str(), "LUX");
        assert_eq!(notice.deadline, NOW + lock);
        assert_eq!(handle.state(), SwapState::Refunding);
        assert_eq!(engine.metrics().refunds_triggered, 1);

        // The ledger only agrees once its own clock has passed the lock.
        let contract = notice.contract.expect("contract in notice");
        assert!(!assert_ok!(ledgers.lux.refund_contract(&contract)));
        ledgers.clock.advance(lock);
        assert!(assert_ok!(ledgers.lux.refund_contract(&contract)));
        assert_eq!(
            ledgers.lux.contract(&contract).unwrap().status,
            ContractStatus::Refunded
        );

        assert_ok!(engine.complete_refund(&handle));
        assert!(engine.book().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_refund_before_deadline() {
        let ledgers = Ledgers::new();
        let (engine, handle, mut notices) = funded_order(&ledgers).await;
        let lock = SwapConfig::default().contract_lock_secs;

        tokio::time::advance(Duration::from_secs(lock - 60)).await;
        tokio::task::yield_now().await;

        assert!(notices.try_recv().is_err());
        assert_eq!(handle.state(), SwapState::ContractCreated);
        assert!(engine.refunds().is_armed(&handle));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refunding_order_cannot_be_cancelled() {
        let ledgers = Ledgers::new();
        let (engine, handle, mut notices) = funded_order(&ledgers).await;

        let lock = SwapConfig::default().contract_lock_secs;

        tokio::time::advance(Duration::from_secs(lock + 1)).await;
        assert!(notices.recv().await.is_some());

        let err = assert_err!(engine.cancel_order(&handle));
        assert!(matches!(err, SwapError::CannotCancel(_)));
        assert_eq!(engine.book().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_contract_ack_after_refund_is_dropped() {
        let ledgers = Ledgers::new();
        let (engine, handle, mut notices) = funded_order(&ledgers).await;
        let lock = SwapConfig::default().contract_lock_secs;
        tokio::time::advance(Duration::from_secs(lock + 1)).await;
        assert!(notices.recv().await.is_some());

        let bogus = assert_ok!(ContractReference::new("late"));
        let result = engine
            .handle_message(
                addr(2),
                SwapMessage::ContractAck {
                    order: order("BTC", "LUX", 1, 100, addr(2)),
                    contract: bogus,
                },
            )
            .await;
        assert!(result.is_err());
        assert_eq!(handle.state(), SwapState::Refunding);
    }
}
