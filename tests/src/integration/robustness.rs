//! # Robustness
//!
//! Messages that do not belong to any negotiation, or that carry evidence
//! the ledgers reject, must leave the book exactly as it was.

#[cfg(test)]
mod tests {
    use crate::fixtures::{addr, order, Ledgers};
    use sg_swap_negotiation::{
        ContractParams, ContractReference, ErrorKind, LedgerClient, OrderSnapshot, SwapCodec,
        SwapMessage, SwapProtocolApi, SwapState,
    };
    use tokio_test::{assert_err, assert_ok};

    fn states(snapshot: &[OrderSnapshot]) -> Vec<SwapState> {
        snapshot.iter().map(|s| s.state).collect()
    }

    #[tokio::test]
    async fn test_unrelated_messages_leave_book_unchanged() {
        let ledgers = Ledgers::new();
        let (engine, messenger, _notices) = ledgers.mock_engine(addr(1));
        assert_ok!(engine.place_order(order("LUX", "BTC", 100, 1, addr(1))).await);
        messenger.take();
        let before = engine.snapshot();

        let stranger = order("ETH", "LTC", 5, 7, addr(9));
        let address = assert_ok!(ledgers.btc.generate_receiving_address().await);
        let contract = assert_ok!(ContractReference::new("feedface"));
        let unrelated = vec![
            SwapMessage::OrderMatch(stranger.clone()),
            SwapMessage::RequestSwapAddress {
                order: stranger.clone(),
                address: address.clone(),
            },
            SwapMessage::SwapAddressAck {
                order: stranger.clone(),
                address,
            },
            SwapMessage::ContractCreated {
                order: stranger.clone(),
                contract: contract.clone(),
            },
            SwapMessage::ContractAck {
                order: stranger,
                contract,
            },
        ];
        for message in unrelated {
            assert_err!(engine.handle_message(addr(9), message).await);
        }

        assert_eq!(engine.snapshot(), before);
        assert!(messenger.sent().is_empty());
        assert_eq!(engine.metrics().messages_dropped, 5);
    }

    #[tokio::test]
    async fn test_out_of_order_messages_for_open_order_are_dropped() {
        let ledgers = Ledgers::new();
        let (engine, messenger, _notices) = ledgers.mock_engine(addr(1));
        let handle = assert_ok!(engine.place_order(order("LUX", "BTC", 100, 1, addr(1))).await);
        messenger.take();

        // A complement that skips straight to contract_created.
        let remote = order("BTC", "LUX", 1, 100, addr(2));
        let err = assert_err!(
            engine
                .handle_message(
                    addr(2),
                    SwapMessage::ContractCreated {
                        order: remote,
                        contract: assert_ok!(ContractReference::new("0011")),
                    },
                )
                .await
        );
        assert_eq!(err.kind(), ErrorKind::ProtocolMismatch);
        assert_eq!(handle.state(), SwapState::Open);
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_garbage_bytes_are_counted_and_dropped() {
        let ledgers = Ledgers::new();
        let (engine, messenger, _notices) = ledgers.mock_engine(addr(1));
        assert_ok!(engine.place_order(order("LUX", "BTC", 100, 1, addr(1))).await);
        let before = engine.snapshot();

        let err = assert_err!(engine.handle_bytes(addr(2), &[0xFF, 0x00, 0x13]).await);
        assert_eq!(err.kind(), ErrorKind::Malformed);

        let mut bytes = assert_ok!(SwapCodec::default().encode(&SwapMessage::OrderMatch(order(
            "BTC",
            "LUX",
            1,
            100,
            addr(2)
        ))));
        bytes.push(0);
        assert_err!(engine.handle_bytes(addr(2), &bytes).await);

        assert_eq!(engine.snapshot(), before);
        assert_eq!(engine.metrics().messages_received, 2);
        assert_eq!(engine.metrics().messages_dropped, 2);
        assert_eq!(messenger.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_forged_contract_is_rejected_before_funding() {
        let ledgers = Ledgers::new();
        let (engine, messenger, _notices) = ledgers.mock_engine(addr(1));
        let local = order("LUX", "BTC", 100, 1, addr(1));
        let handle = assert_ok!(engine.place_order(local).await);

        // Peer 2 broadcasts the complement; we hold it, so we answer.
        let remote = order("BTC", "LUX", 1, 100, addr(2));
        assert_ok!(
            engine
                .handle_message(addr(2), SwapMessage::CreateOrder(remote.clone()))
                .await
        );
        let their_lux = assert_ok!(ledgers.lux.generate_receiving_address().await);
        assert_ok!(
            engine
                .handle_message(
                    addr(2),
                    SwapMessage::RequestSwapAddress {
                        order: remote.clone(),
                        address: their_lux,
                    },
                )
                .await
        );
        assert_eq!(handle.state(), SwapState::SwapAcknowledged);
        messenger.take();

        // A BTC contract that pays somebody else.
        let elsewhere = assert_ok!(ledgers.btc.generate_receiving_address().await);
        let refund_to = assert_ok!(ledgers.btc.generate_receiving_address().await);
        let forged = assert_ok!(
            ledgers
                .btc
                .create_contract(ContractParams {
                    recipient: elsewhere,
                    refund_to,
                    amount: 1,
                    hash_lock: [7u8; 32],
                    time_lock: crate::fixtures::NOW + 86_400,
                })
                .await
        );
        let err = assert_err!(
            engine
                .handle_message(
                    addr(2),
                    SwapMessage::ContractCreated {
                        order: remote,
                        contract: forged,
                    },
                )
                .await
        );

        assert_eq!(err.kind(), ErrorKind::InvalidEvidence);
        assert_eq!(handle.state(), SwapState::SwapAcknowledged);
        assert_eq!(ledgers.lux.contract_count(), 0);
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_mid_handshake_drops_only_that_peer() {
        let ledgers = Ledgers::new();
        let (engine, messenger, _notices) = ledgers.mock_engine(addr(1));
        let bound = assert_ok!(engine.place_order(order("LUX", "BTC", 100, 1, addr(1))).await);
        let open = assert_ok!(engine.place_order(order("LUX", "ETH", 100, 3, addr(1))).await);
        assert_ok!(
            engine
                .handle_message(
                    addr(2),
                    SwapMessage::CreateOrder(order("BTC", "LUX", 1, 100, addr(2))),
                )
                .await
        );
        assert_eq!(bound.state(), SwapState::MatchFound);
        messenger.take();

        assert_eq!(engine.handle_peer_disconnected(addr(3)), 0);
        assert_eq!(engine.handle_peer_disconnected(addr(2)), 1);

        assert_eq!(states(&engine.snapshot()), vec![SwapState::Open]);
        assert_eq!(engine.snapshot()[0].record, open.record());
        assert_eq!(engine.metrics().cancellations, 1);
    }

    #[tokio::test]
    async fn test_unsupported_ticker_is_dropped_without_state_change() {
        let ledgers = Ledgers::new();
        let (engine, messenger, _notices) = ledgers.mock_engine(addr(1));
        // ETH has no ledger client; the order can still be advertised.
        let handle = assert_ok!(engine.place_order(order("BTC", "ETH", 1, 30, addr(1))).await);
        messenger.take();

        let err = assert_err!(
            engine
                .handle_message(
                    addr(2),
                    SwapMessage::OrderMatch(order("ETH", "BTC", 30, 1, addr(2))),
                )
                .await
        );
        assert_eq!(err.kind(), ErrorKind::MissingCapability);
        assert_eq!(handle.state(), SwapState::Open);
        assert!(messenger.sent().is_empty());
    }
}
