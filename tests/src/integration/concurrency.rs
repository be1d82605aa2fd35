//! # Concurrent Deliveries
//!
//! Many peers answer the same order at once. Exactly one of them may bind
//! it; the rest are relayed or dropped without touching the winner.

#[cfg(test)]
mod tests {
    use crate::fixtures::{addr, order, Ledgers};
    use sg_swap_negotiation::{SentMessage, SwapMessage, SwapProtocolApi, SwapState};
    use std::sync::Arc;
    use tokio_test::assert_ok;

    const CONTENDERS: u8 = 16;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_create_orders_bind_once() {
        let ledgers = Ledgers::new();
        let (engine, messenger, _notices) = ledgers.mock_engine(addr(1));
        let engine = Arc::new(engine);
        let handle = assert_ok!(engine.place_order(order("LUX", "BTC", 100, 1, addr(1))).await);
        messenger.take();

        let tasks: Vec<_> = (0..CONTENDERS)
            .map(|i| {
                let engine = Arc::clone(&engine);
                let peer = addr(10 + i);
                tokio::spawn(async move {
                    engine
                        .handle_message(
                            peer,
                            SwapMessage::CreateOrder(order("BTC", "LUX", 1, 100, peer)),
                        )
                        .await
                })
            })
            .collect();
        for task in tasks {
            assert_ok!(assert_ok!(task.await));
        }

        let sent = messenger.take();
        let matches: Vec<_> = sent
            .iter()
            .filter_map(|m| match m {
                SentMessage::Direct(peer, SwapMessage::OrderMatch(_)) => Some(*peer),
                _ => None,
            })
            .collect();
        let relays = sent
            .iter()
            .filter(|m| matches!(m, SentMessage::Broadcast(SwapMessage::CreateOrder(_), _)))
            .count();

        assert_eq!(matches.len(), 1);
        assert_eq!(relays, usize::from(CONTENDERS) - 1);
        assert_eq!(handle.state(), SwapState::MatchFound);
        assert_eq!(handle.counterparty(), Some(matches[0]));
        assert_eq!(engine.metrics().matches_found, 1);
        assert_eq!(engine.book().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_order_matches_request_one_address() {
        let ledgers = Ledgers::new();
        let (engine, messenger, _notices) = ledgers.mock_engine(addr(1));
        let engine = Arc::new(engine);
        let handle = assert_ok!(engine.place_order(order("LUX", "BTC", 100, 1, addr(1))).await);
        messenger.take();

        let tasks: Vec<_> = (0..CONTENDERS)
            .map(|i| {
                let engine = Arc::clone(&engine);
                let peer = addr(10 + i);
                tokio::spawn(async move {
                    engine
                        .handle_message(
                            peer,
                            SwapMessage::OrderMatch(order("BTC", "LUX", 1, 100, peer)),
                        )
                        .await
                        .is_ok()
                })
            })
            .collect();
        let mut accepted = 0;
        for task in tasks {
            if assert_ok!(task.await) {
                accepted += 1;
            }
        }

        let sent = messenger.take();
        assert_eq!(accepted, 1);
        assert_eq!(sent.len(), 1);
        let winner = match &sent[0] {
            SentMessage::Direct(peer, SwapMessage::RequestSwapAddress { .. }) => *peer,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(handle.state(), SwapState::SwapRequested);
        assert_eq!(handle.counterparty(), Some(winner));
        assert_eq!(engine.metrics().messages_dropped, u64::from(CONTENDERS) - 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancel_races_with_match() {
        let ledgers = Ledgers::new();
        let (engine, messenger, _notices) = ledgers.mock_engine(addr(1));
        let engine = Arc::new(engine);
        let handle = assert_ok!(engine.place_order(order("LUX", "BTC", 100, 1, addr(1))).await);

        let matcher = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .handle_message(
                        addr(2),
                        SwapMessage::CreateOrder(order("BTC", "LUX", 1, 100, addr(2))),
                    )
                    .await
            })
        };
        let cancelled = engine.cancel_order(&handle).is_ok();
        assert_ok!(assert_ok!(matcher.await));

        // Cancellation is allowed before any contract exists, so the order
        // is gone whichever side won.
        assert!(cancelled);
        assert!(engine.book().is_empty());
        let _ = messenger.take();
    }
}
