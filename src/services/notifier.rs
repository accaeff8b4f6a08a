//! Fan-out of feed-change events to every registered connection.

use tracing::{debug, info, warn};

use crate::models::event::{FeedEvent, ServerMessage};
use crate::services::registry::ConnectionRegistry;

/// Best-effort broadcaster. Delivery to one connection never affects another,
/// and failures never reach the caller.
#[derive(Clone)]
pub struct Notifier {
    registry: ConnectionRegistry,
}

impl Notifier {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Queue `event` on every registered connection and return how many
    /// accepted it. Passes are serialized by the registry lock, so each
    /// connection sees events in the order `broadcast` was called.
    pub fn broadcast(&self, event: FeedEvent) -> usize {
        let action = event.action;
        let item_id = event.item.id;
        let frame = match serde_json::to_string(&ServerMessage::from(event)) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "failed to encode feed event");
                return 0;
            }
        };

        let mut delivered = 0;
        self.registry.for_each(|conn| {
            if conn.send(frame.clone()) {
                delivered += 1;
            } else {
                debug!(connection_id = %conn.id(), "connection closing; event dropped");
            }
        });
        info!(?action, item_id = %item_id, delivered, "feed event broadcast");
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::FeedAction;
    use crate::services::registry::Connection;
    use tokio::sync::mpsc::UnboundedReceiver;
    use uuid::Uuid;

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<Uuid> {
        let mut ids = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            match serde_json::from_str::<ServerMessage>(&frame).unwrap() {
                ServerMessage::FeedEvent { item, .. } => ids.push(item.id),
                other => panic!("unexpected frame {other:?}"),
            }
        }
        ids
    }

    fn event() -> FeedEvent {
        FeedEvent::new(FeedAction::Created, Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn every_connection_gets_every_event_in_order() {
        let registry = ConnectionRegistry::new();
        let notifier = Notifier::new(registry.clone());
        let mut conns: Vec<_> = (0..3)
            .map(|_| {
                let (conn, rx) = Connection::new(None);
                (registry.register(conn), rx)
            })
            .collect();

        let events: Vec<FeedEvent> = (0..10).map(|_| event()).collect();
        let expected: Vec<Uuid> = events.iter().map(|e| e.item.id).collect();
        for e in events {
            assert_eq!(notifier.broadcast(e), 3);
        }
        for (_, rx) in conns.iter_mut() {
            assert_eq!(drain(rx), expected);
        }
    }

    #[test]
    fn disconnect_mid_stream_only_truncates_that_connection() {
        let registry = ConnectionRegistry::new();
        let notifier = Notifier::new(registry.clone());
        let (a, mut rx_a) = Connection::new(None);
        let (b, mut rx_b) = Connection::new(None);
        let (c, rx_c) = Connection::new(None);
        let _ha = registry.register(a);
        let hb = registry.register(b);
        let _hc = registry.register(c);

        let events: Vec<FeedEvent> = (0..6).map(|_| event()).collect();
        let ids: Vec<Uuid> = events.iter().map(|e| e.item.id).collect();
        let mut events = events.into_iter();

        for e in events.by_ref().take(3) {
            notifier.broadcast(e);
        }
        // b unregisters, c's writer dies without unregistering
        hb.unregister();
        drop(rx_c);
        for e in events {
            assert_eq!(notifier.broadcast(e), 1);
        }

        assert_eq!(drain(&mut rx_a), ids);
        assert_eq!(drain(&mut rx_b), ids[..3].to_vec());
    }

    #[test]
    fn broadcast_with_no_connections_is_a_no_op() {
        let notifier = Notifier::new(ConnectionRegistry::new());
        assert_eq!(notifier.broadcast(event()), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_broadcasts_keep_one_order_for_all_connections() {
        let registry = ConnectionRegistry::new();
        let notifier = Notifier::new(registry.clone());
        let (a, mut rx_a) = Connection::new(None);
        let (b, mut rx_b) = Connection::new(None);
        let _ha = registry.register(a);
        let _hb = registry.register(b);

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let notifier = notifier.clone();
                tokio::spawn(async move {
                    for _ in 0..50 {
                        notifier.broadcast(event());
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();
        for t in tasks {
            t.await.unwrap();
        }

        let seen_a = drain(&mut rx_a);
        let seen_b = drain(&mut rx_b);
        assert_eq!(seen_a.len(), 200);
        assert_eq!(seen_a, seen_b);
    }
}
