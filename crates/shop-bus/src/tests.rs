//! Unit tests for the message bus and the employee backlog.

#[cfg(test)]
mod helpers {
    use shop_core::{ActorId, CustomerId, ItemId, PurchaseIntent, Money, Tick};

    use crate::{Address, Envelope, Payload};

    pub fn purchase(customer: u32, epoch: u32) -> Envelope {
        let intent = PurchaseIntent {
            customer:     CustomerId(customer),
            lines:        vec![],
            budget:       Money(10_000),
            discount_bps: 0,
            requested_at: Tick::ZERO,
        };
        Envelope::new(CustomerId(customer), Address::ANY_EMPLOYEE, Payload::PurchaseRequest {
            intent,
            epoch,
        })
    }

    pub fn assist(customer: u32, epoch: u32) -> Envelope {
        Envelope::new(CustomerId(customer), Address::ANY_EMPLOYEE, Payload::AssistRequest {
            customer: CustomerId(customer),
            epoch,
            categories: vec![],
        })
    }

    pub fn restock(item: u32) -> Envelope {
        Envelope::new(ItemId(item), Address::ANY_EMPLOYEE, Payload::RestockRequest {
            item:     ItemId(item),
            quantity: 20,
        })
    }

    pub fn price(item: u32) -> Envelope {
        Envelope::new(ItemId(item), ActorId::Ledger, Payload::PriceChange {
            item:  ItemId(item),
            price: Money(999),
        })
    }
}

#[cfg(test)]
mod bus_tests {
    use shop_core::Tick;

    use super::helpers::*;
    use crate::{MessageBus, MessageKind, Priority};

    #[test]
    fn drain_orders_by_priority_then_fifo() {
        let mut bus = MessageBus::new();
        bus.publish(price(1), Tick(0));     // LOW
        bus.publish(purchase(1, 0), Tick(0)); // NORMAL
        bus.publish(assist(2, 0), Tick(0));   // HIGH
        bus.publish(purchase(3, 0), Tick(0)); // NORMAL, later

        let kinds: Vec<_> = bus.drain().iter().map(|m| (m.kind(), m.seq())).collect();
        assert_eq!(kinds, vec![
            (MessageKind::AssistRequest, 2),
            (MessageKind::PurchaseRequest, 1),
            (MessageKind::PurchaseRequest, 3),
            (MessageKind::PriceChange, 0),
        ]);
    }

    #[test]
    fn drain_empties_queue_and_later_publishes_wait() {
        let mut bus = MessageBus::new();
        bus.publish(purchase(1, 0), Tick(0));
        let first = bus.drain();
        assert_eq!(first.len(), 1);
        assert!(bus.is_empty());

        // Published "during dispatch" of the first batch.
        bus.publish(purchase(2, 0), Tick(0));
        assert_eq!(bus.len(), 1);
        let second = bus.drain();
        assert_eq!(second[0].seq(), 1);
        assert_eq!(bus.stats().drained, 2);
        assert_eq!(bus.stats().drains, 2);
    }

    #[test]
    fn seq_never_resets_across_drains() {
        let mut bus = MessageBus::new();
        let a = bus.publish(purchase(1, 0), Tick(0));
        bus.drain();
        let b = bus.publish(purchase(1, 1), Tick(1));
        assert!(b > a);
    }

    #[test]
    fn explicit_priority_overrides_default() {
        let mut bus = MessageBus::new();
        bus.publish(purchase(1, 0), Tick(0));
        bus.publish(restock(4).with_priority(Priority::URGENT), Tick(0));
        let first = &bus.drain()[0];
        assert_eq!(first.kind(), MessageKind::RestockRequest);
        assert_eq!(first.priority(), Priority::URGENT);
    }

    #[test]
    fn message_records_creation_tick() {
        let mut bus = MessageBus::new();
        bus.publish(assist(1, 0), Tick(17));
        assert_eq!(bus.drain()[0].created(), Tick(17));
    }
}

#[cfg(test)]
mod backlog_tests {
    use shop_core::Tick;

    use super::helpers::*;
    use crate::{Backlog, MessageBus, MessageKind, Payload};

    fn backlog_of(envelopes: Vec<crate::Envelope>) -> Backlog {
        let mut bus = MessageBus::new();
        bus.publish_all(envelopes, Tick(0));
        let mut backlog = Backlog::new();
        for m in bus.drain() {
            backlog.push(m);
        }
        backlog
    }

    #[test]
    fn uniform_rank_claims_in_bus_order() {
        let mut backlog = backlog_of(vec![purchase(1, 0), assist(2, 0), restock(3)]);
        let first = backlog.claim(|_| Some(0)).unwrap();
        assert_eq!(first.kind(), MessageKind::AssistRequest);
        let second = backlog.claim(|_| Some(0)).unwrap();
        assert_eq!(second.kind(), MessageKind::RestockRequest);
        assert_eq!(backlog.len(), 1);
    }

    #[test]
    fn rank_preference_beats_priority() {
        let mut backlog = backlog_of(vec![assist(1, 0), purchase(2, 0)]);
        let got = backlog
            .claim(|m| match m.payload() {
                Payload::PurchaseRequest { .. } => Some(0),
                _ => Some(1),
            })
            .unwrap();
        assert_eq!(got.kind(), MessageKind::PurchaseRequest);
    }

    #[test]
    fn unrankable_requests_are_left_alone() {
        let mut backlog = backlog_of(vec![restock(1)]);
        assert!(backlog.claim(|_| None).is_none());
        assert_eq!(backlog.len(), 1);
    }

    #[test]
    fn retain_drops_and_counts() {
        let mut backlog = backlog_of(vec![purchase(1, 0), purchase(2, 0), restock(3)]);
        let dropped = backlog.retain(|m| {
            m.payload().requesting_customer().is_none_or(|(c, _)| c.0 != 1)
        });
        assert_eq!(dropped, 1);
        assert_eq!(backlog.len(), 2);
    }
}
