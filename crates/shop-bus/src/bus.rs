//! `MessageBus`: the per-tick, priority-ordered mailbox.
//!
//! # Ordering
//!
//! Messages are keyed by `(priority, seq)` in a `BTreeMap`, so a drain yields
//! them priority-ascending and FIFO within a priority.  `seq` comes from a
//! single counter that never resets, which makes the order a pure function of
//! publish order, and publish order is a pure function of the seed.
//!
//! # Drain semantics
//!
//! [`drain`][MessageBus::drain] moves the whole queue out in one step.  Anything
//! published while the drained batch is being dispatched lands in the (now
//! empty) queue and waits for the next drain, which bounds each tick's work
//! and rules out same-tick reply cascades.

use std::collections::BTreeMap;

use shop_core::Tick;

use crate::{Envelope, Message, Priority};

/// Running counters, serialized into checkpoints.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusStats {
    pub published: u64,
    pub drained:   u64,
    pub drains:    u64,
}

/// Ordered, priority-aware mailbox.
#[derive(Default, Debug)]
pub struct MessageBus {
    queue:    BTreeMap<(Priority, u64), Message>,
    next_seq: u64,
    stats:    BusStats,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `envelope`, stamped with the next sequence number and `now`.
    /// Returns the assigned sequence number.
    pub fn publish(&mut self, envelope: Envelope, now: Tick) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        let message = Message::stamp(envelope, seq, now);
        self.queue.insert(message.order_key(), message);
        self.stats.published += 1;
        seq
    }

    /// Publish a batch in iteration order.
    pub fn publish_all<I>(&mut self, envelopes: I, now: Tick)
    where
        I: IntoIterator<Item = Envelope>,
    {
        for envelope in envelopes {
            self.publish(envelope, now);
        }
    }

    /// Remove and return every queued message in `(priority, seq)` order.
    pub fn drain(&mut self) -> Vec<Message> {
        let batch: Vec<Message> = std::mem::take(&mut self.queue).into_values().collect();
        self.stats.drained += batch.len() as u64;
        self.stats.drains += 1;
        batch
    }

    /// Messages currently queued.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued messages in drain order, without removing them.
    pub fn pending(&self) -> impl Iterator<Item = &Message> {
        self.queue.values()
    }

    pub fn stats(&self) -> BusStats {
        self.stats
    }
}
