//! `Backlog`: work requests waiting for an employee.
//!
//! Requests addressed to [`Topic::AnyEmployee`][crate::Topic] or a role topic
//! are parked here by the scheduler instead of being delivered.  Each tick,
//! idle employees claim from it in ascending id order.
//!
//! An employee ranks every queued request with its own preference function
//! (`None` = cannot or will not take it).  The request with the lowest
//! `(rank, priority, seq)` wins, so a clerk's preference for restocks beats
//! bus priority, while ties fall back to the bus's own ordering.

use std::collections::BTreeMap;

use crate::{Message, Priority};

#[derive(Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Backlog {
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_values"))]
    queue: BTreeMap<(Priority, u64), Message>,
}

impl Backlog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.queue.insert(message.order_key(), message);
    }

    /// Remove and return the best request according to `rank`.
    ///
    /// `rank` is called once per queued request, in `(priority, seq)` order.
    pub fn claim<F>(&mut self, mut rank: F) -> Option<Message>
    where
        F: FnMut(&Message) -> Option<u8>,
    {
        let mut best: Option<(u8, (Priority, u64))> = None;
        for (key, message) in &self.queue {
            let Some(r) = rank(message) else { continue };
            // Iteration is already key-ascending, so a strictly lower rank is
            // the only thing that can displace the current best.
            if best.is_none_or(|(b, _)| r < b) {
                best = Some((r, *key));
            }
        }
        let (_, key) = best?;
        self.queue.remove(&key)
    }

    /// Drop every request for which `keep` returns `false`.  Returns the
    /// number dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Message) -> bool,
    {
        let before = self.queue.len();
        self.queue.retain(|_, m| keep(m));
        before - self.queue.len()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Requests in `(priority, seq)` order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.queue.values()
    }
}

#[cfg(feature = "serde")]
fn serialize_values<S>(
    queue: &BTreeMap<(Priority, u64), Message>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(queue.values())
}
