//! Handles shared with code outside the tick loop: the dashboard-facing
//! metrics feed and the stop signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use shop_ledger::Metrics;

/// Pull-based view of the most recent snapshot.
///
/// The scheduler replaces the stored value between ticks; readers get a
/// clone, so a reader never observes a half-written snapshot.
#[derive(Clone, Default, Debug)]
pub struct MetricsFeed(Arc<Mutex<Option<Metrics>>>);

impl MetricsFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn publish(&self, metrics: Metrics) {
        // A poisoned lock only means a reader panicked mid-clone; the stored
        // value is still a whole snapshot.
        let mut slot = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(metrics);
    }

    /// The latest snapshot, or `None` before the first tick completes.
    pub fn latest(&self) -> Option<Metrics> {
        match self.0.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Cooperative stop request, honored at the next tick boundary.
#[derive(Clone, Default, Debug)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
