//! Scheduler-side counters that do not belong to the ledger.

use serde::Serialize;
use shop_actor::VisitTally;
use shop_bus::VisitOutcome;
use shop_core::Tick;

/// Message routing counters.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug, Serialize)]
pub struct DispatchStats {
    /// Messages handed to an actor or the ledger.
    pub delivered:         u64,
    /// Messages addressed to an actor that does not exist (any more).
    pub delivery_failures: u64,
    /// Work requests dropped because the customer stopped waiting for them.
    pub stale_requests:    u64,
    /// Backlog requests taken by an employee.
    pub claims:            u64,
    pub arrivals:          u64,
    pub departures:        u64,
}

/// Visit reports received on the metrics topic.
#[derive(Copy, Clone, Default, PartialEq, Debug, Serialize)]
pub struct VisitStats {
    pub tally:            VisitTally,
    pub satisfaction_sum: f64,
}

impl VisitStats {
    pub fn record(&mut self, outcome: VisitOutcome, score: f64) {
        self.tally.record(outcome);
        self.satisfaction_sum += score;
    }

    /// Mean satisfaction reported at the end of a visit.
    pub fn mean_satisfaction(&self) -> f64 {
        match self.tally.total() {
            0 => 0.0,
            n => self.satisfaction_sum / n as f64,
        }
    }
}

/// What happened during one tick.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct TickSummary {
    pub tick:       Tick,
    /// Messages published by actors during activation.
    pub published:  usize,
    /// Messages taken off the bus in this tick's drain.
    pub drained:    usize,
    pub claims:     usize,
    pub arrivals:   usize,
    pub departures: usize,
}

/// How a run ended.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub enum RunOutcome {
    /// The tick budget was exhausted.
    Completed,
    /// A stop was requested; the run ended at a tick boundary.
    Stopped,
}
