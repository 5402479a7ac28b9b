//! Simulation observer trait for progress reporting and data collection.

use shop_core::Tick;
use shop_ledger::{InvariantViolation, Metrics};

use crate::checkpoint::Checkpoint;
use crate::stats::{RunOutcome, TickSummary};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: revenue printer
///
/// ```rust,ignore
/// struct RevenuePrinter;
///
/// impl SimObserver for RevenuePrinter {
///     fn on_snapshot(&mut self, metrics: &Metrics) {
///         println!("{}: {}", metrics.tick, metrics.total_revenue);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any actor runs.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once the tick's messages have all been dispatched.
    fn on_tick_end(&mut self, _summary: &TickSummary) {}

    /// Called after every tick with the ledger's fresh aggregates.
    fn on_snapshot(&mut self, _metrics: &Metrics) {}

    /// Called every `config.checkpoint_interval_ticks` ticks and once at the
    /// end of the run.
    fn on_checkpoint(&mut self, _checkpoint: &Checkpoint<'_>) {}

    /// Called when the ledger fails its consistency check.  The run returns
    /// an error right after; `checkpoint` is the state that failed.
    fn on_abort(&mut self, _checkpoint: &Checkpoint<'_>, _violation: &InvariantViolation) {}

    /// Called once when the run ends normally, completed or stopped.
    fn on_sim_end(&mut self, _outcome: RunOutcome, _metrics: &Metrics) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
