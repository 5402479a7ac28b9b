//! `SimOutputObserver<W>` bridges `SimObserver` to the output files.

use std::path::PathBuf;

use shop_ledger::{InvariantViolation, Metrics};
use shop_sim::{Checkpoint, RunOutcome, SimObserver};
use tracing::{error, info, warn};

use crate::json::CheckpointWriter;
use crate::row::TickRow;
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that appends every snapshot to an [`OutputWriter`] and
/// dumps checkpoints as JSON.
///
/// Time-series errors are stored internally because `SimObserver` methods
/// have no return value; check them with [`take_error`][Self::take_error]
/// after `sim.run()` returns.  Checkpoint storage is best-effort: a failed
/// write is logged and counted, and the run continues.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:              W,
    checkpoints:         Option<CheckpointWriter>,
    tick_duration_secs:  u32,
    written:             Vec<PathBuf>,
    checkpoint_failures: u32,
    last_error:          Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// `checkpoints` may be `None` to skip checkpoint files entirely.
    pub fn new(writer: W, checkpoints: Option<CheckpointWriter>, tick_duration_secs: u32) -> Self {
        Self {
            writer,
            checkpoints,
            tick_duration_secs,
            written:             Vec::new(),
            checkpoint_failures: 0,
            last_error:          None,
        }
    }

    /// Take the stored time-series error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Checkpoint files written so far, in order.
    pub fn checkpoint_paths(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn checkpoint_failures(&self) -> u32 {
        self.checkpoint_failures
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_snapshot(&mut self, metrics: &Metrics) {
        let row = TickRow::from_metrics(metrics, self.tick_duration_secs);
        let result = self.writer.write_tick(&row);
        self.store_err(result);
    }

    fn on_checkpoint(&mut self, checkpoint: &Checkpoint<'_>) {
        let Some(writer) = &self.checkpoints else {
            return;
        };
        match writer.write(checkpoint) {
            Ok(path) => {
                info!(path = %path.display(), "checkpoint written");
                self.written.push(path);
            }
            Err(e) => {
                warn!(tick = %checkpoint.tick, error = %e, "checkpoint write failed, continuing");
                self.checkpoint_failures += 1;
            }
        }
    }

    fn on_abort(&mut self, checkpoint: &Checkpoint<'_>, violation: &InvariantViolation) {
        let Some(writer) = &self.checkpoints else {
            error!(%violation, "no checkpoint directory, offending state not saved");
            return;
        };
        match writer.write_abort(checkpoint) {
            Ok(path) => error!(path = %path.display(), %violation, "offending state saved"),
            Err(e) => error!(error = %e, %violation, "could not save offending state"),
        }
        let result = self.writer.finish();
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _outcome: RunOutcome, _metrics: &Metrics) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
