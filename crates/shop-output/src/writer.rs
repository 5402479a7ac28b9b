//! The `OutputWriter` trait implemented by time-series backends.

use crate::{OutputResult, TickRow};

/// Trait implemented by time-series writers.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Append one tick's aggregates.
    fn write_tick(&mut self, row: &TickRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
