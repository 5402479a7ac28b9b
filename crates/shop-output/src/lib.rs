//! `shop-output` — simulation output writers for the shopsim retail simulation.
//!
//! | File                                  | Written by               | When                    |
//! |---------------------------------------|--------------------------|-------------------------|
//! | `time_series.csv`                     | [`CsvWriter`]            | every tick              |
//! | `checkpoints/checkpoint_NNNNNN.json`  | [`CheckpointWriter`]     | every N ticks + at end  |
//! | `checkpoints/abort_NNNNNN.json`       | [`CheckpointWriter`]     | on invariant violation  |
//! | `report.json`                         | [`RunReport::write`]     | once, after the run     |
//!
//! [`SimOutputObserver`] implements `shop_sim::SimObserver` and drives the
//! first three.
//!
//! # Usage
//!
//! ```rust,ignore
//! use shop_output::{CheckpointWriter, CsvWriter, RunReport, SimOutputObserver};
//!
//! let writer = CsvWriter::new(dir)?;
//! let mut obs = SimOutputObserver::new(writer, Some(CheckpointWriter::new(dir)?), 60);
//! let outcome = sim.run(&mut obs)?;
//! RunReport::from_sim(&sim, outcome).write(dir)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod json;
pub mod observer;
pub mod report;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use crate::csv::{CsvWriter, TIME_SERIES_FILE};
pub use error::{OutputError, OutputResult};
pub use json::{CHECKPOINT_DIR, CheckpointWriter, write_json};
pub use observer::SimOutputObserver;
pub use report::{REPORT_FILE, RunReport, StaffReport};
pub use row::TickRow;
pub use writer::OutputWriter;
