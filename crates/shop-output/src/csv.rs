//! CSV time-series backend.
//!
//! Creates `time_series.csv` in the configured output directory.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, TickRow};

pub const TIME_SERIES_FILE: &str = "time_series.csv";

const HEADER: [&str; 9] = [
    "tick",
    "elapsed_secs",
    "revenue_cents",
    "transactions",
    "active_customers",
    "mean_satisfaction",
    "total_stock",
    "low_stock_items",
    "alerts",
];

/// Writes one CSV row per tick.
pub struct CsvWriter {
    series:   Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create (truncating) `time_series.csv` in `dir` and write the header.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut series = Writer::from_path(dir.join(TIME_SERIES_FILE))?;
        series.write_record(HEADER)?;
        Ok(Self { series, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_tick(&mut self, row: &TickRow) -> OutputResult<()> {
        self.series.write_record(&[
            row.tick.to_string(),
            row.elapsed_secs.to_string(),
            row.revenue_cents.to_string(),
            row.transactions.to_string(),
            row.active_customers.to_string(),
            format!("{:.3}", row.mean_satisfaction),
            row.total_stock.to_string(),
            row.low_stock_items.to_string(),
            row.alerts.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.series.flush()?;
        Ok(())
    }
}
