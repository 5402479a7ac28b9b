//! Integration tests for shop-output.

#[cfg(test)]
mod helpers {
    use shop_core::SimConfig;
    use shop_sim::{Sim, SimBuilder};
    use tempfile::TempDir;

    pub fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    pub fn small_sim(ticks: u64, checkpoint_every: u64) -> Sim {
        let config = SimConfig {
            seed: 7,
            total_ticks: ticks,
            checkpoint_interval_ticks: checkpoint_every,
            customers: 8,
            employees: 3,
            items: 15,
            ..SimConfig::default()
        };
        SimBuilder::new(config).build().expect("valid config")
    }
}

#[cfg(test)]
mod csv_tests {
    use crate::csv::{CsvWriter, TIME_SERIES_FILE};
    use crate::row::TickRow;
    use crate::writer::OutputWriter;

    use super::helpers::tmp;

    fn row(tick: u64) -> TickRow {
        TickRow {
            tick,
            elapsed_secs:      (tick + 1) * 60,
            revenue_cents:     12_345,
            transactions:      3,
            active_customers:  9,
            mean_satisfaction: 5.5,
            total_stock:       400,
            low_stock_items:   2,
            alerts:            1,
        }
    }

    #[test]
    fn csv_file_created_with_header() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(TIME_SERIES_FILE)).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers[0], "tick");
        assert_eq!(headers[2], "revenue_cents");
        assert_eq!(headers.len(), 9);
    }

    #[test]
    fn csv_tick_rows_are_appended_in_order() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick(&row(0)).unwrap();
        w.write_tick(&row(1)).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(TIME_SERIES_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "1");       // tick
        assert_eq!(&rows[1][1], "120");     // elapsed_secs
        assert_eq!(&rows[1][2], "12345");   // revenue_cents
        assert_eq!(&rows[1][5], "5.500");   // mean_satisfaction
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

#[cfg(test)]
mod checkpoint_tests {
    use std::fs;

    use crate::json::{CHECKPOINT_DIR, CheckpointWriter};

    use super::helpers::*;

    #[test]
    fn checkpoint_names_are_zero_padded() {
        let dir = tmp();
        let w = CheckpointWriter::new(dir.path()).unwrap();
        assert!(dir.path().join(CHECKPOINT_DIR).is_dir());
        assert_eq!(
            w.path_for(60),
            dir.path().join(CHECKPOINT_DIR).join("checkpoint_000060.json")
        );
    }

    #[test]
    fn checkpoint_file_holds_the_full_state() {
        let dir = tmp();
        let w = CheckpointWriter::new(dir.path()).unwrap();
        let mut sim = small_sim(10, 0);
        sim.run_ticks(4, &mut shop_sim::NoopObserver).unwrap();

        let path = w.write(&sim.checkpoint()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["tick"], 4);
        assert_eq!(json["config"]["seed"], 7);
        assert_eq!(json["items"].as_array().unwrap().len(), 15);
        assert_eq!(json["employees"].as_array().unwrap().len(), 3);
        assert_eq!(json["ledger"]["stock"].as_array().unwrap().len(), 15);
        assert!(json["ledger"]["recent"].is_array());
        assert!(json["backlog"].is_array());
    }
}

#[cfg(test)]
mod observer_tests {
    use std::fs;

    use crate::csv::{CsvWriter, TIME_SERIES_FILE};
    use crate::json::{CHECKPOINT_DIR, CheckpointWriter};
    use crate::observer::SimOutputObserver;
    use crate::report::{REPORT_FILE, RunReport};

    use super::helpers::*;

    #[test]
    fn full_run_writes_every_file() {
        let dir = tmp();
        let mut sim = small_sim(12, 5);
        let writer = CsvWriter::new(dir.path()).unwrap();
        let checkpoints = CheckpointWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer, Some(checkpoints), sim.config.tick_duration_secs);

        let outcome = sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none());
        assert_eq!(obs.checkpoint_failures(), 0);

        // One row per tick.
        let mut rdr = csv::Reader::from_path(dir.path().join(TIME_SERIES_FILE)).unwrap();
        assert_eq!(rdr.records().count(), 12);

        // Ticks 5 and 10, then the final state at 12.
        let cp = dir.path().join(CHECKPOINT_DIR);
        for name in ["checkpoint_000005.json", "checkpoint_000010.json", "checkpoint_000012.json"] {
            assert!(cp.join(name).exists(), "{name} missing");
        }
        assert_eq!(obs.checkpoint_paths().len(), 3);

        let report = RunReport::from_sim(&sim, outcome);
        report.write(dir.path()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(REPORT_FILE)).unwrap()).unwrap();
        assert_eq!(json["ticks_run"], 12);
        assert_eq!(json["outcome"], "Completed");
        assert_eq!(json["staff"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn checkpoint_storage_failure_does_not_stop_the_run() {
        let dir = tmp();
        let mut sim = small_sim(6, 2);
        let writer = CsvWriter::new(dir.path()).unwrap();
        let checkpoints = CheckpointWriter::new(dir.path()).unwrap();
        fs::remove_dir_all(dir.path().join(CHECKPOINT_DIR)).unwrap();
        let mut obs = SimOutputObserver::new(writer, Some(checkpoints), 60);

        sim.run(&mut obs).unwrap();
        assert_eq!(obs.checkpoint_failures(), 3);
        assert!(obs.checkpoint_paths().is_empty());
        assert!(obs.take_error().is_none());
        assert_eq!(sim.clock.current_tick.0, 6);
    }

    #[test]
    fn report_matches_the_ledger() {
        let mut sim = small_sim(60, 0);
        let outcome = sim.run(&mut shop_sim::NoopObserver).unwrap();
        let report = RunReport::from_sim(&sim, outcome);

        assert_eq!(report.revenue, sim.ledger().revenue());
        assert_eq!(report.transactions, sim.ledger().transactions().len() as u64);
        assert_eq!(report.simulated_time, "1h00m");
        let staff_revenue: shop_core::Money = report.staff.iter().map(|s| s.revenue).sum();
        assert_eq!(staff_revenue, report.revenue);
        assert!(report.top_items.windows(2).all(|w| w[0].units_sold >= w[1].units_sold));
        assert!(!report.to_string().is_empty());
    }
}
