#[cfg(test)]
mod settings_tests {
    use std::fs;

    use clap::Parser;

    use shop_core::Tick;
    use shop_sim::{NoopObserver, RunOutcome, StopHandle};

    use crate::{Cli, build_sim, settings};

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("shopsim").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_without_flags() {
        let (config, params) = settings(&parse(&[])).unwrap();
        assert_eq!(config.total_ticks, 480);
        assert_eq!(config.seed, 42);
        assert_eq!(params.low_stock_threshold, 10);
    }

    #[test]
    fn hours_are_converted_with_the_tick_length() {
        let (config, _) = settings(&parse(&["--hours", "2", "--tick-seconds", "30"])).unwrap();
        assert_eq!(config.tick_duration_secs, 30);
        assert_eq!(config.total_ticks, 240);
    }

    #[test]
    fn explicit_ticks_win_over_hours() {
        let (config, _) = settings(&parse(&["--hours", "8", "--ticks", "100"])).unwrap();
        assert_eq!(config.total_ticks, 100);
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(
            &path,
            r#"{ "sim": { "seed": 9, "customers": 40 }, "params": { "restock_quantity": 35 } }"#,
        )
        .unwrap();

        let cli = parse(&["--config", path.to_str().unwrap(), "--customers", "12"]);
        let (config, params) = settings(&cli).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.customers, 12);
        assert_eq!(config.employees, 5);
        assert_eq!(params.restock_quantity, 35);
        assert_eq!(params.restock_delay_ticks, 5);
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(settings(&parse(&["--config", path.to_str().unwrap()])).is_err());
    }

    #[test]
    fn stop_request_ends_the_run_at_a_tick_boundary() {
        let stop = StopHandle::new();
        let mut sim = build_sim(&parse(&["--ticks", "50", "--customers", "5"]), stop.clone()).unwrap();
        sim.run_ticks(3, &mut NoopObserver).unwrap();

        stop.request_stop();
        let outcome = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(outcome, RunOutcome::Stopped);
        assert_eq!(sim.clock.current_tick, Tick(3));
    }

    #[test]
    fn bulk_rules_flag_builds() {
        let sim = build_sim(&parse(&["--bulk-rules", "--ticks", "5"]), StopHandle::new()).unwrap();
        assert_eq!(sim.config.total_ticks, 5);
    }
}
