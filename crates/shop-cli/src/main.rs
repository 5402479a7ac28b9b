// Command-line launcher for the retail simulation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use shop_core::{SimConfig, StoreParams};
use shop_ledger::BulkDiscountRules;
use shop_output::{CheckpointWriter, CsvWriter, RunReport, SimOutputObserver};
use shop_sim::{RunOutcome, Sim, SimBuilder, StopHandle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(test)]
mod tests;

#[derive(Parser, Debug)]
#[command(name = "shopsim")]
#[command(about = "Retail store simulation: customers, staff and stock as interacting actors", long_about = None)]
struct Cli {
    /// Customers in the store at opening
    #[arg(long)]
    customers: Option<usize>,

    /// Staff members (roles assigned round-robin)
    #[arg(long)]
    employees: Option<usize>,

    /// Catalog size
    #[arg(long)]
    items: Option<usize>,

    /// Simulated store hours
    #[arg(long)]
    hours: Option<u64>,

    /// Exact tick budget (overrides --hours)
    #[arg(long)]
    ticks: Option<u64>,

    /// Simulated seconds per tick
    #[arg(long)]
    tick_seconds: Option<u32>,

    /// Write a checkpoint every N ticks (0 = only at the end)
    #[arg(long)]
    checkpoint_interval: Option<u64>,

    /// RNG seed; the same seed reproduces the same run
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// JSON file with `sim` and `params` sections; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Refer bulk purchases to the bundled discount rules
    #[arg(long)]
    bulk_rules: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

/// Shape of the `--config` file.  Missing sections and fields take defaults.
#[derive(Deserialize, Default, Debug)]
#[serde(default)]
struct FileConfig {
    sim:    SimConfig,
    params: StoreParams,
}

fn load_config(path: &Path) -> Result<FileConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
}

/// Merge the config file (if any) with command-line overrides.
fn settings(cli: &Cli) -> Result<(SimConfig, StoreParams)> {
    let file = match &cli.config {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };
    let mut config = file.sim;

    if let Some(secs) = cli.tick_seconds {
        config.tick_duration_secs = secs;
    }
    if let Some(hours) = cli.hours {
        config.total_ticks = SimConfig::from_hours(hours, config.tick_duration_secs).total_ticks;
    }
    if let Some(ticks) = cli.ticks {
        config.total_ticks = ticks;
    }
    if let Some(n) = cli.customers {
        config.customers = n;
    }
    if let Some(n) = cli.employees {
        config.employees = n;
    }
    if let Some(n) = cli.items {
        config.items = n;
    }
    if let Some(n) = cli.checkpoint_interval {
        config.checkpoint_interval_ticks = n;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    Ok((config, file.params))
}

/// Build the simulation described by `cli`, ending at the next tick
/// boundary once `stop` is requested.
fn build_sim(cli: &Cli, stop: StopHandle) -> Result<Sim> {
    let (config, params) = settings(cli)?;
    let mut builder = SimBuilder::new(config).params(params).stop_handle(stop);
    if cli.bulk_rules {
        builder = builder.rules(Box::new(BulkDiscountRules::default()));
    }
    builder.build().context("invalid simulation configuration")
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Ctrl-C and SIGTERM end the run at the next tick boundary.
    let stop = StopHandle::new();
    let on_signal = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || on_signal.request_stop()) {
        warn!(error = %e, "stop signal handler unavailable");
    }

    let mut sim = build_sim(&cli, stop)?;
    let tick_secs = sim.config.tick_duration_secs;

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("creating output directory {}", cli.output.display()))?;
    let writer = CsvWriter::new(&cli.output).context("opening time series")?;
    let checkpoints = match CheckpointWriter::new(&cli.output) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(error = %e, "checkpoint directory unavailable, checkpoints disabled");
            None
        }
    };
    let mut observer = SimOutputObserver::new(writer, checkpoints, tick_secs);

    let outcome = sim.run(&mut observer)?;
    if outcome == RunOutcome::Stopped {
        info!(tick = %sim.clock.current_tick, "stopped on signal, final state written");
    }
    if let Some(e) = observer.take_error() {
        return Err(e).context("writing time series");
    }

    let report = RunReport::from_sim(&sim, outcome);
    report.write(&cli.output).context("writing report")?;
    for line in report.to_string().lines() {
        info!("{line}");
    }
    info!(output = %cli.output.display(), "done");
    Ok(())
}
