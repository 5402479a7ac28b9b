//! Simulation time model and run configuration.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter.  The mapping to
//! simulated wall time is held in `SimClock`:
//!
//!   elapsed = tick * tick_duration_secs
//!
//! The default tick is 60 s (one simulated minute), so an eight-hour shop day
//! is 480 ticks.  Nothing else in the workspace assumes that resolution; all
//! service times, patience counters and restock delays are expressed in ticks.

use std::fmt;

use crate::{ShopError, ShopResult};

/// Default resolution: one tick is one simulated minute.
pub const DEFAULT_TICK_SECS: u32 = 60;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks the current tick and converts it to elapsed simulated time.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// How many simulated seconds one tick represents.  Default: 60.
    pub tick_duration_secs: u32,
    /// The current tick, advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_duration_secs: u32) -> Self {
        Self {
            tick_duration_secs,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> u64 {
        self.current_tick.0 * self.tick_duration_secs as u64
    }

    /// Break elapsed time into (hours, minutes) since opening.
    pub fn elapsed_hm(&self) -> (u64, u32) {
        let secs = self.elapsed_secs();
        (secs / 3_600, ((secs % 3_600) / 60) as u32)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m) = self.elapsed_hm();
        write!(f, "{} ({h}h {m:02}m)", self.current_tick)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration: timing, seed, and population sizes.
///
/// Business tuning knobs live in [`StoreParams`][crate::StoreParams].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Total ticks to simulate.
    pub total_ticks: u64,

    /// Seconds per tick.  Default: 60.
    pub tick_duration_secs: u32,

    /// Emit a full-state checkpoint every N ticks.  0 disables periodic
    /// checkpoints; the final checkpoint is always emitted.
    pub checkpoint_interval_ticks: u64,

    /// Customers created at tick 0.
    pub customers: usize,

    /// Staff members; roles are assigned round-robin.
    pub employees: usize,

    /// Catalog size.
    pub items: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:                      42,
            total_ticks:               8 * 60,
            tick_duration_secs:        DEFAULT_TICK_SECS,
            checkpoint_interval_ticks: 60,
            customers:                 20,
            employees:                 5,
            items:                     100,
        }
    }
}

impl SimConfig {
    /// Derive the tick budget from a number of simulated hours.
    pub fn from_hours(hours: u64, tick_duration_secs: u32) -> Self {
        let secs = hours * 3_600;
        let total_ticks = if tick_duration_secs == 0 {
            0
        } else {
            secs.div_ceil(tick_duration_secs as u64)
        };
        Self {
            total_ticks,
            tick_duration_secs,
            ..Self::default()
        }
    }

    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_duration_secs)
    }

    /// `true` when a periodic checkpoint is due after `tick` completes.
    #[inline]
    pub fn checkpoint_due(&self, tick: Tick) -> bool {
        self.checkpoint_interval_ticks > 0
            && (tick.0 + 1) % self.checkpoint_interval_ticks == 0
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> ShopResult<()> {
        if self.total_ticks == 0 {
            return Err(ShopError::Config("simulated duration must be positive".into()));
        }
        if self.tick_duration_secs == 0 {
            return Err(ShopError::Config("tick duration must be positive".into()));
        }
        if self.employees == 0 {
            return Err(ShopError::Config("at least one employee is required".into()));
        }
        if self.items == 0 {
            return Err(ShopError::Config("at least one catalog item is required".into()));
        }
        if self.customers == 0 {
            return Err(ShopError::Config("at least one customer is required".into()));
        }
        if u32::try_from(self.customers).is_err()
            || u32::try_from(self.employees).is_err()
            || u32::try_from(self.items).is_err()
        {
            return Err(ShopError::Config("population size exceeds the id space".into()));
        }
        Ok(())
    }
}
