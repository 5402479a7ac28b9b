//! Fluent builder for constructing a [`Sim`].

use shop_actor::{Customer, CustomerProfile, Employee, InventoryItem};
use shop_bus::{Backlog, MessageBus};
use shop_core::{
    Category, CustomerId, EmployeeId, EmployeeRole, ItemId, Money, SimConfig, SimRng, StoreParams,
};
use shop_ledger::{CatalogItem, Ledger, RuleEvaluator};
use tracing::debug;

use crate::feed::{MetricsFeed, StopHandle};
use crate::stats::{DispatchStats, VisitStats};
use crate::{Sim, SimResult};

/// Generated catalog prices, in cents.
const PRICE_RANGE_CENTS: std::ops::RangeInclusive<i64> = 999..=7_999;
/// Generated opening stock.
const STOCK_RANGE: std::ops::RangeInclusive<u32> = 5..=50;
/// Opening performance rating of generated staff.
const RATING_RANGE: std::ops::RangeInclusive<f64> = 5.0..=9.0;

/// Fluent builder for [`Sim`].
///
/// Only a [`SimConfig`] is required.  Everything else is generated from
/// `config.seed` unless supplied explicitly.
///
/// # Optional inputs
///
/// | Method           | Default                                                 |
/// |------------------|---------------------------------------------------------|
/// | `.params(p)`     | `StoreParams::default()`                                |
/// | `.catalog(v)`    | `config.items` random titles                            |
/// | `.customers(v)`  | `config.customers` random profiles                      |
/// | `.roles(v)`      | `config.employees` staff, roles round-robin             |
/// | `.rules(r)`      | no rule collaborator                                    |
/// | `.stop_handle(h)`| a fresh handle, see [`Sim::stop_handle`]                |
///
/// Explicit vectors replace the matching population size in the config.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(SimConfig::from_hours(8, 60))
///     .rules(Box::new(BulkDiscountRules::default()))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:    SimConfig,
    params:    StoreParams,
    catalog:   Option<Vec<CatalogItem>>,
    customers: Option<Vec<CustomerProfile>>,
    roles:     Option<Vec<EmployeeRole>>,
    rules:     Option<Box<dyn RuleEvaluator>>,
    stop:      Option<StopHandle>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            params:    StoreParams::default(),
            catalog:   None,
            customers: None,
            roles:     None,
            rules:     None,
            stop:      None,
        }
    }

    pub fn params(mut self, params: StoreParams) -> Self {
        self.params = params;
        self
    }

    /// Supply the catalog instead of generating it.  Item ids follow the
    /// vector order.
    pub fn catalog(mut self, catalog: Vec<CatalogItem>) -> Self {
        self.config.items = catalog.len();
        self.catalog = Some(catalog);
        self
    }

    /// Supply the opening customers' profiles.  Patience and visit count are
    /// still drawn from each customer's own RNG.
    pub fn customers(mut self, profiles: Vec<CustomerProfile>) -> Self {
        self.config.customers = profiles.len();
        self.customers = Some(profiles);
        self
    }

    /// Supply one role per employee.
    pub fn roles(mut self, roles: Vec<EmployeeRole>) -> Self {
        self.config.employees = roles.len();
        self.roles = Some(roles);
        self
    }

    /// Attach the business-rule collaborator consulted for bulk purchases.
    pub fn rules(mut self, rules: Box<dyn RuleEvaluator>) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Share a stop handle created before the sim exists.
    pub fn stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Validate inputs, build the ledger and every actor, and return a
    /// ready-to-run [`Sim`].
    ///
    /// Fails before any tick runs if the config or params are invalid.
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;
        self.params.validate()?;

        let seed = self.config.seed;
        let mut rng = SimRng::new(seed);
        let mut catalog_rng = rng.child(1);
        let mut staff_rng = rng.child(2);

        // ── Catalog and ledger ────────────────────────────────────────────
        let catalog = match self.catalog {
            Some(c) => c,
            None => (0..self.config.items)
                .map(|_| CatalogItem {
                    category:   *catalog_rng.choose(&Category::ALL).unwrap_or(&Category::Fiction),
                    base_price: Money(catalog_rng.gen_range(PRICE_RANGE_CENTS)),
                    stock:      catalog_rng.gen_range(STOCK_RANGE),
                })
                .collect(),
        };

        let mut ledger = Ledger::new(&catalog, &self.params)?;
        ledger.set_rules(self.rules);

        let items: Vec<InventoryItem> = catalog
            .iter()
            .zip((0u32..).map(ItemId))
            .map(|(c, id)| InventoryItem::new(id, c.category, c.base_price, c.stock, &self.params))
            .collect();

        // ── Staff ─────────────────────────────────────────────────────────
        let roles = self.roles.unwrap_or_else(|| {
            (0..self.config.employees)
                .map(|i| EmployeeRole::ROTATION[i % EmployeeRole::ROTATION.len()])
                .collect()
        });
        let employees: Vec<Employee> = roles
            .into_iter()
            .zip((0u32..).map(EmployeeId))
            .map(|(role, id)| Employee::new(id, role, staff_rng.gen_range(RATING_RANGE)))
            .collect();

        // ── Opening customers ─────────────────────────────────────────────
        let customers: Vec<Customer> = match self.customers {
            Some(profiles) => profiles
                .into_iter()
                .zip((0u32..).map(CustomerId))
                .map(|(profile, id)| Customer::new(id, profile, seed, &self.params))
                .collect(),
            None => (0u32..)
                .take(self.config.customers)
                .map(|i| Customer::generate(CustomerId(i), seed, &self.params))
                .collect(),
        };
        // Population sizes were checked against the id space by `validate`.
        let next_customer = customers.len() as u32;

        debug!(
            customers = customers.len(),
            employees = employees.len(),
            items = items.len(),
            seed,
            "sim built",
        );

        Ok(Sim {
            clock:           self.config.make_clock(),
            config:          self.config,
            params:          self.params,
            ledger,
            bus:             MessageBus::new(),
            backlog:         Backlog::new(),
            customers,
            employees,
            items,
            next_customer,
            dispatch:        DispatchStats::default(),
            visits:          VisitStats::default(),
            feed:            MetricsFeed::new(),
            stop:            self.stop.unwrap_or_default(),
            last_checkpoint: None,
        })
    }
}
