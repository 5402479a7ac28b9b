//! The `Sim` struct and its tick loop.

use shop_actor::{
    ActorMut, Behavior, CatalogEntry, Customer, Employee, InventoryItem, TickContext,
};
use shop_bus::{Address, Backlog, Envelope, Message, MessageBus, Payload, Topic};
use shop_core::{ActorId, CustomerId, EmployeeId, ItemId, SimClock, SimConfig, StoreParams, Tick};
use shop_ledger::{CommitOutcome, Ledger, Metrics, SnapshotScope};
use tracing::{debug, error, info, warn};

use crate::checkpoint::{Checkpoint, LedgerTables};
use crate::feed::{MetricsFeed, StopHandle};
use crate::stats::{DispatchStats, RunOutcome, TickSummary, VisitStats};
use crate::{SimError, SimObserver, SimResult};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim` owns every actor, the bus, the work backlog and the ledger, and
/// drives the tick loop:
///
/// 1. **Customers** tick against a copy of the ledger's catalog
///    (optionally parallel with the `parallel` feature).
/// 2. **Employees** drop stale work from the backlog, claim at most one
///    request each in ascending id order, then tick.
/// 3. **Items** tick (optionally parallel).
/// 4. **Dispatch**: everything emitted above is published, drained once in
///    `(priority, seq)` order, and routed.  Replies produced while routing
///    wait for the next tick's drain.
/// 5. **Roster**: finished customers leave, new arrivals join.
/// 6. **Verify, snapshot, checkpoint.**
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    /// Run configuration (seed, tick budget, populations, ...).
    pub config: SimConfig,

    /// Business tuning knobs, copied into every tick's context.
    pub params: StoreParams,

    /// Tracks the next tick to run and maps ticks to wall time.
    pub clock: SimClock,

    pub(crate) ledger:          Ledger,
    pub(crate) bus:             MessageBus,
    pub(crate) backlog:         Backlog,
    /// Active customers, sorted by id.
    pub(crate) customers:       Vec<Customer>,
    /// Indexed by `EmployeeId`.
    pub(crate) employees:       Vec<Employee>,
    /// Indexed by `ItemId`.
    pub(crate) items:           Vec<InventoryItem>,
    pub(crate) next_customer:   u32,
    pub(crate) dispatch:        DispatchStats,
    pub(crate) visits:          VisitStats,
    pub(crate) feed:            MetricsFeed,
    pub(crate) stop:            StopHandle,
    pub(crate) last_checkpoint: Option<Tick>,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`, or
    /// until a stop is requested through [`Sim::stop_handle`].
    ///
    /// Either way a final snapshot and checkpoint are emitted before
    /// returning.  An invariant violation aborts the run with
    /// [`SimError::Invariant`] after [`SimObserver::on_abort`] has seen the
    /// offending state.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunOutcome> {
        info!(
            seed = self.config.seed,
            ticks = self.config.total_ticks,
            customers = self.customers.len(),
            employees = self.employees.len(),
            items = self.items.len(),
            "run started",
        );

        let outcome = loop {
            let now = self.clock.current_tick;
            if now >= self.config.end_tick() {
                break RunOutcome::Completed;
            }
            if self.stop.is_stop_requested() {
                info!(tick = %now, "stop requested");
                break RunOutcome::Stopped;
            }
            self.step(now, observer)?;
        };

        self.finish(outcome, observer);
        Ok(outcome)
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`
    /// and the stop handle, emits no final checkpoint).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            let now = self.clock.current_tick;
            self.step(now, observer)?;
        }
        Ok(())
    }

    /// Publish a message from outside the actor population.  It is routed
    /// in the next tick's drain.
    pub fn inject(&mut self, envelope: Envelope) -> u64 {
        self.bus.publish(envelope, self.clock.current_tick)
    }

    /// The ledger's aggregates right now.
    pub fn snapshot(&self) -> Metrics {
        self.snapshot_at(self.clock.current_tick)
    }

    /// Borrow the full state as of the current tick boundary.
    pub fn checkpoint(&self) -> Checkpoint<'_> {
        self.checkpoint_at(self.clock.current_tick)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        find_customer(&self.customers, id).map(|i| &self.customers[i])
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn backlog(&self) -> &Backlog {
        &self.backlog
    }

    /// Messages published but not yet drained.
    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn dispatch_stats(&self) -> DispatchStats {
        self.dispatch
    }

    pub fn visit_stats(&self) -> VisitStats {
        self.visits
    }

    /// A handle a dashboard can poll for the latest snapshot.
    pub fn feed(&self) -> MetricsFeed {
        self.feed.clone()
    }

    /// A handle that ends the run at the next tick boundary.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    // ── Tick boundary ─────────────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> SimResult<()> {
        observer.on_tick_start(now);
        let summary = self.process_tick(now);

        if let Err(violation) = self.ledger.verify() {
            error!(tick = %now, %violation, "ledger invariant violated, aborting run");
            let checkpoint = self.checkpoint_at(now.offset(1));
            observer.on_abort(&checkpoint, &violation);
            return Err(SimError::Invariant { tick: now, source: violation });
        }

        let metrics = self.snapshot_at(now);
        self.feed.publish(metrics.clone());
        observer.on_snapshot(&metrics);
        observer.on_tick_end(&summary);

        self.clock.advance();
        if self.config.checkpoint_due(now) {
            self.emit_checkpoint(observer);
        }
        Ok(())
    }

    fn finish<O: SimObserver>(&mut self, outcome: RunOutcome, observer: &mut O) {
        let metrics = self.snapshot();
        self.feed.publish(metrics.clone());
        self.emit_checkpoint(observer);
        info!(
            ?outcome,
            tick = %self.clock.current_tick,
            revenue = %metrics.total_revenue,
            transactions = metrics.transaction_count,
            delivery_failures = self.dispatch.delivery_failures,
            "run finished",
        );
        observer.on_sim_end(outcome, &metrics);
    }

    /// Hand the current state to the observer unless this tick boundary was
    /// already checkpointed.
    fn emit_checkpoint<O: SimObserver>(&mut self, observer: &mut O) {
        let tick = self.clock.current_tick;
        if self.last_checkpoint == Some(tick) {
            return;
        }
        info!(%tick, "checkpoint");
        observer.on_checkpoint(&self.checkpoint_at(tick));
        self.last_checkpoint = Some(tick);
    }

    fn snapshot_at(&self, tick: Tick) -> Metrics {
        let staff: Vec<EmployeeId> = self.employees.iter().map(Employee::id).collect();
        self.ledger.snapshot(SnapshotScope {
            tick,
            active_customers:  self.customers.len(),
            mean_satisfaction: self.mean_satisfaction(),
            employees:         &staff,
        })
    }

    fn checkpoint_at(&self, tick: Tick) -> Checkpoint<'_> {
        Checkpoint {
            tick,
            config:    &self.config,
            params:    &self.params,
            customers: &self.customers,
            employees: &self.employees,
            items:     &self.items,
            ledger:    LedgerTables {
                revenue:           self.ledger.revenue(),
                transaction_count: self.ledger.transactions().len(),
                stock:             self.ledger.rows(),
                accounts:          self.ledger.accounts(),
                alerts:            self.ledger.alerts(),
                recent:            self.ledger.tail(self.params.transaction_tail),
            },
            backlog:   &self.backlog,
            bus:       self.bus.stats(),
            dispatch:  self.dispatch,
            visits:    self.visits,
        }
    }

    /// Mean satisfaction of the customers still in the store.
    fn mean_satisfaction(&self) -> f64 {
        if self.customers.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.customers.iter().map(Customer::satisfaction).sum();
        sum / self.customers.len() as f64
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, now: Tick) -> TickSummary {
        let mut summary = TickSummary { tick: now, ..TickSummary::default() };

        // The context borrows locals, leaving `self` free for mutation.
        let params = self.params.clone();
        let catalog = self.catalog_view();
        let ctx = TickContext::new(now, &params, &catalog);

        // ── Phase 1: customers ────────────────────────────────────────────
        let mut outgoing = activate(&mut self.customers, &ctx);

        // ── Phase 2: employees claim, then work ───────────────────────────
        //
        // Requests whose customer gave up or left are dropped before anyone
        // can claim them.  Claims resolve in ascending employee id order.
        let stale = prune_backlog(&mut self.backlog, &self.customers);
        self.dispatch.stale_requests += stale as u64;

        for employee in &mut self.employees {
            if !employee.is_busy() {
                if let Some(request) = self.backlog.claim(|m| employee.claim_rank(m)) {
                    if employee.begin(&request, &ctx) {
                        summary.claims += 1;
                    } else {
                        warn!(employee = %employee.id(), kind = ?request.kind(), "claimed request could not be started");
                    }
                }
            }
            outgoing.extend(employee.tick(&ctx));
        }

        // ── Phase 3: items ────────────────────────────────────────────────
        outgoing.extend(activate(&mut self.items, &ctx));

        // ── Phase 4: publish, drain once, dispatch ────────────────────────
        summary.published = outgoing.len();
        self.bus.publish_all(outgoing, now);

        let drained = self.bus.drain();
        summary.drained = drained.len();
        for message in drained {
            self.route(message, &ctx);
        }

        // ── Phase 5: roster ───────────────────────────────────────────────
        let before = self.customers.len();
        self.customers.retain(|c| !c.is_done());
        summary.departures = before - self.customers.len();
        summary.arrivals = self.admit_arrivals(now);

        self.dispatch.claims += summary.claims as u64;
        self.dispatch.departures += summary.departures as u64;
        self.dispatch.arrivals += summary.arrivals as u64;

        debug!(
            tick = %now,
            published = summary.published,
            drained = summary.drained,
            claims = summary.claims,
            backlog = self.backlog.len(),
            active = self.customers.len(),
            "tick complete",
        );
        summary
    }

    /// The ledger's stock table as seen by actors this tick.
    fn catalog_view(&self) -> Vec<CatalogEntry> {
        self.ledger
            .rows()
            .iter()
            .map(|r| CatalogEntry {
                item:     r.item,
                category: r.category,
                price:    r.price,
                stock:    r.stock,
            })
            .collect()
    }

    fn admit_arrivals(&mut self, now: Tick) -> usize {
        let interval = self.params.arrival_interval_ticks;
        if interval == 0 || (now.0 + 1) % interval != 0 {
            return 0;
        }
        let mut admitted = 0;
        for _ in 0..self.params.arrivals_per_interval {
            let id = CustomerId(self.next_customer);
            let Some(next) = self.next_customer.checked_add(1) else {
                warn!(tick = %now, "customer id space exhausted, arrivals stopped");
                break;
            };
            self.next_customer = next;
            self.customers.push(Customer::generate(id, self.config.seed, &self.params));
            admitted += 1;
        }
        debug!(tick = %now, admitted, "customers arrived");
        admitted
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    fn route(&mut self, message: Message, ctx: &TickContext<'_>) {
        let now = ctx.tick;
        match message.target() {
            Address::Actor(ActorId::Ledger) => self.ledger_receive(&message, now),
            Address::Actor(id) => {
                let replies = match self.actor_mut(id) {
                    Some(actor) => actor.receive(&message, ctx),
                    None => return self.delivery_failure(&message),
                };
                self.dispatch.delivered += 1;
                self.bus.publish_all(replies, now);
            }
            Address::Topic(Topic::Metrics) => self.record_visit(&message),
            Address::Topic(_) => self.enqueue_work(message, now),
        }
    }

    fn actor_mut(&mut self, id: ActorId) -> Option<ActorMut<'_>> {
        match id {
            ActorId::Customer(c) => find_customer(&self.customers, c)
                .map(|i| ActorMut::Customer(&mut self.customers[i])),
            ActorId::Employee(e) => self.employees.get_mut(e.index()).map(ActorMut::Employee),
            ActorId::Item(i) => self.items.get_mut(i.index()).map(ActorMut::Item),
            ActorId::Ledger => None,
        }
    }

    /// The single serialization point for every stock and revenue change.
    fn ledger_receive(&mut self, message: &Message, now: Tick) {
        self.dispatch.delivered += 1;
        match message.payload() {
            Payload::CommitPurchase { employee, intent, epoch } => {
                let customer = intent.customer;
                let reply = match self.ledger.try_commit(intent, *employee, now) {
                    CommitOutcome::Committed(tx) => {
                        for line in &tx.lines {
                            self.publish_inventory_update(line.item, now);
                        }
                        let spent = self.ledger.account(customer).map_or(tx.total, |a| a.spent);
                        Payload::PurchaseConfirmed {
                            epoch:       *epoch,
                            transaction: tx.id,
                            total:       tx.total,
                            spent,
                        }
                    }
                    CommitOutcome::Rejected(reason) => {
                        Payload::PurchaseRejected { epoch: *epoch, reason }
                    }
                };
                self.bus.publish(Envelope::new(ActorId::Ledger, customer, reply), now);
            }
            Payload::CommitRestock { employee, item, quantity } => {
                match self.ledger.apply_restock(*item, *quantity) {
                    Ok(()) => self.publish_inventory_update(*item, now),
                    Err(e) => warn!(%employee, error = %e, "restock commit failed"),
                }
            }
            Payload::PriceChange { item, price } => {
                if let Err(e) = self.ledger.set_price(*item, *price) {
                    warn!(error = %e, "price change refused");
                }
            }
            other => warn!(
                sender = %message.sender(),
                kind = ?other.kind(),
                "ledger ignored a message it does not handle",
            ),
        }
    }

    /// Route a role or any-employee message into the shared backlog.
    fn enqueue_work(&mut self, message: Message, now: Tick) {
        let restock = match message.payload() {
            Payload::RestockRequest { item, .. } => Some(*item),
            _ => None,
        };

        if let Some(item) = restock {
            match self.ledger.mark_restock_pending(item) {
                Ok(true) => {
                    self.dispatch.delivered += 1;
                    self.backlog.push(message);
                    self.publish_inventory_update(item, now);
                }
                Ok(false) => debug!(%item, "duplicate restock request suppressed"),
                Err(e) => {
                    warn!(error = %e, "restock request for an unknown item");
                    self.dispatch.delivery_failures += 1;
                }
            }
            return;
        }

        if let Some((customer, epoch)) = message.payload().requesting_customer() {
            if !waiting_on(&self.customers, customer, epoch) {
                debug!(%customer, epoch, kind = ?message.kind(), "stale request dropped");
                self.dispatch.stale_requests += 1;
                return;
            }
        }
        self.dispatch.delivered += 1;
        self.backlog.push(message);
    }

    fn record_visit(&mut self, message: &Message) {
        match message.payload() {
            Payload::SatisfactionReport { outcome, score, .. } => {
                self.dispatch.delivered += 1;
                self.visits.record(*outcome, *score);
            }
            other => warn!(kind = ?other.kind(), "unexpected message on the metrics topic"),
        }
    }

    fn delivery_failure(&mut self, message: &Message) {
        self.dispatch.delivery_failures += 1;
        warn!(
            target = %message.target(),
            sender = %message.sender(),
            kind = ?message.kind(),
            "delivery failure: no such actor",
        );
    }

    /// Tell an item what the ledger now holds for it.
    fn publish_inventory_update(&mut self, item: ItemId, now: Tick) {
        let Some(row) = self.ledger.row(item) else {
            return;
        };
        let update = Payload::InventoryUpdate {
            item:            row.item,
            stock:           row.stock,
            price:           row.price,
            units_sold:      row.units_sold,
            units_restocked: row.units_restocked,
            restock_pending: row.restock_pending,
        };
        self.bus.publish(Envelope::new(ActorId::Ledger, item, update), now);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Tick every actor in the slice, collecting their messages in slice order.
///
/// With the `parallel` feature the calls run on Rayon's thread pool; the
/// indexed collect keeps the output order identical to the sequential path.
#[cfg(not(feature = "parallel"))]
fn activate<A: Behavior>(actors: &mut [A], ctx: &TickContext<'_>) -> Vec<Envelope> {
    actors.iter_mut().flat_map(|a| a.tick(ctx)).collect()
}

#[cfg(feature = "parallel")]
fn activate<A: Behavior>(actors: &mut [A], ctx: &TickContext<'_>) -> Vec<Envelope> {
    use rayon::prelude::*;

    let per_actor: Vec<Vec<Envelope>> = actors.par_iter_mut().map(|a| a.tick(ctx)).collect();
    per_actor.into_iter().flatten().collect()
}

fn find_customer(customers: &[Customer], id: CustomerId) -> Option<usize> {
    customers.binary_search_by_key(&id, Customer::id).ok()
}

/// `true` while `customer` is still in the store and waiting on `epoch`.
fn waiting_on(customers: &[Customer], customer: CustomerId, epoch: u32) -> bool {
    find_customer(customers, customer)
        .is_some_and(|i| customers[i].awaiting() == Some(epoch))
}

/// Drop backlog requests nobody is waiting for any more.
fn prune_backlog(backlog: &mut Backlog, customers: &[Customer]) -> usize {
    backlog.retain(|m| match m.payload().requesting_customer() {
        Some((customer, epoch)) => waiting_on(customers, customer, epoch),
        None => true,
    })
}
