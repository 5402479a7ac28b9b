//! Integration-style tests for the scheduler.

#[cfg(test)]
mod helpers {
    use shop_actor::CustomerProfile;
    use shop_core::{Category, CustomerType, Money, SimConfig, Tick};
    use shop_ledger::{CatalogItem, InvariantViolation, Metrics};

    use crate::{Checkpoint, RunOutcome, SimObserver, StopHandle, TickSummary};

    pub fn config(customers: usize, employees: usize, items: usize, ticks: u64) -> SimConfig {
        SimConfig {
            seed: 42,
            total_ticks: ticks,
            checkpoint_interval_ticks: 0,
            customers,
            employees,
            items,
            ..SimConfig::default()
        }
    }

    pub fn book(cents: i64, stock: u32) -> CatalogItem {
        CatalogItem { category: Category::Fiction, base_price: Money(cents), stock }
    }

    /// Cannot afford a $10 title, so leaves on its first tick.
    pub fn window_shopper() -> CustomerProfile {
        CustomerProfile {
            customer_type: CustomerType::Regular,
            budget:        Money(500),
            preferences:   vec![Category::Fiction],
        }
    }

    pub fn fiction_fan() -> CustomerProfile {
        CustomerProfile {
            customer_type: CustomerType::Premium,
            budget:        Money(20_000),
            preferences:   vec![Category::Fiction],
        }
    }

    /// Records every callback; optionally requests a stop after a tick.
    #[derive(Default)]
    pub struct Recorder {
        pub started:     Vec<Tick>,
        pub snapshots:   Vec<Metrics>,
        pub checkpoints: Vec<Tick>,
        pub json:        Vec<serde_json::Value>,
        pub aborted:     Option<InvariantViolation>,
        pub ended:       Option<RunOutcome>,
        pub stop_after:  Option<(Tick, StopHandle)>,
    }

    impl SimObserver for Recorder {
        fn on_tick_start(&mut self, tick: Tick) {
            self.started.push(tick);
        }

        fn on_tick_end(&mut self, summary: &TickSummary) {
            if let Some((tick, stop)) = &self.stop_after {
                if summary.tick == *tick {
                    stop.request_stop();
                }
            }
        }

        fn on_snapshot(&mut self, metrics: &Metrics) {
            self.snapshots.push(metrics.clone());
        }

        fn on_checkpoint(&mut self, checkpoint: &Checkpoint<'_>) {
            self.checkpoints.push(checkpoint.tick);
            self.json.push(serde_json::to_value(checkpoint).expect("checkpoint serializes"));
        }

        fn on_abort(&mut self, _checkpoint: &Checkpoint<'_>, violation: &InvariantViolation) {
            self.aborted = Some(violation.clone());
        }

        fn on_sim_end(&mut self, outcome: RunOutcome, _metrics: &Metrics) {
            self.ended = Some(outcome);
        }
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use shop_core::{EmployeeRole, EmployeeId, ItemId, Money, SimConfig, StoreParams};

    use super::helpers::*;
    use crate::{SimBuilder, SimError};

    #[test]
    fn zero_employees_is_a_config_error() {
        let result = SimBuilder::new(config(5, 0, 10, 10)).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn non_positive_duration_is_a_config_error() {
        let result = SimBuilder::new(SimConfig { total_ticks: 0, ..SimConfig::default() }).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn invalid_params_are_rejected_before_tick_zero() {
        let params = StoreParams { patience_min: 9, patience_max: 3, ..StoreParams::default() };
        let result = SimBuilder::new(config(5, 2, 10, 10)).params(params).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn generated_population_follows_config() {
        let sim = SimBuilder::new(config(12, 7, 30, 10)).build().unwrap();
        assert_eq!(sim.customers().len(), 12);
        assert_eq!(sim.employees().len(), 7);
        assert_eq!(sim.items().len(), 30);

        // Round-robin roles.
        for (i, e) in sim.employees().iter().enumerate() {
            assert_eq!(e.id(), EmployeeId(i as u32));
            assert_eq!(e.role(), EmployeeRole::ROTATION[i % 5]);
            assert!((5.0..=9.0).contains(&e.rating()));
        }

        for row in sim.ledger().rows() {
            assert!((5..=50).contains(&row.stock));
            assert!(row.base_price >= Money(999) && row.base_price <= Money(7_999));
        }
    }

    #[test]
    fn same_seed_builds_the_same_store() {
        let a = SimBuilder::new(config(10, 3, 20, 10)).build().unwrap();
        let b = SimBuilder::new(config(10, 3, 20, 10)).build().unwrap();
        assert_eq!(a.ledger().rows(), b.ledger().rows());
        let budgets = |s: &crate::Sim| s.customers().iter().map(|c| c.budget()).collect::<Vec<_>>();
        assert_eq!(budgets(&a), budgets(&b));
    }

    #[test]
    fn explicit_populations_override_config_sizes() {
        let sim = SimBuilder::new(config(50, 50, 50, 10))
            .catalog(vec![book(1_000, 30), book(2_000, 30)])
            .customers(vec![fiction_fan()])
            .roles(vec![EmployeeRole::Manager])
            .build()
            .unwrap();
        assert_eq!(sim.config.items, 2);
        assert_eq!(sim.config.customers, 1);
        assert_eq!(sim.config.employees, 1);
        assert_eq!(sim.ledger().stock(ItemId(1)), Some(30));
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use shop_core::Tick;

    use super::helpers::*;
    use crate::{NoopObserver, RunOutcome, SimBuilder};

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = || {
            let mut sim = SimBuilder::new(config(10, 3, 20, 100)).build().unwrap();
            let outcome = sim.run(&mut NoopObserver).unwrap();
            assert_eq!(outcome, RunOutcome::Completed);
            sim
        };
        let a = run();
        let b = run();

        assert!(!a.ledger().transactions().is_empty(), "ten customers over 100 ticks buy something");
        assert_eq!(a.ledger().transactions(), b.ledger().transactions());
        assert_eq!(a.ledger().revenue(), b.ledger().revenue());
        assert_eq!(a.ledger().stock_vector(), b.ledger().stock_vector());
        assert_eq!(a.visit_stats(), b.visit_stats());
        assert_eq!(a.dispatch_stats(), b.dispatch_stats());
    }

    #[test]
    fn every_tick_is_snapshotted_and_observed() {
        let mut sim = SimBuilder::new(config(5, 2, 10, 25)).build().unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(rec.started.len(), 25);
        assert_eq!(rec.snapshots.len(), 25);
        for (i, m) in rec.snapshots.iter().enumerate() {
            assert_eq!(m.tick, Tick(i as u64));
        }
        assert_eq!(rec.ended, Some(RunOutcome::Completed));
        assert!(rec.aborted.is_none());
        assert_eq!(sim.clock.current_tick, Tick(25));
    }

    #[test]
    fn revenue_never_decreases_between_snapshots() {
        let mut sim = SimBuilder::new(config(20, 5, 30, 120)).build().unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        for pair in rec.snapshots.windows(2) {
            assert!(pair[1].total_revenue >= pair[0].total_revenue);
            assert!(pair[1].transaction_count >= pair[0].transaction_count);
        }
        let total: shop_core::Money = sim.ledger().transactions().iter().map(|t| t.total).sum();
        assert_eq!(total, sim.ledger().revenue());
    }

    #[test]
    fn periodic_and_final_checkpoints() {
        let mut cfg = config(5, 2, 10, 10);
        cfg.checkpoint_interval_ticks = 4;
        let mut sim = SimBuilder::new(cfg).build().unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(rec.checkpoints, vec![Tick(4), Tick(8), Tick(10)]);
        let last = rec.json.last().unwrap();
        assert_eq!(last["tick"], 10);
        assert!(last["ledger"]["stock"].is_array());
        assert!(last["customers"].is_array());
        assert_eq!(last["config"]["seed"], 42);
    }

    #[test]
    fn final_checkpoint_is_not_duplicated_on_an_interval_boundary() {
        let mut cfg = config(5, 2, 10, 10);
        cfg.checkpoint_interval_ticks = 5;
        let mut sim = SimBuilder::new(cfg).build().unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.checkpoints, vec![Tick(5), Tick(10)]);
    }

    #[test]
    fn feed_holds_the_final_snapshot() {
        let mut sim = SimBuilder::new(config(5, 2, 10, 15)).build().unwrap();
        let feed = sim.feed();
        assert!(feed.latest().is_none());
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(feed.latest(), Some(sim.snapshot()));
    }

    #[test]
    fn run_ticks_steps_without_finishing() {
        let mut sim = SimBuilder::new(config(5, 2, 10, 100)).build().unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(3, &mut rec).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(3));
        assert_eq!(rec.snapshots.len(), 3);
        assert!(rec.ended.is_none());
    }
}

// ── Stop signal ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod stop_tests {
    use shop_core::Tick;

    use super::helpers::*;
    use crate::{RunOutcome, SimBuilder, StopHandle};

    #[test]
    fn stop_before_start_runs_no_ticks_but_still_checkpoints() {
        let mut sim = SimBuilder::new(config(5, 2, 10, 50)).build().unwrap();
        sim.stop_handle().request_stop();
        let mut rec = Recorder::default();

        let outcome = sim.run(&mut rec).unwrap();
        assert_eq!(outcome, RunOutcome::Stopped);
        assert!(rec.started.is_empty());
        assert_eq!(rec.checkpoints, vec![Tick(0)]);
        assert_eq!(rec.ended, Some(RunOutcome::Stopped));
    }

    #[test]
    fn stop_is_honored_at_the_next_tick_boundary() {
        let stop = StopHandle::new();
        let mut sim = SimBuilder::new(config(5, 2, 10, 50))
            .stop_handle(stop.clone())
            .build()
            .unwrap();
        let mut rec = Recorder { stop_after: Some((Tick(4), stop)), ..Recorder::default() };

        let outcome = sim.run(&mut rec).unwrap();
        assert_eq!(outcome, RunOutcome::Stopped);
        // Tick 4 completes in full; tick 5 never starts.
        assert_eq!(rec.started.len(), 5);
        assert_eq!(sim.clock.current_tick, Tick(5));
        assert_eq!(rec.checkpoints, vec![Tick(5)]);
    }
}

// ── Dispatch and commits ──────────────────────────────────────────────────────

#[cfg(test)]
mod dispatch_tests {
    use shop_bus::{Address, Envelope, Payload, VisitOutcome};
    use shop_core::{
        ActorId, CustomerId, EmployeeId, EmployeeRole, ItemId, LineRequest, Money, PurchaseIntent,
        RejectReason, Tick,
    };

    use super::helpers::*;
    use crate::{NoopObserver, SimBuilder};

    fn commit_one(employee: u32, customer: u32) -> Envelope {
        let intent = PurchaseIntent {
            customer:     CustomerId(customer),
            lines:        vec![LineRequest { item: ItemId(0), quantity: 1 }],
            budget:       Money(10_000),
            discount_bps: 0,
            requested_at: Tick::ZERO,
        };
        Envelope::new(
            EmployeeId(employee),
            Address::LEDGER,
            Payload::CommitPurchase { employee: EmployeeId(employee), intent, epoch: 1 },
        )
    }

    #[test]
    fn last_unit_is_sold_exactly_once() {
        let mut sim = SimBuilder::new(config(2, 2, 1, 10))
            .catalog(vec![book(1_000, 1)])
            .customers(vec![window_shopper(), window_shopper()])
            .roles(vec![EmployeeRole::Cashier, EmployeeRole::Cashier])
            .build()
            .unwrap();

        sim.inject(commit_one(0, 0));
        sim.inject(commit_one(1, 1));
        sim.run_ticks(1, &mut NoopObserver).unwrap();

        let ledger = sim.ledger();
        assert_eq!(ledger.transactions().len(), 1);
        assert_eq!(ledger.transactions()[0].customer, CustomerId(0));
        assert_eq!(ledger.stock(ItemId(0)), Some(0));
        assert_eq!(ledger.alerts().rejected_out_of_stock, 1);

        // Both replies wait on the bus for the next drain.
        let confirmed = sim
            .bus()
            .pending()
            .filter(|m| matches!(m.payload(), Payload::PurchaseConfirmed { .. }))
            .count();
        let rejected: Vec<_> = sim
            .bus()
            .pending()
            .filter_map(|m| match m.payload() {
                Payload::PurchaseRejected { reason, .. } => Some((m.target(), reason.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(confirmed, 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, Address::from(CustomerId(1)));
        assert!(matches!(rejected[0].1, RejectReason::OutOfStock { item } if item == ItemId(0)));
    }

    #[test]
    fn unknown_target_is_counted_and_dropped() {
        let mut sim = SimBuilder::new(config(1, 1, 1, 10))
            .catalog(vec![book(1_000, 30)])
            .customers(vec![window_shopper()])
            .roles(vec![EmployeeRole::Cashier])
            .build()
            .unwrap();

        sim.inject(Envelope::new(
            ActorId::Ledger,
            CustomerId(999),
            Payload::PurchaseRejected { epoch: 1, reason: RejectReason::EmptyBasket },
        ));
        sim.run_ticks(2, &mut NoopObserver).unwrap();
        assert_eq!(sim.dispatch_stats().delivery_failures, 1);
    }

    #[test]
    fn low_stock_item_is_restocked_once() {
        let mut sim = SimBuilder::new(config(1, 1, 1, 30))
            .catalog(vec![book(1_000, 3)])
            .customers(vec![window_shopper()])
            .roles(vec![EmployeeRole::InventoryClerk])
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();

        let row = sim.ledger().row(ItemId(0)).unwrap();
        assert_eq!(row.stock, 3 + sim.params.restock_quantity);
        assert_eq!(row.units_restocked, sim.params.restock_quantity as u64);
        assert!(!row.restock_pending);
        assert_eq!(sim.ledger().alerts().restocks, 1);
        assert_eq!(sim.employees()[0].restocks_handled(), 1);
        sim.ledger().verify().unwrap();
    }

    #[test]
    fn cashier_only_store_never_restocks() {
        let mut sim = SimBuilder::new(config(1, 1, 1, 20))
            .catalog(vec![book(1_000, 3)])
            .customers(vec![window_shopper()])
            .roles(vec![EmployeeRole::Cashier])
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();

        let row = sim.ledger().row(ItemId(0)).unwrap();
        assert_eq!(row.stock, 3);
        assert!(row.restock_pending);
        assert_eq!(sim.backlog().len(), 1);
    }

    #[test]
    fn unserved_help_requests_end_in_abandonment() {
        let mut sim = SimBuilder::new(config(1, 1, 1, 60))
            .catalog(vec![book(1_000, 0)])
            .customers(vec![fiction_fan()])
            .roles(vec![EmployeeRole::Cashier])
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();

        let visits = sim.visit_stats();
        assert!(visits.tally.abandoned >= 1);
        assert_eq!(visits.tally.purchased, 0);
        assert!(sim.dispatch_stats().stale_requests >= 1);
        assert!(sim.ledger().transactions().is_empty());

        // Nothing left in the backlog belongs to a customer who stopped waiting.
        for m in sim.backlog().iter() {
            if let Some((customer, epoch)) = m.payload().requesting_customer() {
                assert_eq!(sim.customer(customer).and_then(|c| c.awaiting()), Some(epoch));
            }
        }
    }

    #[test]
    fn visit_reports_reach_the_metrics_topic() {
        let mut sim = SimBuilder::new(config(1, 1, 1, 10))
            .catalog(vec![book(1_000, 30)])
            .customers(vec![window_shopper()])
            .roles(vec![EmployeeRole::Cashier])
            .build()
            .unwrap();
        sim.inject(Envelope::new(
            CustomerId(0),
            Address::METRICS,
            Payload::SatisfactionReport {
                customer: CustomerId(0),
                outcome:  VisitOutcome::Helped,
                score:    7.0,
            },
        ));
        sim.run_ticks(1, &mut NoopObserver).unwrap();

        let visits = sim.visit_stats();
        assert_eq!(visits.tally.helped, 1);
        assert_eq!(visits.mean_satisfaction(), 7.0);
    }
}

// ── Claims and service ────────────────────────────────────────────────────────

#[cfg(test)]
mod claim_tests {
    use shop_actor::{Behavior, CatalogEntry, TickContext};
    use shop_bus::Envelope;
    use shop_core::{Category, EmployeeRole, ItemId, Money, StoreParams, Tick};

    use super::helpers::*;
    use crate::{NoopObserver, Sim, SimBuilder};

    fn impatient(patience: u32) -> StoreParams {
        StoreParams {
            patience_min: patience,
            patience_max: patience,
            visits_min: 1,
            visits_max: 1,
            ..StoreParams::default()
        }
    }

    /// Employee interactions must match the visits that had one.
    fn assert_served_matches_visits(sim: &Sim) {
        let tally = sim.visit_stats().tally;
        let served: u32 = sim.employees().iter().map(|e| e.customers_served()).sum();
        assert_eq!(served, tally.purchased + tally.rejected + tally.helped);
    }

    #[test]
    fn claimed_help_request_outlasts_patience() {
        // Customer service needs three ticks; the customer's patience is two.
        let mut sim = SimBuilder::new(config(1, 1, 1, 60))
            .params(impatient(2))
            .catalog(vec![book(1_000, 0)])
            .customers(vec![fiction_fan()])
            .roles(vec![EmployeeRole::CustomerService])
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();

        let tally = sim.visit_stats().tally;
        assert_eq!(tally.abandoned, 0);
        assert_eq!(tally.helped, 1);
        assert_eq!(sim.employees()[0].customers_served(), 1);
        assert_served_matches_visits(&sim);
        assert!(sim.customers().is_empty());
    }

    #[test]
    fn checkout_without_cashiers_is_abandoned() {
        let mut sim = SimBuilder::new(config(1, 1, 1, 60))
            .params(impatient(2))
            .catalog(vec![book(1_000, 30)])
            .customers(vec![fiction_fan()])
            .roles(vec![EmployeeRole::CustomerService])
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();

        assert!(sim.customers().is_empty(), "customer stuck waiting for a checkout");
        assert_eq!(sim.visit_stats().tally.abandoned, 1);
        assert_eq!(sim.employees()[0].customers_served(), 0);
        assert!(sim.ledger().transactions().is_empty());
        assert!(sim.backlog().iter().all(|m| m.payload().requesting_customer().is_none()));
    }

    #[test]
    fn two_checkouts_for_the_last_copy_sell_it_once() {
        let mut sim = SimBuilder::new(config(2, 2, 1, 20))
            .params(impatient(50))
            .catalog(vec![book(1_000, 1)])
            .customers(vec![fiction_fan(), fiction_fan()])
            .roles(vec![EmployeeRole::Cashier, EmployeeRole::Cashier])
            .build()
            .unwrap();

        // Both customers see the copy on the shelf and ask to buy it.
        let catalog = [CatalogEntry {
            item:     ItemId(0),
            category: Category::Fiction,
            price:    Money(1_000),
            stock:    1,
        }];
        let params = sim.params.clone();
        let mut requests: Vec<Envelope> = Vec::new();
        for customer in &mut sim.customers {
            let request = (0..500)
                .find_map(|t| {
                    let ctx = TickContext::new(Tick(t), &params, &catalog);
                    let mut out = customer.tick(&ctx);
                    customer.awaiting().is_some().then(|| out.remove(0))
                })
                .expect("customer asks to check out");
            requests.push(request);
        }
        for request in requests {
            sim.inject(request);
        }
        sim.run_ticks(8, &mut NoopObserver).unwrap();

        let ledger = sim.ledger();
        assert_eq!(ledger.transactions().len(), 1);
        assert_eq!(ledger.stock(ItemId(0)), Some(0));
        assert_eq!(ledger.alerts().rejected_out_of_stock, 1);

        let tally = sim.visit_stats().tally;
        assert_eq!(tally.purchased, 1);
        assert_eq!(tally.rejected, 1);
        assert!(sim.employees().iter().all(|e| e.customers_served() == 1));
        assert_served_matches_visits(&sim);
    }
}

// ── Arrivals ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod arrival_tests {
    use shop_core::{CustomerId, StoreParams};

    use super::helpers::*;
    use crate::{NoopObserver, SimBuilder};

    #[test]
    fn arrivals_join_with_fresh_ids() {
        let params = StoreParams {
            arrival_interval_ticks: 5,
            arrivals_per_interval: 3,
            ..StoreParams::default()
        };
        let mut sim = SimBuilder::new(config(1, 1, 1, 10))
            .params(params)
            .catalog(vec![book(1_000, 30)])
            .customers(vec![window_shopper()])
            .build()
            .unwrap();
        sim.run_ticks(5, &mut NoopObserver).unwrap();

        // The window shopper left on tick 0; three arrived after tick 4.
        let ids: Vec<CustomerId> = sim.customers().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![CustomerId(1), CustomerId(2), CustomerId(3)]);
        assert_eq!(sim.dispatch_stats().arrivals, 3);
        assert_eq!(sim.dispatch_stats().departures, 1);
    }
}
