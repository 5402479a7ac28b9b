//! The customer state machine.
//!
//! ```text
//!            p(budget, match)              basket chosen
//!  Browsing ─────────────────▶ Evaluating ─────────────▶ Purchasing
//!     ▲                            │                          │
//!     │      nothing suitable      │ desired item missing     │ Confirmed /
//!     │◀───────────────────────────┤                          │ Rejected
//!     │                            ▼                          │
//!     │◀── serviced / patience ── SeekingHelp                  │
//!     │◀──────────────────────────────────────────────────────┘
//! ```
//!
//! Patience counts down while a request waits in the backlog.  Once an
//! employee acknowledges the claim the countdown stops and the customer
//! waits for the answer; an unclaimed request is abandoned at zero.
//!
//! Every return to `Browsing` from `Purchasing` or `SeekingHelp` completes a
//! visit.  After `max_visits` visits (or once the remaining budget cannot buy
//! the cheapest title) the customer is done and the scheduler removes it.

use shop_bus::{Address, Envelope, Message, Payload, VisitOutcome};
use shop_core::{
    ActorId, ActorRng, Category, CustomerId, CustomerType, LineRequest, Money, PurchaseIntent,
    RejectReason, StoreParams, Tick,
};
use tracing::debug;

use crate::{Behavior, CatalogEntry, TickContext};

/// Most titles a customer puts in one basket.
const MAX_BASKET_LINES: usize = 3;

/// Share of the remaining budget a single title may cost, in percent.
const PRICE_CEILING_PCT: i64 = 60;

/// Probability of considering a listing in / outside the preferred categories.
const PREFERRED_APPEAL: f64 = 0.7;
const OTHER_APPEAL: f64 = 0.3;

/// Satisfaction deltas.
const QUICK_PURCHASE: f64 = 1.0;
const SLOW_PURCHASE: f64 = 0.5;
const STOCK_OUT_PENALTY: f64 = -1.0;
const OTHER_REJECT_PENALTY: f64 = -0.5;
const HELP_GAIN_SCALE: f64 = 2.0;
const ABANDON_PENALTY: f64 = -1.5;

const INITIAL_SATISFACTION: f64 = 5.0;
const MAX_SATISFACTION: f64 = 10.0;

// ── State ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CustomerState {
    Browsing,
    Evaluating,
    Purchasing,
    SeekingHelp,
}

/// Completed visits by outcome.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisitTally {
    pub purchased: u32,
    pub rejected:  u32,
    pub helped:    u32,
    pub abandoned: u32,
}

impl VisitTally {
    pub fn record(&mut self, outcome: VisitOutcome) {
        match outcome {
            VisitOutcome::Purchased => self.purchased += 1,
            VisitOutcome::Rejected  => self.rejected += 1,
            VisitOutcome::Helped    => self.helped += 1,
            VisitOutcome::Abandoned => self.abandoned += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.purchased + self.rejected + self.helped + self.abandoned
    }
}

// ── Profile ───────────────────────────────────────────────────────────────────

/// The randomized part of a new customer.
#[derive(Clone, PartialEq, Debug)]
pub struct CustomerProfile {
    pub customer_type: CustomerType,
    pub budget:        Money,
    pub preferences:   Vec<Category>,
}

impl CustomerProfile {
    /// Draw a segment uniformly, a budget from the segment's range, and one
    /// to four distinct preferred categories.
    pub fn generate(rng: &mut ActorRng) -> Self {
        let customer_type = *rng.choose(&CustomerType::ALL).unwrap_or(&CustomerType::Regular);
        let (lo, hi) = customer_type.budget_range();
        let budget = Money(rng.gen_range(lo.cents()..=hi.cents()));

        let mut categories = Category::ALL;
        rng.shuffle(&mut categories);
        let n = rng.gen_range(1..=4usize);
        let mut preferences = categories[..n].to_vec();
        preferences.sort();

        Self { customer_type, budget, preferences }
    }
}

// ── Customer ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Customer {
    id:               CustomerId,
    customer_type:    CustomerType,
    budget:           Money,
    /// Amount the ledger has recorded against this customer, as last reported.
    spent:            Money,
    preferences:      Vec<Category>,
    satisfaction:     f64,
    patience_limit:   u32,
    patience:         u32,
    state:            CustomerState,
    /// Identifies the outstanding request; bumped every time one is issued.
    epoch:            u32,
    waiting_since:    Tick,
    /// An employee has picked up the outstanding request.
    claimed:          bool,
    max_visits:       u32,
    visits:           VisitTally,
    /// Set when the remaining budget cannot buy the cheapest title.
    exhausted:        bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    rng:              ActorRng,
}

impl Customer {
    /// Generate a customer entirely from the run seed and its id.
    pub fn generate(id: CustomerId, seed: u64, params: &StoreParams) -> Self {
        let mut rng = ActorRng::new(seed, ActorId::Customer(id));
        let profile = CustomerProfile::generate(&mut rng);
        Self::with_rng(id, profile, rng, params)
    }

    /// Build a customer from an explicit profile.  Patience and visit count
    /// are still drawn from `params` with the customer's own RNG.
    pub fn new(id: CustomerId, profile: CustomerProfile, seed: u64, params: &StoreParams) -> Self {
        Self::with_rng(id, profile, ActorRng::new(seed, ActorId::Customer(id)), params)
    }

    fn with_rng(
        id:         CustomerId,
        profile:    CustomerProfile,
        mut rng:    ActorRng,
        params:     &StoreParams,
    ) -> Self {
        let patience_limit = rng.gen_range(params.patience_min..=params.patience_max);
        let max_visits = rng.gen_range(params.visits_min..=params.visits_max);
        Self {
            id,
            customer_type: profile.customer_type,
            budget:        profile.budget,
            spent:         Money::ZERO,
            preferences:   profile.preferences,
            satisfaction:  INITIAL_SATISFACTION,
            patience_limit,
            patience:      patience_limit,
            state:         CustomerState::Browsing,
            epoch:         0,
            waiting_since: Tick::ZERO,
            claimed:       false,
            max_visits,
            visits:        VisitTally::default(),
            exhausted:     false,
            rng,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn state(&self) -> CustomerState {
        self.state
    }

    pub fn customer_type(&self) -> CustomerType {
        self.customer_type
    }

    pub fn budget(&self) -> Money {
        self.budget
    }

    pub fn spent(&self) -> Money {
        self.spent
    }

    pub fn remaining(&self) -> Money {
        self.budget.saturating_sub(self.spent)
    }

    pub fn preferences(&self) -> &[Category] {
        &self.preferences
    }

    pub fn satisfaction(&self) -> f64 {
        self.satisfaction
    }

    pub fn patience(&self) -> u32 {
        self.patience
    }

    /// `true` while an employee is working on the outstanding request.
    pub fn is_claimed(&self) -> bool {
        self.claimed && self.awaiting().is_some()
    }

    pub fn visits(&self) -> VisitTally {
        self.visits
    }

    pub fn max_visits(&self) -> u32 {
        self.max_visits
    }

    /// The epoch of the request this customer is waiting on, if any.
    pub fn awaiting(&self) -> Option<u32> {
        match self.state {
            CustomerState::Purchasing | CustomerState::SeekingHelp => Some(self.epoch),
            CustomerState::Browsing | CustomerState::Evaluating => None,
        }
    }

    /// `true` once the customer should leave the active set.
    pub fn is_done(&self) -> bool {
        self.awaiting().is_none()
            && (self.exhausted || self.visits.total() >= self.max_visits)
    }

    fn prefers(&self, category: Category) -> bool {
        self.preferences.contains(&category)
    }

    fn price_ceiling(&self) -> Money {
        Money(self.remaining().cents() * PRICE_CEILING_PCT / 100)
    }

    fn adjust_satisfaction(&mut self, delta: f64) {
        self.satisfaction = (self.satisfaction + delta).clamp(0.0, MAX_SATISFACTION);
    }

    // ── Transitions ───────────────────────────────────────────────────────

    fn browse(&mut self, ctx: &TickContext<'_>) -> Vec<Envelope> {
        let remaining = self.remaining();
        match ctx.cheapest_price() {
            Some(cheapest) if remaining >= cheapest => {}
            _ => {
                debug!(customer = %self.id, %remaining, "budget exhausted");
                self.exhausted = true;
                return vec![];
            }
        }

        let ceiling = self.price_ceiling();
        let matched = ctx
            .catalog
            .iter()
            .any(|e| self.prefers(e.category) && e.price <= ceiling);
        let appeal = if matched { PREFERRED_APPEAL } else { OTHER_APPEAL };
        let budget_factor = if self.budget.is_positive() {
            (remaining.as_dollars() / self.budget.as_dollars()).clamp(0.25, 1.0)
        } else {
            0.0
        };

        if self.rng.gen_bool(appeal * budget_factor) {
            self.state = CustomerState::Evaluating;
        }
        vec![]
    }

    fn evaluate(&mut self, ctx: &TickContext<'_>) -> Vec<Envelope> {
        let ceiling = self.price_ceiling();
        let remaining = self.remaining();
        let discount = self.customer_type.discount_bps();

        let mut candidates: Vec<&CatalogEntry> = ctx
            .catalog
            .iter()
            .filter(|e| e.stock > 0 && e.price <= ceiling)
            .collect();
        self.rng.shuffle(&mut candidates);

        let mut lines = Vec::with_capacity(MAX_BASKET_LINES);
        let mut subtotal = Money::ZERO;
        for entry in &candidates {
            if lines.len() == MAX_BASKET_LINES {
                break;
            }
            let appeal = if self.prefers(entry.category) { PREFERRED_APPEAL } else { OTHER_APPEAL };
            if !self.rng.gen_bool(appeal) {
                continue;
            }
            if (subtotal + entry.price).after_discount(discount) <= remaining {
                subtotal += entry.price;
                lines.push(LineRequest { item: entry.item, quantity: 1 });
            }
        }

        if !lines.is_empty() {
            let epoch = self.open_request(ctx.tick, CustomerState::Purchasing);
            debug!(customer = %self.id, lines = lines.len(), %subtotal, epoch, "requesting checkout");
            let intent = PurchaseIntent {
                customer:     self.id,
                lines,
                budget:       self.budget,
                discount_bps: discount,
                requested_at: ctx.tick,
            };
            return vec![Envelope::new(
                self.id,
                Address::ANY_EMPLOYEE,
                Payload::PurchaseRequest { intent, epoch },
            )];
        }

        let wanted_missing = ctx
            .catalog
            .iter()
            .any(|e| self.prefers(e.category) && e.stock == 0);
        let nothing_preferred = !candidates.iter().any(|e| self.prefers(e.category));
        if wanted_missing || nothing_preferred {
            let epoch = self.open_request(ctx.tick, CustomerState::SeekingHelp);
            debug!(customer = %self.id, epoch, "seeking help");
            return vec![Envelope::new(
                self.id,
                Address::ANY_EMPLOYEE,
                Payload::AssistRequest {
                    customer:   self.id,
                    epoch,
                    categories: self.preferences.clone(),
                },
            )];
        }

        self.state = CustomerState::Browsing;
        vec![]
    }

    fn wait_for_claim(&mut self) -> Vec<Envelope> {
        if self.claimed {
            return vec![];
        }
        self.patience = self.patience.saturating_sub(1);
        if self.patience > 0 {
            return vec![];
        }
        debug!(customer = %self.id, epoch = self.epoch, state = ?self.state, "abandoned unclaimed request");
        self.adjust_satisfaction(ABANDON_PENALTY);
        self.finish_visit(VisitOutcome::Abandoned)
    }

    fn open_request(&mut self, now: Tick, state: CustomerState) -> u32 {
        self.epoch += 1;
        self.waiting_since = now;
        self.patience = self.patience_limit;
        self.claimed = false;
        self.state = state;
        self.epoch
    }

    fn finish_visit(&mut self, outcome: VisitOutcome) -> Vec<Envelope> {
        self.state = CustomerState::Browsing;
        self.visits.record(outcome);
        vec![Envelope::new(
            self.id,
            Address::METRICS,
            Payload::SatisfactionReport {
                customer: self.id,
                outcome,
                score:    self.satisfaction,
            },
        )]
    }

    fn is_current(&self, state: CustomerState, epoch: u32) -> bool {
        self.state == state && self.epoch == epoch
    }
}

impl Behavior for Customer {
    fn actor_id(&self) -> ActorId {
        ActorId::Customer(self.id)
    }

    fn tick(&mut self, ctx: &TickContext<'_>) -> Vec<Envelope> {
        if self.is_done() {
            return vec![];
        }
        match self.state {
            CustomerState::Browsing    => self.browse(ctx),
            CustomerState::Evaluating  => self.evaluate(ctx),
            CustomerState::Purchasing
            | CustomerState::SeekingHelp => self.wait_for_claim(),
        }
    }

    fn receive(&mut self, message: &Message, ctx: &TickContext<'_>) -> Vec<Envelope> {
        match message.payload() {
            Payload::PurchaseConfirmed { epoch, total, spent, .. }
                if self.is_current(CustomerState::Purchasing, *epoch) =>
            {
                self.spent = *spent;
                let waited = ctx.tick.since(self.waiting_since);
                let delta = if waited <= ctx.params.quick_service_ticks {
                    QUICK_PURCHASE
                } else {
                    SLOW_PURCHASE
                };
                self.adjust_satisfaction(delta);
                debug!(customer = %self.id, %total, waited, "purchase confirmed");
                self.finish_visit(VisitOutcome::Purchased)
            }

            Payload::PurchaseRejected { epoch, reason }
                if self.is_current(CustomerState::Purchasing, *epoch) =>
            {
                let delta = match reason {
                    RejectReason::OutOfStock { .. } => STOCK_OUT_PENALTY,
                    _ => OTHER_REJECT_PENALTY,
                };
                self.adjust_satisfaction(delta);
                debug!(customer = %self.id, %reason, "purchase rejected");
                self.finish_visit(VisitOutcome::Rejected)
            }

            Payload::RequestClaimed { epoch, employee } if self.awaiting() == Some(*epoch) => {
                debug!(customer = %self.id, %employee, epoch, "request claimed");
                self.claimed = true;
                vec![]
            }

            Payload::AssistServiced { epoch, employee, quality }
                if self.is_current(CustomerState::SeekingHelp, *epoch) =>
            {
                self.adjust_satisfaction(quality * HELP_GAIN_SCALE);
                debug!(customer = %self.id, %employee, "helped");
                self.finish_visit(VisitOutcome::Helped)
            }

            other => {
                debug!(customer = %self.id, kind = ?other.kind(), "ignoring stale or unexpected message");
                vec![]
            }
        }
    }
}
