//! The employee state machine: claim one request, serve it, report back.

use shop_bus::{Address, Envelope, Message, Payload, Topic};
use shop_core::{
    ActorId, CustomerId, EmployeeId, EmployeeRole, ItemId, PurchaseIntent, RoleProfile,
};
use tracing::debug;

use crate::{Behavior, TickContext};

/// Fraction of the gap to `quality × 10` the rating closes per finished task.
const RATING_DRIFT: f64 = 0.1;

// ── Claim ranks ───────────────────────────────────────────────────────────────
//
// Lower ranks are claimed first; requests of equal rank fall back to bus order.

const RANK_FIRST: u8 = 0;
const RANK_SECOND: u8 = 1;
const RANK_LAST: u8 = 2;

/// What an employee is working on.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Task {
    Checkout { intent: PurchaseIntent, epoch: u32 },
    Assist { customer: CustomerId, epoch: u32 },
    Restock { item: ItemId, quantity: u32 },
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EmployeeState {
    Idle,
    Serving { task: Task, remaining: u32 },
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Employee {
    id:                EmployeeId,
    role:              EmployeeRole,
    state:             EmployeeState,
    /// Lookup-only link to the customer being served.  The customer may have
    /// left by the time this is read.
    assigned_customer: Option<CustomerId>,
    /// Claim acknowledgement owed to a customer, sent on the next tick.
    claim_notice:      Option<(CustomerId, u32)>,
    customers_served:  u32,
    restocks_handled:  u32,
    rating:            f64,
}

impl Employee {
    pub fn new(id: EmployeeId, role: EmployeeRole, rating: f64) -> Self {
        Self {
            id,
            role,
            state: EmployeeState::Idle,
            assigned_customer: None,
            claim_notice: None,
            customers_served: 0,
            restocks_handled: 0,
            rating,
        }
    }

    #[inline]
    pub fn id(&self) -> EmployeeId {
        self.id
    }

    pub fn role(&self) -> EmployeeRole {
        self.role
    }

    pub fn state(&self) -> &EmployeeState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, EmployeeState::Serving { .. })
    }

    pub fn assigned_customer(&self) -> Option<CustomerId> {
        self.assigned_customer
    }

    pub fn customers_served(&self) -> u32 {
        self.customers_served
    }

    pub fn restocks_handled(&self) -> u32 {
        self.restocks_handled
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    fn profile(&self) -> RoleProfile {
        self.role.profile()
    }

    /// How much this employee wants `message`; `None` if it cannot take it.
    ///
    /// Inventory clerks put restocks ahead of customers.  Managers restock
    /// only when no customer work they could take is ranked ahead.
    pub fn claim_rank(&self, message: &Message) -> Option<u8> {
        if let Address::Topic(Topic::Role(role)) = message.target() {
            if role != self.role {
                return None;
            }
        }
        let clerk = self.role == EmployeeRole::InventoryClerk;
        let customer_rank = if clerk { RANK_SECOND } else { RANK_FIRST };
        match message.payload() {
            Payload::PurchaseRequest { .. } if self.role.can_checkout() => Some(customer_rank),
            Payload::AssistRequest { .. } if self.role.can_assist() => Some(customer_rank),
            Payload::RestockRequest { .. } if self.role.can_restock() => {
                Some(if clerk { RANK_FIRST } else { RANK_LAST })
            }
            _ => None,
        }
    }

    /// Take `message` as the current task.  Returns `false` (and stays idle)
    /// if already busy or the payload is not a work request.
    ///
    /// A claimed customer request is acknowledged to the customer on the
    /// next [`Behavior::tick`], which stops its patience countdown.
    pub fn begin(&mut self, message: &Message, ctx: &TickContext<'_>) -> bool {
        if self.is_busy() {
            return false;
        }
        let service = self.profile().service_ticks;
        let (task, remaining) = match message.payload() {
            Payload::PurchaseRequest { intent, epoch } => {
                self.assigned_customer = Some(intent.customer);
                self.claim_notice = Some((intent.customer, *epoch));
                (Task::Checkout { intent: intent.clone(), epoch: *epoch }, service)
            }
            Payload::AssistRequest { customer, epoch, .. } => {
                self.assigned_customer = Some(*customer);
                self.claim_notice = Some((*customer, *epoch));
                (Task::Assist { customer: *customer, epoch: *epoch }, service)
            }
            Payload::RestockRequest { item, quantity } => {
                self.assigned_customer = None;
                self.claim_notice = None;
                let delay = ctx.params.restock_delay_ticks.max(1);
                (Task::Restock { item: *item, quantity: *quantity }, delay)
            }
            _ => return false,
        };
        debug!(employee = %self.id, role = %self.role, ?task, remaining, "claimed");
        self.state = EmployeeState::Serving { task, remaining: remaining.max(1) };
        true
    }

    fn complete(&mut self, task: Task) -> Vec<Envelope> {
        let quality = self.profile().quality;
        self.rating += RATING_DRIFT * (quality * 10.0 - self.rating);
        self.assigned_customer = None;
        match task {
            Task::Checkout { intent, epoch } => {
                self.customers_served += 1;
                vec![Envelope::new(
                    self.id,
                    Address::LEDGER,
                    Payload::CommitPurchase { employee: self.id, intent, epoch },
                )]
            }
            Task::Assist { customer, epoch } => {
                self.customers_served += 1;
                vec![Envelope::new(
                    self.id,
                    customer,
                    Payload::AssistServiced { epoch, employee: self.id, quality },
                )]
            }
            Task::Restock { item, quantity } => {
                self.restocks_handled += 1;
                vec![Envelope::new(
                    self.id,
                    Address::LEDGER,
                    Payload::CommitRestock { employee: self.id, item, quantity },
                )]
            }
        }
    }
}

impl Behavior for Employee {
    fn actor_id(&self) -> ActorId {
        ActorId::Employee(self.id)
    }

    fn tick(&mut self, _ctx: &TickContext<'_>) -> Vec<Envelope> {
        let mut out: Vec<Envelope> = self
            .claim_notice
            .take()
            .map(|(customer, epoch)| {
                Envelope::new(self.id, customer, Payload::RequestClaimed { epoch, employee: self.id })
            })
            .into_iter()
            .collect();

        let EmployeeState::Serving { remaining, .. } = &mut self.state else {
            return out;
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining > 0 {
            return out;
        }
        if let EmployeeState::Serving { task, .. } =
            std::mem::replace(&mut self.state, EmployeeState::Idle)
        {
            out.extend(self.complete(task));
        }
        out
    }
}
