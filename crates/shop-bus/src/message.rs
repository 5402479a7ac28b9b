//! Message types: the only way actors express intent to one another.

use shop_core::{
    ActorId, Category, CustomerId, EmployeeId, ItemId, Money, PurchaseIntent, RejectReason, Tick,
    TransactionId,
};

use crate::Address;

// ── Priority ──────────────────────────────────────────────────────────────────

/// Delivery priority.  Lower values are drained first.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Priority(pub u8);

impl Priority {
    /// Stock-outs.
    pub const URGENT: Priority = Priority(0);
    /// Help requests, low-stock restocks, ledger replies.
    pub const HIGH: Priority = Priority(1);
    /// Purchases and commits.
    pub const NORMAL: Priority = Priority(2);
    /// View refreshes, price changes, visit reports.
    pub const LOW: Priority = Priority(3);
}

// ── VisitOutcome ──────────────────────────────────────────────────────────────

/// How a customer's visit ended.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VisitOutcome {
    Purchased,
    Rejected,
    Helped,
    Abandoned,
}

// ── Payload ───────────────────────────────────────────────────────────────────

/// The body of a message.
///
/// `epoch` fields identify which of a customer's requests a message belongs
/// to; a customer ignores replies whose epoch is not the one it is waiting on.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payload {
    /// Customer → employees: ring up this basket.
    PurchaseRequest { intent: PurchaseIntent, epoch: u32 },

    /// Customer → employees: I need help finding something.
    AssistRequest { customer: CustomerId, epoch: u32, categories: Vec<Category> },

    /// Item → employees: replenish me.
    RestockRequest { item: ItemId, quantity: u32 },

    /// Employee → ledger: commit this checked-out basket.
    CommitPurchase { employee: EmployeeId, intent: PurchaseIntent, epoch: u32 },

    /// Employee → ledger: the delivery has arrived.
    CommitRestock { employee: EmployeeId, item: ItemId, quantity: u32 },

    /// Item → ledger: my drifted price.
    PriceChange { item: ItemId, price: Money },

    /// Ledger → customer.
    PurchaseConfirmed {
        epoch:       u32,
        transaction: TransactionId,
        total:       Money,
        /// Everything the ledger has recorded against this customer so far.
        spent:       Money,
    },

    /// Ledger → customer.
    PurchaseRejected { epoch: u32, reason: RejectReason },

    /// Employee → customer: your request has been picked up.
    RequestClaimed { epoch: u32, employee: EmployeeId },

    /// Employee → customer.
    AssistServiced { epoch: u32, employee: EmployeeId, quality: f64 },

    /// Ledger → item: refreshed authoritative view.
    InventoryUpdate {
        item:            ItemId,
        stock:           u32,
        price:           Money,
        units_sold:      u64,
        units_restocked: u64,
        restock_pending: bool,
    },

    /// Customer → metrics topic: a visit finished.
    SatisfactionReport { customer: CustomerId, outcome: VisitOutcome, score: f64 },
}

/// Discriminant of [`Payload`], for logging and statistics.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageKind {
    PurchaseRequest,
    AssistRequest,
    RestockRequest,
    CommitPurchase,
    CommitRestock,
    PriceChange,
    PurchaseConfirmed,
    PurchaseRejected,
    RequestClaimed,
    AssistServiced,
    InventoryUpdate,
    SatisfactionReport,
}

impl Payload {
    pub fn kind(&self) -> MessageKind {
        match self {
            Payload::PurchaseRequest { .. }    => MessageKind::PurchaseRequest,
            Payload::AssistRequest { .. }      => MessageKind::AssistRequest,
            Payload::RestockRequest { .. }     => MessageKind::RestockRequest,
            Payload::CommitPurchase { .. }     => MessageKind::CommitPurchase,
            Payload::CommitRestock { .. }      => MessageKind::CommitRestock,
            Payload::PriceChange { .. }        => MessageKind::PriceChange,
            Payload::PurchaseConfirmed { .. }  => MessageKind::PurchaseConfirmed,
            Payload::PurchaseRejected { .. }   => MessageKind::PurchaseRejected,
            Payload::RequestClaimed { .. }     => MessageKind::RequestClaimed,
            Payload::AssistServiced { .. }     => MessageKind::AssistServiced,
            Payload::InventoryUpdate { .. }    => MessageKind::InventoryUpdate,
            Payload::SatisfactionReport { .. } => MessageKind::SatisfactionReport,
        }
    }

    /// Priority used when the sender does not pick one explicitly.
    ///
    /// Help requests outrank purchases so an idle employee drains the help
    /// queue first.
    pub fn default_priority(&self) -> Priority {
        match self {
            Payload::AssistRequest { .. }
            | Payload::PurchaseConfirmed { .. }
            | Payload::PurchaseRejected { .. }
            | Payload::RequestClaimed { .. }
            | Payload::AssistServiced { .. } => Priority::HIGH,

            Payload::RestockRequest { .. } => Priority::HIGH,

            Payload::PurchaseRequest { .. }
            | Payload::CommitPurchase { .. }
            | Payload::CommitRestock { .. } => Priority::NORMAL,

            Payload::PriceChange { .. }
            | Payload::InventoryUpdate { .. }
            | Payload::SatisfactionReport { .. } => Priority::LOW,
        }
    }

    /// The customer a customer-facing request belongs to, if any.
    pub fn requesting_customer(&self) -> Option<(CustomerId, u32)> {
        match self {
            Payload::PurchaseRequest { intent, epoch } => Some((intent.customer, *epoch)),
            Payload::AssistRequest { customer, epoch, .. } => Some((*customer, *epoch)),
            _ => None,
        }
    }
}

// ── Envelope / Message ────────────────────────────────────────────────────────

/// A message an actor wants sent.  The bus stamps it with a sequence number
/// and creation tick on publish, producing an immutable [`Message`].
#[derive(Clone, PartialEq, Debug)]
pub struct Envelope {
    pub sender:   ActorId,
    pub target:   Address,
    pub priority: Priority,
    pub payload:  Payload,
}

impl Envelope {
    /// Build an envelope at the payload's default priority.
    pub fn new(sender: impl Into<ActorId>, target: impl Into<Address>, payload: Payload) -> Self {
        Self {
            sender:   sender.into(),
            target:   target.into(),
            priority: payload.default_priority(),
            payload,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// A published, immutable message.
///
/// Fields are private; a message cannot change after it is enqueued.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    seq:      u64,
    sender:   ActorId,
    target:   Address,
    priority: Priority,
    created:  Tick,
    payload:  Payload,
}

impl Message {
    pub(crate) fn stamp(envelope: Envelope, seq: u64, created: Tick) -> Self {
        Self {
            seq,
            sender:   envelope.sender,
            target:   envelope.target,
            priority: envelope.priority,
            created,
            payload:  envelope.payload,
        }
    }

    /// Enqueue sequence number; unique and increasing per bus.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    #[inline]
    pub fn sender(&self) -> ActorId {
        self.sender
    }

    #[inline]
    pub fn target(&self) -> Address {
        self.target
    }

    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Tick the message was published.
    #[inline]
    pub fn created(&self) -> Tick {
        self.created
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[inline]
    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    /// Ordering key: priority ascending, then enqueue order.
    #[inline]
    pub fn order_key(&self) -> (Priority, u64) {
        (self.priority, self.seq)
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }
}
