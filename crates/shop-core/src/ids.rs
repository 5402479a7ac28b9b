//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Ordering matters: the scheduler
//! activates actors and resolves employee claims in ascending id order, so a
//! derived `Ord` is part of the determinism contract.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// A shopper.  Ids are never reused, even after the customer leaves.
    pub struct CustomerId(u32);
}

typed_id! {
    /// A staff member.  Employees persist for the whole run.
    pub struct EmployeeId(u32);
}

typed_id! {
    /// A catalog title.  Doubles as the index into the ledger's stock table.
    pub struct ItemId(u32);
}

typed_id! {
    /// Position of a committed sale in the ledger's append-only log.
    pub struct TransactionId(u64);
}

// ── ActorId ───────────────────────────────────────────────────────────────────

/// Any addressable participant on the message bus.
///
/// The ledger is not an actor in the state-machine sense, but it receives
/// commit requests and sends replies, so it is addressable like one.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorId {
    Customer(CustomerId),
    Employee(EmployeeId),
    Item(ItemId),
    Ledger,
}

impl ActorId {
    /// Stable 64-bit key used for RNG seed mixing: kind tag in the high
    /// 32 bits, the raw id in the low 32.
    pub fn key(self) -> u64 {
        match self {
            ActorId::Customer(id) => (1u64 << 32) | id.0 as u64,
            ActorId::Employee(id) => (2u64 << 32) | id.0 as u64,
            ActorId::Item(id)     => (3u64 << 32) | id.0 as u64,
            ActorId::Ledger       => 4u64 << 32,
        }
    }
}

impl From<CustomerId> for ActorId {
    fn from(id: CustomerId) -> Self {
        ActorId::Customer(id)
    }
}

impl From<EmployeeId> for ActorId {
    fn from(id: EmployeeId) -> Self {
        ActorId::Employee(id)
    }
}

impl From<ItemId> for ActorId {
    fn from(id: ItemId) -> Self {
        ActorId::Item(id)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorId::Customer(id) => id.fmt(f),
            ActorId::Employee(id) => id.fmt(f),
            ActorId::Item(id)     => id.fmt(f),
            ActorId::Ledger       => f.write_str("Ledger"),
        }
    }
}
