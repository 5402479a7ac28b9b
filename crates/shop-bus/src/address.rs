//! Message addressing: a concrete actor or a topic.

use std::fmt;

use shop_core::{ActorId, CustomerId, EmployeeId, EmployeeRole, ItemId};

/// A broadcast destination resolved by the scheduler rather than by id.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topic {
    /// Work any suitably skilled employee may claim.
    AnyEmployee,
    /// Work only employees of this role may claim.
    Role(EmployeeRole),
    /// Visit reports collected by the scheduler.
    Metrics,
}

/// Where a message is going.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Address {
    Actor(ActorId),
    Topic(Topic),
}

impl Address {
    pub const LEDGER: Address = Address::Actor(ActorId::Ledger);
    pub const ANY_EMPLOYEE: Address = Address::Topic(Topic::AnyEmployee);
    pub const METRICS: Address = Address::Topic(Topic::Metrics);

    /// `true` if this address lands in the employee backlog.
    pub fn is_work_topic(self) -> bool {
        matches!(self, Address::Topic(Topic::AnyEmployee | Topic::Role(_)))
    }
}

macro_rules! address_from_id {
    ($($id:ty),*) => {
        $(
            impl From<$id> for Address {
                fn from(id: $id) -> Self {
                    Address::Actor(id.into())
                }
            }
        )*
    };
}

address_from_id!(ActorId, CustomerId, EmployeeId, ItemId);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Actor(id)                => id.fmt(f),
            Address::Topic(Topic::AnyEmployee) => f.write_str("topic:any-employee"),
            Address::Topic(Topic::Role(role))  => write!(f, "topic:{role}"),
            Address::Topic(Topic::Metrics)     => f.write_str("topic:metrics"),
        }
    }
}
