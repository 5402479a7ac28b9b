//! `shop-bus` — the inter-actor message system.
//!
//! Actors never hold references to one another.  They return [`Envelope`]s
//! from their `tick`/`receive` calls; the scheduler publishes them on the
//! [`MessageBus`], drains the bus once per tick in `(priority, seq)` order,
//! and either delivers each [`Message`] to its target or parks it in the
//! employee [`Backlog`].
//!
//! # Modules
//!
//! | Module      | Contents                                                |
//! |-------------|---------------------------------------------------------|
//! | [`address`] | `Address`, `Topic`                                      |
//! | [`message`] | `Payload`, `MessageKind`, `Priority`, `Envelope`, `Message` |
//! | [`bus`]     | `MessageBus`, `BusStats`                                |
//! | [`backlog`] | `Backlog` with rank-based claiming                      |

pub mod address;
pub mod backlog;
pub mod bus;
pub mod message;

#[cfg(test)]
mod tests;

pub use address::{Address, Topic};
pub use backlog::Backlog;
pub use bus::{BusStats, MessageBus};
pub use message::{Envelope, Message, MessageKind, Payload, Priority, VisitOutcome};
