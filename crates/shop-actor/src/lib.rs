//! `shop-actor` — the three actor kinds and their shared capability trait.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`context`]  | `TickContext<'a>`, `CatalogEntry`: read-only tick snapshot    |
//! | [`model`]    | `Behavior` trait (`tick` / `receive`)                         |
//! | [`customer`] | `Customer`, `CustomerState`, `CustomerProfile`, `VisitTally`  |
//! | [`employee`] | `Employee`, `EmployeeState`, `Task`                           |
//! | [`item`]     | `InventoryItem` with price drift and restock trigger          |
//! | [`actor`]    | `ActorMut`: tag dispatch used by the scheduler               |
//!
//! # Design notes
//!
//! Actors own their state and their RNG but nothing else.  They read the
//! world through `&TickContext` and affect it only by returning envelopes.
//! The ledger is the single writer of stock and money; an item's stock field
//! is a view refreshed by `InventoryUpdate` messages.

pub mod actor;
pub mod context;
pub mod customer;
pub mod employee;
pub mod item;
pub mod model;


pub use actor::ActorMut;
pub use context::{CatalogEntry, TickContext};
pub use customer::{Customer, CustomerProfile, CustomerState, VisitTally};
pub use employee::{Employee, EmployeeState, Task};
pub use item::InventoryItem;
pub use model::Behavior;
