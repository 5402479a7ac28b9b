//! `shop-core` — foundational types for the `shopsim` retail simulation.
//!
//! This crate is a dependency of every other `shop-*` crate.  It has no
//! `shop-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                       |
//! |------------|----------------------------------------------------------------|
//! | [`ids`]    | `CustomerId`, `EmployeeId`, `ItemId`, `TransactionId`, `ActorId` |
//! | [`money`]  | `Money` (integer cents), discount arithmetic                  |
//! | [`time`]   | `Tick`, `SimClock`, `SimConfig`                                |
//! | [`params`] | `StoreParams` business tuning knobs                            |
//! | [`domain`] | `Category`, `CustomerType`, `EmployeeRole`, `RoleProfile`      |
//! | [`trade`]  | `PurchaseIntent`, `LineRequest`, `RejectReason`                |
//! | [`rng`]    | `ActorRng` (per-actor), `SimRng` (global)                      |
//! | [`error`]  | `ShopError`, `ShopResult`                                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public data types.   |
//! |         | Required by checkpoints and JSON config files.             |

pub mod domain;
pub mod error;
pub mod ids;
pub mod money;
pub mod params;
pub mod rng;
pub mod time;
pub mod trade;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use domain::{Category, CustomerType, EmployeeRole, RoleProfile};
pub use error::{ShopError, ShopResult};
pub use ids::{ActorId, CustomerId, EmployeeId, ItemId, TransactionId};
pub use money::Money;
pub use params::StoreParams;
pub use rng::{ActorRng, SimRng};
pub use time::{SimClock, SimConfig, Tick};
pub use trade::{LineRequest, PurchaseIntent, RejectReason};
