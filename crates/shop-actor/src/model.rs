//! The `Behavior` trait shared by every actor kind.

use shop_bus::{Envelope, Message};
use shop_core::ActorId;

use crate::TickContext;

/// An independently stateful participant driven by the scheduler.
///
/// Actors never touch one another or the ledger.  Everything they want to
/// happen elsewhere is returned as [`Envelope`]s, which the scheduler
/// publishes on the bus after the activation phase.
///
/// Implementations must be `Send` so the activation phase can run on a
/// thread pool; each actor owns its own RNG, so results do not depend on
/// which thread runs it.
pub trait Behavior: Send {
    fn actor_id(&self) -> ActorId;

    /// Called once per tick, in registration order.
    fn tick(&mut self, ctx: &TickContext<'_>) -> Vec<Envelope>;

    /// Called for every drained message addressed to this actor.
    ///
    /// Default: the message is ignored.
    fn receive(&mut self, _message: &Message, _ctx: &TickContext<'_>) -> Vec<Envelope> {
        vec![]
    }
}
