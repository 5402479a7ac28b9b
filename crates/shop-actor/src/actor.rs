//! Tag dispatch over the three actor kinds.

use shop_bus::{Envelope, Message};
use shop_core::ActorId;

use crate::{Behavior, Customer, Employee, InventoryItem, TickContext};

/// A mutable borrow of one actor, resolved by the scheduler from an
/// [`ActorId`].  Dispatch is a `match` on the tag; there is no trait object.
pub enum ActorMut<'a> {
    Customer(&'a mut Customer),
    Employee(&'a mut Employee),
    Item(&'a mut InventoryItem),
}

impl ActorMut<'_> {
    pub fn id(&self) -> ActorId {
        match self {
            ActorMut::Customer(c) => c.actor_id(),
            ActorMut::Employee(e) => e.actor_id(),
            ActorMut::Item(i)     => i.actor_id(),
        }
    }

    pub fn tick(self, ctx: &TickContext<'_>) -> Vec<Envelope> {
        match self {
            ActorMut::Customer(c) => c.tick(ctx),
            ActorMut::Employee(e) => e.tick(ctx),
            ActorMut::Item(i)     => i.tick(ctx),
        }
    }

    pub fn receive(self, message: &Message, ctx: &TickContext<'_>) -> Vec<Envelope> {
        match self {
            ActorMut::Customer(c) => c.receive(message, ctx),
            ActorMut::Employee(e) => e.receive(message, ctx),
            ActorMut::Item(i)     => i.receive(message, ctx),
        }
    }
}
