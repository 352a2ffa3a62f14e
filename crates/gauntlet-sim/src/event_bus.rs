//! Synchronous publish/subscribe channel for lifecycle notifications.
//!
//! Delivery happens inside `publish`, in subscription order, within the same
//! frame. Handlers get a shared reference to the event and cannot reach the
//! bus, so a handler can never publish re-entrantly. Every published event is
//! also appended to a per-frame journal that ends up in the snapshot.

use tracing::trace;

use gauntlet_core::events::GameEvent;

/// How long a subscription lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Dropped by [`EventBus::teardown_round`].
    Round,
    /// Lives until explicitly unsubscribed.
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&GameEvent)>;

struct Subscriber {
    id: SubscriptionId,
    scope: Scope,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
    journal: Vec<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        scope: Scope,
        handler: impl FnMut(&GameEvent) + 'static,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber {
            id,
            scope,
            handler: Box::new(handler),
        });
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Deliver to every subscriber, then record in the journal.
    pub fn publish(&mut self, event: GameEvent) {
        trace!(event = event.name(), "publish");
        for subscriber in &mut self.subscribers {
            (subscriber.handler)(&event);
        }
        self.journal.push(event);
    }

    /// Drop every round-scoped subscription. Returns how many were removed.
    pub fn teardown_round(&mut self) -> usize {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.scope == Scope::Session);
        before - self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Events published since the journal was last drained.
    pub fn journal(&self) -> &[GameEvent] {
        &self.journal
    }

    pub fn drain_journal(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.journal)
    }
}
