//! Publish/subscribe bus owned by a game session.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tracing::trace;
use uuid::Uuid;

use super::GameEvent;

/// Identifier of a bus subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

type Handler = Arc<dyn Fn(&GameEvent) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    subscribers: Mutex<Vec<(SubscriptionId, Handler)>>,
}

/// Session-scoped event bus.
///
/// Cloning yields another handle to the same bus. Handlers run synchronously
/// on the publishing call site, outside the subscriber lock, so a handler may
/// itself publish or (un)subscribe.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create a new bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. It stays registered until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&GameEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.inner.subscribers.lock().push((id, Arc::new(handler)));
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Remove a handler by id. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        remove_subscriber(&self.inner, id)
    }

    /// Deliver an event to every current subscriber.
    pub fn publish(&self, event: GameEvent) {
        let handlers: Vec<Handler> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        trace!(event = event.name(), subscribers = handlers.len(), "publish");

        for handler in handlers {
            handler(&event);
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn remove_subscriber(inner: &BusInner, id: SubscriptionId) -> bool {
    let mut subscribers = inner.subscribers.lock();
    let before = subscribers.len();
    subscribers.retain(|(sub_id, _)| *sub_id != id);
    subscribers.len() != before
}

/// Guard tying a handler's lifetime to its owner. Unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            remove_subscriber(&inner, self.id);
        }
    }
}

/// Records every event published on a bus, in order.
///
/// Useful for UI replay panels and for assertions in tests.
#[derive(Debug)]
pub struct EventLog {
    events: Arc<Mutex<Vec<GameEvent>>>,
    _subscription: Subscription,
}

impl EventLog {
    /// Start recording events from `bus`.
    pub fn attach(bus: &EventBus) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let subscription = bus.subscribe(move |event| sink.lock().push(event.clone()));
        Self {
            events,
            _subscription: subscription,
        }
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<GameEvent> {
        self.events.lock().clone()
    }

    /// Count recorded events matching a predicate.
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&GameEvent) -> bool,
    {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }

    /// Count recorded events with the given kind name.
    pub fn count_named(&self, name: &str) -> usize {
        self.count(|e| e.name() == name)
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Forget recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// One JSON object per line, in publish order.
    pub fn to_json_lines(&self) -> serde_json::Result<String> {
        let events = self.events.lock();
        let mut out = String::new();
        for event in events.iter() {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_reaches_subscribers() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(GameEvent::PlayerDied);
        bus.publish(GameEvent::ExperimentRevealed);

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(GameEvent::GamePaused);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let sub = bus.subscribe(|_| {});
        assert_eq!(bus.subscriber_count(), 1);

        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_explicit_unsubscribe() {
        let bus = EventBus::new();
        let sub = bus.subscribe(|_| {});

        assert!(bus.unsubscribe(sub.id()));
        assert!(!bus.unsubscribe(sub.id()));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_bus() {
        let bus = EventBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);
        drop(sub);
    }

    #[test]
    fn test_handler_may_publish() {
        let bus = EventBus::new();
        let log = EventLog::attach(&bus);
        let relay = bus.clone();
        let _sub = bus.subscribe(move |event| {
            if matches!(event, GameEvent::ExperimentRevealed) {
                relay.publish(GameEvent::ChoiceSystemEnabled);
            }
        });

        bus.publish(GameEvent::ExperimentRevealed);

        assert_eq!(
            log.events(),
            vec![GameEvent::ExperimentRevealed, GameEvent::ChoiceSystemEnabled]
        );
    }

    #[test]
    fn test_event_log_json_lines() {
        let bus = EventBus::new();
        let log = EventLog::attach(&bus);
        bus.publish(GameEvent::NarrativeStageChanged { stage: 1 });
        bus.publish(GameEvent::PlayerDied);

        let text = log.to_json_lines().unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("player_died"));
    }
}
