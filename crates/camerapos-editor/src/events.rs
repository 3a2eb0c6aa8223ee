//! Level lifecycle notifications from the host editor
//!
//! The host owns a [`LevelEvents`] bus and emits an event whenever a level is
//! opened, saved or about to close. Listeners get a [`Subscription`] back;
//! dropping it (or calling [`Subscription::unsubscribe`]) removes the listener.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::warn;

use camerapos_core::LevelKey;

/// Level lifecycle notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelEvent {
    /// A level finished loading in the editor
    Opened { path: String },
    /// A level was written to disk
    Saved { path: String },
    /// A level is about to be closed or replaced
    Closing { path: String },
}

impl LevelEvent {
    pub fn opened(path: impl Into<String>) -> Self {
        Self::Opened { path: path.into() }
    }

    pub fn saved(path: impl Into<String>) -> Self {
        Self::Saved { path: path.into() }
    }

    pub fn closing(path: impl Into<String>) -> Self {
        Self::Closing { path: path.into() }
    }

    /// Persisted path of the level, empty for an untitled level
    pub fn path(&self) -> &str {
        match self {
            Self::Opened { path } | Self::Saved { path } | Self::Closing { path } => path,
        }
    }

    pub fn level_key(&self) -> Option<LevelKey> {
        LevelKey::from_level_path(self.path())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Opened { .. } => "opened",
            Self::Saved { .. } => "saved",
            Self::Closing { .. } => "closing",
        }
    }
}

type Handler = Rc<RefCell<dyn FnMut(&LevelEvent)>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

impl Registry {
    fn contains(&self, id: u64) -> bool {
        self.handlers.iter().any(|(i, _)| *i == id)
    }
}

/// Host-side level notification bus
///
/// Cloning gives another handle to the same bus.
#[derive(Clone, Default)]
pub struct LevelEvents {
    registry: Rc<RefCell<Registry>>,
}

impl LevelEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every level event
    pub fn subscribe(&self, handler: impl FnMut(&LevelEvent) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        let handler: Handler = Rc::new(RefCell::new(handler));
        registry.handlers.push((id, handler));

        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver `event` to every listener, returning how many received it
    ///
    /// Listeners may subscribe or unsubscribe while the event is delivered. A
    /// listener removed during delivery does not receive the event; one added
    /// during delivery receives only later events.
    pub fn emit(&self, event: &LevelEvent) -> usize {
        let handlers: Vec<(u64, Handler)> = self.registry.borrow().handlers.clone();
        let mut delivered = 0;

        for (id, handler) in handlers {
            if !self.registry.borrow().contains(id) {
                continue;
            }
            let Ok(mut handler) = handler.try_borrow_mut() else {
                warn!(event = event.name(), "Skipping re-entrant level event delivery");
                continue;
            };
            (&mut *handler)(event);
            delivered += 1;
        }

        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }
}

impl std::fmt::Debug for LevelEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelEvents")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle to a registered listener; the listener is removed when this drops
#[must_use = "dropping a Subscription removes the listener"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Remove the listener now
    pub fn unsubscribe(self) {}

    /// Whether the listener is still registered on a live bus
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map_or(false, |r| r.borrow().contains(self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .handlers
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_key() {
        let event = LevelEvent::opened("/Game/Maps/Foo");
        assert_eq!(event.level_key().unwrap().as_str(), "/Game/Maps/Foo");
        assert!(LevelEvent::saved("").level_key().is_none());
        assert_eq!(LevelEvent::closing("x").name(), "closing");
    }

    #[test]
    fn test_subscribe_and_emit() {
        let events = LevelEvents::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        let subscription = events.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        assert_eq!(events.subscriber_count(), 1);
        assert!(subscription.is_active());

        assert_eq!(events.emit(&LevelEvent::opened("/Game/Maps/Foo")), 1);
        assert_eq!(events.emit(&LevelEvent::saved("/Game/Maps/Foo")), 1);
        assert_eq!(
            *seen.borrow(),
            vec![LevelEvent::opened("/Game/Maps/Foo"), LevelEvent::saved("/Game/Maps/Foo")]
        );

        subscription.unsubscribe();
        assert_eq!(events.subscriber_count(), 0);
        assert_eq!(events.emit(&LevelEvent::closing("/Game/Maps/Foo")), 0);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let events = LevelEvents::new();
        {
            let _subscription = events.subscribe(|_| {});
            assert_eq!(events.subscriber_count(), 1);
        }
        assert_eq!(events.subscriber_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_bus() {
        let events = LevelEvents::new();
        let subscription = events.subscribe(|_| {});
        drop(events);
        assert!(!subscription.is_active());
        drop(subscription);
    }

    #[test]
    fn test_unsubscribe_during_delivery() {
        let events = LevelEvents::new();
        let count = Rc::new(RefCell::new(0));
        let second: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        // First listener removes the second one when it sees an event
        let slot = second.clone();
        let _first = events.subscribe(move |_| {
            slot.borrow_mut().take();
        });

        let counter = count.clone();
        *second.borrow_mut() = Some(events.subscribe(move |_| *counter.borrow_mut() += 1));

        assert_eq!(events.emit(&LevelEvent::opened("/Game/Maps/Foo")), 1);
        assert_eq!(*count.borrow(), 0);
        assert_eq!(events.subscriber_count(), 1);
    }

    #[test]
    fn test_clones_share_bus() {
        let events = LevelEvents::new();
        let host_side = events.clone();
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        let _subscription = events.subscribe(move |_| *counter.borrow_mut() += 1);

        host_side.emit(&LevelEvent::saved("/Game/Maps/Foo"));
        assert_eq!(*count.borrow(), 1);
    }
}
