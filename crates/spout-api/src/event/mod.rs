//! Event types and per-event listener lists.
//!
//! Each event type owns a static [`HandlerList`]. Calling an event runs its
//! listeners in [`Order`]; anything beyond that (filtering, async delivery,
//! plugin ownership) belongs to the host's event manager.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::trace;

mod storage;

pub use storage::PlayerSaveEvent;

/// When a listener runs relative to the others on the same event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Order {
    Earliest,
    Early,
    Default,
    Late,
    Latest,
    /// Observes the final state; should not modify the event.
    Monitor,
}

/// Handle returned by [`HandlerList::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Arc<dyn Fn(&mut E) + Send + Sync>;

struct Registered<E> {
    id: ListenerId,
    order: Order,
    listener: Listener<E>,
}

/// Listeners registered for one event type.
pub struct HandlerList<E> {
    listeners: RwLock<Vec<Registered<E>>>,
    next_id: AtomicU64,
}

impl<E> Default for HandlerList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for HandlerList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerList")
            .field("listeners", &self.len())
            .finish()
    }
}

impl<E> HandlerList<E> {
    pub const fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Add a listener. Listeners with the same order run in registration order.
    pub fn register<F>(&self, order: Order, listener: F) -> ListenerId
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        let at = listeners.partition_point(|r| r.order <= order);
        listeners.insert(
            at,
            Registered {
                id,
                order,
                listener: Arc::new(listener),
            },
        );
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|r| r.id != id);
        listeners.len() != before
    }

    pub fn clear(&self) {
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every listener on `event`.
    ///
    /// The list is snapshotted first, so listeners may register or unregister
    /// others without deadlocking; changes apply to the next call.
    pub fn call(&self, event: &mut E) {
        let snapshot: Vec<Listener<E>> = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|r| Arc::clone(&r.listener))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }
}

/// An event plugins can listen to.
pub trait Event: Sized + Send + 'static {
    /// The listener list shared by every instance of this event type.
    fn handlers() -> &'static HandlerList<Self>;

    fn event_name(&self) -> &'static str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("Event")
    }
}

/// Run every listener for `event` and hand it back.
pub fn call<E: Event>(mut event: E) -> E {
    trace!("Calling {}", event.event_name());
    E::handlers().call(&mut event);
    event
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Trace {
        steps: Vec<&'static str>,
    }

    impl Event for Trace {
        fn handlers() -> &'static HandlerList<Self> {
            static HANDLERS: HandlerList<Trace> = HandlerList::new();
            &HANDLERS
        }
    }

    #[test]
    fn listeners_run_by_order_then_registration() {
        let list: HandlerList<Trace> = HandlerList::new();
        list.register(Order::Monitor, |t| t.steps.push("monitor"));
        list.register(Order::Default, |t| t.steps.push("default-1"));
        list.register(Order::Earliest, |t| t.steps.push("earliest"));
        list.register(Order::Default, |t| t.steps.push("default-2"));
        list.register(Order::Late, |t| t.steps.push("late"));

        let mut trace = Trace::default();
        list.call(&mut trace);
        assert_eq!(
            trace.steps,
            vec!["earliest", "default-1", "default-2", "late", "monitor"]
        );
    }

    #[test]
    fn unregister_removes_listener() {
        let list: HandlerList<Trace> = HandlerList::new();
        let a = list.register(Order::Default, |t| t.steps.push("a"));
        list.register(Order::Default, |t| t.steps.push("b"));
        assert_eq!(list.len(), 2);

        assert!(list.unregister(a));
        assert!(!list.unregister(a));

        let mut trace = Trace::default();
        list.call(&mut trace);
        assert_eq!(trace.steps, vec!["b"]);

        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn listener_may_register_during_call() {
        let list: Arc<HandlerList<Trace>> = Arc::new(HandlerList::new());
        let inner = Arc::clone(&list);
        list.register(Order::Default, move |t| {
            t.steps.push("outer");
            inner.register(Order::Default, |t| t.steps.push("added"));
        });

        let mut trace = Trace::default();
        list.call(&mut trace);
        assert_eq!(trace.steps, vec!["outer"]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn static_handlers_via_call() {
        let seen = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&seen);
        let id = Trace::handlers().register(Order::Default, move |t| {
            t.steps.push("static");
            *counter.lock().unwrap() += 1;
        });

        let trace = call(Trace::default());
        assert!(trace.steps.contains(&"static"));
        assert_eq!(*seen.lock().unwrap(), 1);
        assert!(Trace::handlers().unregister(id));
    }

    #[test]
    fn event_name_is_type_name() {
        assert_eq!(Trace::default().event_name(), "Trace");
    }
}
