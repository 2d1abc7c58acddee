//! Global key-press stream.
//!
//! [`KeyboardTarget`] is the host's `document.addEventListener("keydown", ..)`.
//! [`EventBus`] is the in-memory implementation: [`EventBus::dispatch`] runs
//! every listener synchronously, in registration order, before returning.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// One key press, identified like `KeyboardEvent.key` (`"Escape"`, `"a"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type KeyListener = Box<dyn FnMut(&KeyEvent)>;

pub trait KeyboardTarget {
    fn add_key_listener(&self, listener: KeyListener) -> ListenerId;

    /// Returns `false` if the listener was already removed.
    fn remove_key_listener(&self, id: ListenerId) -> bool;
}

/// Removes its listener when dropped.
pub struct KeyListenerGuard {
    target: Rc<dyn KeyboardTarget>,
    id: ListenerId,
}

impl KeyListenerGuard {
    pub fn register(target: Rc<dyn KeyboardTarget>, listener: KeyListener) -> Self {
        let id = target.add_key_listener(listener);
        Self { target, id }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for KeyListenerGuard {
    fn drop(&mut self) {
        self.target.remove_key_listener(self.id);
    }
}

impl fmt::Debug for KeyListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyListenerGuard")
            .field("id", &self.id)
            .finish()
    }
}

type SharedListener = Rc<RefCell<KeyListener>>;

#[derive(Default)]
struct BusState {
    next_id: u64,
    listeners: Vec<(ListenerId, SharedListener)>,
}

/// In-memory [`KeyboardTarget`].
#[derive(Default)]
pub struct EventBus {
    state: RefCell<BusState>,
}

impl EventBus {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Deliver `event` to every listener registered when dispatch starts.
    ///
    /// Listeners may add or remove listeners; changes apply to the next event.
    /// Returns how many listeners ran.
    pub fn dispatch(&self, event: &KeyEvent) -> usize {
        let listeners: Vec<SharedListener> = self
            .state
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in &listeners {
            (&mut *listener.borrow_mut())(event);
        }
        listeners.len()
    }
}

impl KeyboardTarget for EventBus {
    fn add_key_listener(&self, listener: KeyListener) -> ListenerId {
        let mut state = self.state.borrow_mut();
        let id = ListenerId(state.next_id);
        state.next_id += 1;
        state
            .listeners
            .push((id, Rc::new(RefCell::new(listener))));
        id
    }

    fn remove_key_listener(&self, id: ListenerId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|(lid, _)| *lid != id);
        state.listeners.len() != before
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(bus: &EventBus, name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> ListenerId {
        let log = log.clone();
        bus.add_key_listener(Box::new(move |e: &KeyEvent| {
            log.borrow_mut().push(format!("{name}:{}", e.key));
        }))
    }

    #[test]
    fn dispatch_runs_listeners_in_order() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        recorder(&bus, "a", &log);
        recorder(&bus, "b", &log);

        assert_eq!(bus.dispatch(&KeyEvent::new("Escape")), 2);
        assert_eq!(*log.borrow(), vec!["a:Escape", "b:Escape"]);
    }

    #[test]
    fn removed_listener_stops_receiving() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = recorder(&bus, "a", &log);
        recorder(&bus, "b", &log);

        assert!(bus.remove_key_listener(a));
        assert!(!bus.remove_key_listener(a));
        bus.dispatch(&KeyEvent::new("x"));
        assert_eq!(*log.borrow(), vec!["b:x"]);
    }

    #[test]
    fn guard_removes_listener_on_drop() {
        let bus = EventBus::new();
        {
            let _guard = KeyListenerGuard::register(bus.clone(), Box::new(|_: &KeyEvent| {}));
            assert_eq!(bus.listener_count(), 1);
        }
        assert_eq!(bus.listener_count(), 0);
        assert_eq!(bus.dispatch(&KeyEvent::new("Escape")), 0);
    }

    #[test]
    fn listener_may_register_during_dispatch() {
        let bus = EventBus::new();
        let inner_bus = bus.clone();
        bus.add_key_listener(Box::new(move |_: &KeyEvent| {
            inner_bus.add_key_listener(Box::new(|_: &KeyEvent| {}));
        }));
        assert_eq!(bus.dispatch(&KeyEvent::new("a")), 1);
        assert_eq!(bus.listener_count(), 2);
    }
}
