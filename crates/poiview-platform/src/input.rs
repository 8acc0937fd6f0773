//! Input Handling
//!
//! Pointer events and the listener registry a viewport dispatches them through.
//!
//! Listeners are registered with a [`ListenerScope`]: surface-scoped listeners
//! only hear events that land on the render surface, global listeners hear
//! every event the host forwards. Each registration is returned as a
//! [`ListenerRegistration`] guard that unregisters when removed or dropped.

use std::sync::{Arc, Weak};

use ahash::AHashMap;
use bitflags::bitflags;
use glam::Vec2;
use parking_lot::Mutex;

/// Pointer buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Pointer events in viewport-local pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Button pressed
    Down { position: Vec2, button: PointerButton },
    /// Pointer moved
    Move { position: Vec2 },
    /// Button released
    Up { position: Vec2, button: PointerButton },
    /// Wheel scrolled; positive `delta_y` scrolls away from the user
    Wheel { position: Vec2, delta_x: f32, delta_y: f32 },
}

impl PointerEvent {
    /// Pointer position for this event
    pub fn position(&self) -> Vec2 {
        match *self {
            Self::Down { position, .. }
            | Self::Move { position }
            | Self::Up { position, .. }
            | Self::Wheel { position, .. } => position,
        }
    }

    /// The kind flag for this event
    pub fn kind(&self) -> EventKinds {
        match self {
            Self::Down { .. } => EventKinds::POINTER_DOWN,
            Self::Move { .. } => EventKinds::POINTER_MOVE,
            Self::Up { .. } => EventKinds::POINTER_UP,
            Self::Wheel { .. } => EventKinds::WHEEL,
        }
    }
}

bitflags! {
    /// Set of pointer event kinds a listener subscribes to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EventKinds: u8 {
        const POINTER_DOWN = 0b0001;
        const POINTER_MOVE = 0b0010;
        const POINTER_UP = 0b0100;
        const WHEEL = 0b1000;
    }
}

/// Where a listener hears events from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerScope {
    /// Only events over the render surface
    Surface,
    /// Every event the host dispatches
    Global,
}

/// Where an event landed, as decided by the host viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget {
    /// Over the attached render surface
    Surface,
    /// Anywhere else
    Outside,
}

/// Listener callback
pub type Listener = Box<dyn FnMut(&PointerEvent) + Send>;

/// Listener identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
    scope: ListenerScope,
    kinds: EventKinds,
    callback: Arc<Mutex<Listener>>,
}

#[derive(Default)]
struct HubState {
    next_id: u64,
    listeners: AHashMap<ListenerId, ListenerEntry>,
}

/// Registry of pointer listeners for one viewport
#[derive(Default)]
pub struct InputHub {
    state: Mutex<HubState>,
}

impl InputHub {
    /// Create a new input hub
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a listener for the given event kinds
    pub fn register<F>(self: &Arc<Self>, scope: ListenerScope, kinds: EventKinds, callback: F) -> ListenerRegistration
    where
        F: FnMut(&PointerEvent) + Send + 'static,
    {
        let mut state = self.state.lock();
        let id = ListenerId(state.next_id);
        state.next_id += 1;
        state.listeners.insert(id, ListenerEntry {
            scope,
            kinds,
            callback: Arc::new(Mutex::new(Box::new(callback))),
        });

        ListenerRegistration {
            hub: Arc::downgrade(self),
            id: Some(id),
        }
    }

    /// Remove a listener, returning whether it was registered
    pub fn unregister(&self, id: ListenerId) -> bool {
        self.state.lock().listeners.remove(&id).is_some()
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Number of registered listeners with the given scope
    pub fn listener_count_in(&self, scope: ListenerScope) -> usize {
        self.state
            .lock()
            .listeners
            .values()
            .filter(|entry| entry.scope == scope)
            .count()
    }

    /// Deliver an event to every matching listener, returning how many heard it
    ///
    /// Callbacks run without the registry locked, so a listener may
    /// unregister itself or others while handling an event.
    pub fn dispatch(&self, event: &PointerEvent, target: EventTarget) -> usize {
        let kind = event.kind();
        let mut matching: Vec<(ListenerId, Arc<Mutex<Listener>>)> = {
            let state = self.state.lock();
            state
                .listeners
                .iter()
                .filter(|(_, entry)| entry.kinds.contains(kind))
                .filter(|(_, entry)| entry.scope == ListenerScope::Global || target == EventTarget::Surface)
                .map(|(id, entry)| (*id, Arc::clone(&entry.callback)))
                .collect()
        };
        matching.sort_by_key(|(id, _)| id.0);

        let mut delivered = 0;
        for (id, callback) in matching {
            // Skip listeners removed by an earlier callback in this dispatch
            if !self.state.lock().listeners.contains_key(&id) {
                continue;
            }
            let mut listener = callback.lock();
            (listener.as_mut())(event);
            delivered += 1;
        }
        delivered
    }
}

/// Guard for a registered listener
///
/// Removing is idempotent; dropping the guard removes the listener.
pub struct ListenerRegistration {
    hub: Weak<InputHub>,
    id: Option<ListenerId>,
}

impl ListenerRegistration {
    /// Listener identifier, `None` once removed
    pub fn id(&self) -> Option<ListenerId> {
        self.id
    }

    /// Check if the listener is still registered
    pub fn is_active(&self) -> bool {
        match (self.id, self.hub.upgrade()) {
            (Some(id), Some(hub)) => hub.state.lock().listeners.contains_key(&id),
            _ => false,
        }
    }

    /// Unregister the listener
    pub fn remove(&mut self) {
        if let Some(id) = self.id.take() {
            if let Some(hub) = self.hub.upgrade() {
                hub.unregister(id);
            }
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.remove();
    }
}

impl std::fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistration").field("id", &self.id).finish()
    }
}
