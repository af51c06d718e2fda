//! The registry of managed clients.
//!
//! A `ClientSet` owns every `Client` record, keyed by window ID in an
//! arena, with two ordered index lists over the same IDs:
//!
//! - `zorder`: most recently managed first; this is the order the
//!   layout sees.
//! - `focus_stack`: most recently focused first; the head is the
//!   fallback focus target.
//!
//! Both lists always index exactly the arena's key set.

use std::collections::HashMap;

use tracing::{trace, warn};

use crate::core::client::Client;
use crate::x::core::XWindowID;

#[derive(Debug, Default, Clone)]
pub struct ClientSet {
    clients: HashMap<XWindowID, Client>,
    zorder: Vec<XWindowID>,
    focus_stack: Vec<XWindowID>,
}

impl ClientSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: XWindowID) -> bool {
        self.clients.contains_key(&id)
    }

    /// Returns a reference to the client with the given window ID.
    pub fn lookup(&self, id: XWindowID) -> Option<&Client> {
        self.clients.get(&id)
    }

    /// Returns a mutable reference to the client with the given ID.
    pub fn lookup_mut(&mut self, id: XWindowID) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    /// The most recently focused client, if any.
    pub fn stack_head(&self) -> Option<XWindowID> {
        self.focus_stack.first().copied()
    }

    /// Inserts a new client at the front of both lists.
    pub fn register(&mut self, client: Client) {
        let id = client.id();
        trace!("registering client {}", id);

        if self.clients.insert(id, client).is_some() {
            // re-registration should never happen; keep the lists sane
            warn!("client {} was already registered", id);
            self.zorder.retain(|w| *w != id);
            self.focus_stack.retain(|w| *w != id);
        }
        self.zorder.insert(0, id);
        self.focus_stack.insert(0, id);
    }

    /// Removes a client from the arena and both lists.
    ///
    /// Unknown IDs are a harmless no-op, so removal is idempotent.
    pub fn unregister(&mut self, id: XWindowID) -> Option<Client> {
        let client = self.clients.remove(&id)?;
        self.zorder.retain(|w| *w != id);
        self.focus_stack.retain(|w| *w != id);
        trace!("unregistered client {}", id);
        Some(client)
    }

    /// Moves a client to the front of the focus stack.
    pub fn promote(&mut self, id: XWindowID) {
        if !self.contains(id) {
            warn!("tried to promote unmanaged window {}", id);
            return;
        }
        self.focus_stack.retain(|w| *w != id);
        self.focus_stack.insert(0, id);
    }

    /// All clients in z-order (most recently managed first).
    pub fn in_zorder(&self) -> impl Iterator<Item = &Client> {
        self.zorder.iter().filter_map(move |id| self.clients.get(id))
    }

    /// Window IDs in focus order (most recently focused first).
    pub fn in_focus_order(&self) -> impl Iterator<Item = XWindowID> + '_ {
        self.focus_stack.iter().copied()
    }

    /// IDs of floating clients in z-order.
    pub fn floating_ids(&self) -> Vec<XWindowID> {
        self.in_zorder()
            .filter(|c| c.is_floating())
            .map(|c| c.id())
            .collect()
    }

    /// Tiled clients in z-order, as the layout wants them.
    pub fn tiled_in_zorder(&self) -> Vec<&Client> {
        self.in_zorder().filter(|c| !c.is_floating()).collect()
    }

    #[cfg(test)]
    pub(crate) fn lists_are_consistent(&self) -> bool {
        use std::collections::HashSet;

        let keys: HashSet<_> = self.clients.keys().copied().collect();
        let z: HashSet<_> = self.zorder.iter().copied().collect();
        let f: HashSet<_> = self.focus_stack.iter().copied().collect();

        keys == z
            && keys == f
            && self.zorder.len() == keys.len()
            && self.focus_stack.len() == keys.len()
    }
}
