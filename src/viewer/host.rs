//! What the viewer needs from the environment it is mounted in.

use std::collections::HashMap;

use thiserror::Error;

/// Durable flag recording that the swipe hint was already shown.
pub const SWIPE_HINT_KEY: &str = "magazine-swipe-hint-seen";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("fullscreen request rejected: {0}")]
    FullscreenRejected(String),
    #[error("could not persist flag '{key}': {reason}")]
    Storage { key: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Keyboard,
    FullscreenChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub trait ViewerHost {
    fn request_fullscreen(&mut self) -> Result<(), HostError>;

    fn exit_fullscreen(&mut self) -> Result<(), HostError>;

    fn read_flag(&self, key: &str) -> bool;

    fn write_flag(&mut self, key: &str) -> Result<(), HostError>;

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);
}

/// Bookkeeping for hosts that hand out listener ids.
#[derive(Debug, Default)]
pub struct ListenerSet {
    next_id: u64,
    active: HashMap<ListenerId, ListenerKind>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ListenerKind) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.active.insert(id, kind);
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.active.remove(&id).is_some()
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.active.values().any(|k| *k == kind)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_not_reused() {
        let mut set = ListenerSet::new();
        let a = set.add(ListenerKind::Keyboard);
        assert!(set.remove(a));
        let b = set.add(ListenerKind::Keyboard);
        assert_ne!(a, b);
        assert!(!set.remove(a));
        assert!(set.is_listening(ListenerKind::Keyboard));
        assert!(!set.is_listening(ListenerKind::FullscreenChange));
    }
}
