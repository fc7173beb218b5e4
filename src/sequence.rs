use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::hash::Hash;

/// Issues monotonically increasing tickets so that a response can tell whether
/// a newer request has been started since it went out.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: Cell<u64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

impl RequestSequence {
    pub fn new() -> RequestSequence {
        RequestSequence::default()
    }

    pub fn issue(&self) -> Ticket {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        Ticket(next)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.get() == ticket.0
    }

    pub fn invalidate(&self) {
        self.issue();
    }
}

#[derive(Debug, Default)]
pub struct PendingFlag {
    busy: Cell<bool>,
}

pub struct PendingGuard<'a> {
    flag: &'a PendingFlag,
}

impl PendingFlag {
    pub fn new() -> PendingFlag {
        PendingFlag::default()
    }

    pub fn is_pending(&self) -> bool {
        self.busy.get()
    }

    pub fn try_begin(&self) -> Option<PendingGuard<'_>> {
        if self.busy.replace(true) {
            return None;
        }
        Some(PendingGuard { flag: self })
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.busy.set(false);
    }
}

#[derive(Debug)]
pub struct PendingSet<K> {
    busy: RefCell<HashSet<K>>,
}

pub struct PendingKeyGuard<'a, K: Eq + Hash> {
    set: &'a PendingSet<K>,
    key: Option<K>,
}

impl<K: Eq + Hash + Clone> PendingSet<K> {
    pub fn new() -> PendingSet<K> {
        PendingSet {
            busy: RefCell::new(HashSet::new()),
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.busy.borrow().contains(key)
    }

    pub fn any_pending(&self) -> bool {
        !self.busy.borrow().is_empty()
    }

    pub fn try_begin(&self, key: K) -> Option<PendingKeyGuard<'_, K>> {
        if !self.busy.borrow_mut().insert(key.clone()) {
            return None;
        }
        Some(PendingKeyGuard {
            set: self,
            key: Some(key),
        })
    }
}

impl<K: Eq + Hash + Clone> Default for PendingSet<K> {
    fn default() -> PendingSet<K> {
        PendingSet::new()
    }
}

impl<K: Eq + Hash> Drop for PendingKeyGuard<'_, K> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.set.busy.borrow_mut().remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_ticket_is_current() {
        let sequence = RequestSequence::new();
        let first = sequence.issue();
        assert!(sequence.is_current(first));

        let second = sequence.issue();
        assert!(!sequence.is_current(first));
        assert!(sequence.is_current(second));

        sequence.invalidate();
        assert!(!sequence.is_current(second));
    }

    #[test]
    fn pending_flag_rejects_second_begin_until_guard_drops() {
        let flag = PendingFlag::new();
        let guard = flag.try_begin().unwrap();
        assert!(flag.is_pending());
        assert!(flag.try_begin().is_none());

        drop(guard);
        assert!(!flag.is_pending());
        assert!(flag.try_begin().is_some());
    }

    #[test]
    fn pending_set_blocks_only_same_key() {
        let set = PendingSet::new();
        let first = set.try_begin("a1").unwrap();
        assert!(set.try_begin("a1").is_none());
        assert!(set.try_begin("a2").is_some());
        assert!(set.is_pending(&"a1"));
        assert!(!set.is_pending(&"a2"));

        drop(first);
        assert!(!set.any_pending());
    }
}
