//! The "review requested" notification channel (§5.1, §6).
//!
//! The teacher's `Kbucket::add` stubs this out with a comment
//! (`// this.emit('ping', node.contacts.slice(0, this.numberOfNodesToPing), contact)`);
//! this module implements it as a subscriber list behind its own lock, independent of the
//! table's `RwLock<Tree>`, the way `agent_network.rs` in the pack guards its shared agent
//! map with a lock separate from whatever lock the caller already holds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::contact::Contact;

/// Emitted when `add` rejects a candidate because its leaf is full and cannot split: the
/// oldest contacts of that leaf (liveness-check candidates for eviction) and the
/// candidate that triggered the review.
#[derive(Debug, Clone)]
pub struct ReviewNotification<C> {
    pub oldest: Vec<C>,
    pub newest: C,
}

pub type Subscriber<C> = Arc<dyn Fn(&ReviewNotification<C>) + Send + Sync>;

/// A token returned by [`Subscribers::subscribe`], usable with
/// [`Subscribers::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub(crate) struct Subscribers<C> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SubscriptionId, Subscriber<C>)>>,
}

impl<C: Contact> Subscribers<C> {
    pub fn new() -> Self {
        Subscribers {
            next_id: AtomicU64::new(0),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, handler: Subscriber<C>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, handler));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    /// Snapshot the subscriber list and release the lock before invoking anyone, so a
    /// handler that calls back into the routing table cannot deadlock on this lock.
    pub fn emit(&self, notification: &ReviewNotification<C>) {
        let snapshot: Vec<_> = self
            .entries
            .lock()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in snapshot {
            handler(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, PartialEq)]
    struct C(crate::identifier::Id);
    impl Contact for C {
        fn id(&self) -> &crate::identifier::Id {
            &self.0
        }
    }

    #[test]
    fn emit_calls_every_subscriber_once() {
        let subs: Subscribers<C> = Subscribers::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        subs.subscribe(Arc::new(move |_n| {
            calls2.fetch_add(1, Ordering::SeqCst);
        }));
        subs.emit(&ReviewNotification {
            oldest: vec![C(vec![1])],
            newest: C(vec![2]),
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_stops_future_delivery() {
        let subs: Subscribers<C> = Subscribers::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        let id = subs.subscribe(Arc::new(move |_n| {
            calls2.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(subs.unsubscribe(id));
        subs.emit(&ReviewNotification {
            oldest: vec![],
            newest: C(vec![2]),
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!subs.unsubscribe(id));
    }
}
