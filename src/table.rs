use std::sync::Arc;

use parking_lot::RwLock;
use rand::RngCore;
use tracing::{debug, instrument, trace};

use crate::arbiter::{Arbiter, Choice};
use crate::config::RoutingTableConfig;
use crate::contact::Contact;
use crate::error::RoutingTableError;
use crate::identifier::{self, Id};
use crate::notify::{ReviewNotification, Subscriber, SubscriptionId, Subscribers};
use crate::tree::{Node, Tree};

/// The default length, in bytes, of a lazily-generated local identifier (20 bytes = 160
/// bits, Kademlia's usual choice).
const DEFAULT_LOCAL_ID_LEN: usize = 20;

fn generate_local_id() -> Id {
    let mut bytes = [0u8; DEFAULT_LOCAL_ID_LEN];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes.to_vec()
}

enum AddResult<C> {
    Added,
    Rejected {
        oldest: Vec<C>,
        newest: C,
    },
}

/// A Kademlia k-bucket routing table (C5): the public façade wiring the identifier
/// algebra, bucket, tree, and arbiter together under a readers-writer lock, and emitting
/// the eviction-review notification described in SPEC_FULL §5–§6.
///
/// Grounded on `SnowyCoder-wdht/logic/src/dht.rs`'s `KademliaDht` (lock-guarded tree
/// behind a plain struct, `tracing`-instrumented mutations), with the add/split algorithm
/// itself carried from the teacher crate's `Kbucket::add`.
pub struct RoutingTable<C: Contact> {
    local_id: Id,
    contacts_per_bucket: usize,
    contacts_to_ping: usize,
    arbiter: Arc<dyn Arbiter<C>>,
    tree: RwLock<Tree<C>>,
    subscribers: Subscribers<C>,
}

impl<C: Contact + 'static> RoutingTable<C> {
    pub fn new(config: RoutingTableConfig<C>) -> Self {
        let local_id = config.local_id.unwrap_or_else(generate_local_id);
        debug!(
            local_id = %hex_string(&local_id),
            contacts_per_bucket = config.contacts_per_bucket,
            contacts_to_ping = config.contacts_to_ping,
            "routing table initialized"
        );
        RoutingTable {
            local_id,
            contacts_per_bucket: config.contacts_per_bucket.max(1),
            contacts_to_ping: config.contacts_to_ping.max(1),
            arbiter: config.arbiter,
            tree: RwLock::new(Tree::new()),
            subscribers: Subscribers::new(),
        }
    }

    pub fn local_id(&self) -> &Id {
        &self.local_id
    }

    /// XOR distance between two identifiers (C1), exposed so callers can rank contacts
    /// the same way `closest` does.
    pub fn distance(&self, a: &Id, b: &Id) -> Vec<u8> {
        identifier::distance(a, b)
    }

    /// Admit or refresh `contact`. Returns `Ok(true)` if it is now present in the table
    /// (freshly inserted, or an existing entry that was updated/refreshed), `Ok(false)` if
    /// its leaf was full, unsplittable, and a review notification was emitted instead.
    ///
    /// Spans the whole admission attempt (including any splits it triggers) under one
    /// `tracing` span keyed by the candidate's identifier, so a subscriber can reconstruct
    /// the add → split → review causal chain for a given contact instead of correlating
    /// flat events by hand.
    #[instrument(skip(self, contact), fields(id = %hex_string(contact.id())))]
    pub fn add(&self, contact: C) -> Result<bool, RoutingTableError> {
        if contact.id().is_empty() {
            return Err(RoutingTableError::InvalidArgument);
        }

        let result = {
            let mut tree = self.tree.write();
            self.add_locked(&mut tree, contact)?
        };

        match result {
            AddResult::Added => Ok(true),
            AddResult::Rejected { oldest, newest } => {
                trace!(
                    newest = %hex_string(newest.id()),
                    oldest_count = oldest.len(),
                    "bucket full and unsplittable; emitting review notification"
                );
                self.subscribers.emit(&ReviewNotification { oldest, newest });
                Ok(false)
            }
        }
    }

    /// Runs the add algorithm to completion (SPEC_FULL §4.5, steps 2–6), looping instead
    /// of recursing on split so depth is bounded by identifier length rather than stack
    /// depth.
    fn add_locked(&self, tree: &mut Tree<C>, contact: C) -> Result<AddResult<C>, RoutingTableError> {
        loop {
            let (node, depth) = tree.descend_mut(contact.id());
            let bucket = match node {
                Node::Leaf(bucket) => bucket,
                Node::Internal { .. } => {
                    unreachable!("descend_mut always returns a leaf")
                }
            };

            if let Some(index) = bucket.index_of(contact.id()) {
                let choice = self.arbiter.arbitrate(bucket.get_at(index), &contact);
                let incumbent_equals_candidate = bucket.get_at(index) == &contact;

                if choice == Choice::Incumbent && !incumbent_equals_candidate {
                    // Arbiter kept the incumbent over a genuinely different candidate:
                    // drop the candidate, leave the bucket untouched.
                    return Ok(AddResult::Added);
                }

                let old = bucket.remove_at(index);
                let refreshed = if choice == Choice::Candidate { contact } else { old };
                bucket.append(refreshed);
                return Ok(AddResult::Added);
            }

            if bucket.count() < self.contacts_per_bucket {
                bucket.append(contact);
                return Ok(AddResult::Added);
            }

            if bucket.do_not_split() {
                let ping_count = self.contacts_to_ping.min(bucket.count());
                let oldest = bucket.iterate().take(ping_count).cloned().collect();
                return Ok(AddResult::Rejected {
                    oldest,
                    newest: contact,
                });
            }

            Tree::split(node, depth, &self.local_id)?;
            // Loop again: the just-split leaf is now internal, and descending again
            // routes `contact` into the freshly created child.
        }
    }

    /// Remove the contact with the given identifier, if present. Returns whether a
    /// removal occurred. Does not merge empty sibling buckets (SPEC_FULL §9): once split,
    /// always split.
    pub fn remove(&self, id: &Id) -> bool {
        let mut tree = self.tree.write();
        let (node, _depth) = tree.descend_mut(id);
        let bucket = match node {
            Node::Leaf(bucket) => bucket,
            Node::Internal { .. } => unreachable!("descend_mut always returns a leaf"),
        };
        match bucket.index_of(id) {
            Some(index) => {
                bucket.remove_at(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &Id) -> Option<C> {
        let tree = self.tree.read();
        let (bucket, _depth) = tree.descend(id);
        bucket.get(id).cloned()
    }

    /// Every currently admitted contact, ordered by ascending XOR distance to `id`. A
    /// materialized snapshot, not a live view (SPEC_FULL §4.5).
    pub fn closest(&self, id: &Id) -> Vec<C> {
        let snapshot = {
            let tree = self.tree.read();
            tree.all_contacts()
        };
        let mut ranked: Vec<(Vec<u8>, C)> = snapshot
            .into_iter()
            .map(|c| (identifier::distance(c.id(), id), c))
            .collect();
        ranked.sort_by(|a, b| a.0.cmp(&b.0));
        ranked.into_iter().map(|(_, c)| c).collect()
    }

    /// Convenience over [`RoutingTable::closest`] for callers that already have a
    /// [`Contact`] rather than a bare identifier.
    pub fn closest_to_contact(&self, contact: &C) -> Vec<C> {
        self.closest(contact.id())
    }

    /// Snapshot of every contact currently admitted, in tree traversal order.
    pub fn iterate(&self) -> Vec<C> {
        let tree = self.tree.read();
        tree.all_contacts()
    }

    pub fn count(&self) -> usize {
        let tree = self.tree.read();
        tree.deep_count()
    }

    /// Replace the tree with a fresh empty root. All prior contacts are released.
    pub fn clear(&self) {
        let mut tree = self.tree.write();
        tree.clear();
    }

    /// Subscribe to the "review requested" notification channel (§5.1, §6). Returns a
    /// token usable with [`RoutingTable::unsubscribe`].
    pub fn subscribe(&self, handler: Subscriber<C>) -> SubscriptionId {
        self.subscribers.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
