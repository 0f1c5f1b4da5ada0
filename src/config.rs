use std::sync::Arc;

use crate::arbiter::{Arbiter, PreferIncumbent};
use crate::contact::Contact;
use crate::identifier::Id;

/// Construction parameters for a [`crate::RoutingTable`] (§6).
pub struct RoutingTableConfig<C: Contact> {
    /// Kademlia's *K*: the maximum number of contacts one bucket holds. Must be ≥ 1.
    pub contacts_per_bucket: usize,
    /// How many of a full, unsplittable bucket's oldest contacts to surface in a review
    /// notification. Must be ≥ 1; the spec's documented default is 3, though some hosts
    /// prefer 6 — that choice belongs to the caller, not this crate (SPEC_FULL §9).
    pub contacts_to_ping: usize,
    /// This table's own identifier. If absent, a 20-byte value is generated lazily from a
    /// cryptographic random source on construction and is thereafter immutable.
    pub local_id: Option<Id>,
    /// Duplicate-identifier tie-break policy. Defaults to [`PreferIncumbent`].
    pub arbiter: Arc<dyn Arbiter<C>>,
}

impl<C: Contact + 'static> Default for RoutingTableConfig<C> {
    fn default() -> Self {
        RoutingTableConfig {
            contacts_per_bucket: 20,
            contacts_to_ping: 3,
            local_id: None,
            arbiter: Arc::new(PreferIncumbent),
        }
    }
}
