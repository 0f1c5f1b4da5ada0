//! A Kademlia k-bucket routing table: an in-memory, concurrency-safe structure that
//! organizes remote peer contacts by XOR distance to a fixed local identifier, and
//! applies Kademlia's split/evict policy as buckets fill.
//!
//! Adapted from the same algorithm as
//! <https://github.com/tristanls/k-bucket/blob/master/index.js> — binary split tree,
//! `do_not_split` siblings, bucket-full review notifications — generalized to arbitrary
//! identifier lengths and wired behind a readers-writer lock so it can be shared across
//! threads without an external mutex.
//!
//! This crate is the routing substrate for a distributed hash table; it does not itself
//! perform network I/O, liveness probing, persistence, or iterative node lookup. It
//! provides the `closest(id)` primitive such a lookup would consume.

mod arbiter;
mod bucket;
mod config;
mod contact;
mod error;
mod identifier;
mod notify;
mod table;
mod tree;

pub use arbiter::{Arbiter, Choice, PreferIncumbent};
pub use config::RoutingTableConfig;
pub use contact::Contact;
pub use error::RoutingTableError;
pub use identifier::{bit_at, distance, Id};
pub use notify::{ReviewNotification, Subscriber, SubscriptionId};
pub use table::RoutingTable;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Peer(Id);
    impl Contact for Peer {
        fn id(&self) -> &Id {
            &self.0
        }
    }

    #[test]
    fn fresh_table_is_empty() {
        let table: RoutingTable<Peer> = RoutingTable::new(RoutingTableConfig::default());
        assert_eq!(table.count(), 0);
        assert!(table.iterate().is_empty());
    }

    #[test]
    fn round_trip_add_then_remove_matches_a_fresh_table() {
        let fresh: RoutingTable<Peer> = RoutingTable::new(RoutingTableConfig {
            local_id: Some(vec![0, 0, 0, 0]),
            ..RoutingTableConfig::default()
        });
        let table: RoutingTable<Peer> = RoutingTable::new(RoutingTableConfig {
            local_id: Some(vec![0, 0, 0, 0]),
            ..RoutingTableConfig::default()
        });

        let ids: Vec<Id> = (0u8..30).map(|i| vec![i, 0, 0, 0]).collect();
        for id in &ids {
            table.add(Peer(id.clone())).unwrap();
        }
        for id in &ids {
            table.remove(id);
        }

        assert_eq!(table.count(), fresh.count());
        assert_eq!(table.iterate(), fresh.iterate());
    }

    #[test]
    fn concurrent_readers_and_writer_never_see_a_torn_bucket() {
        let table: Arc<RoutingTable<Peer>> = Arc::new(RoutingTable::new(RoutingTableConfig {
            contacts_per_bucket: 4,
            local_id: Some(vec![0, 0, 0, 0]),
            ..RoutingTableConfig::default()
        }));

        std::thread::scope(|scope| {
            let writer_table = table.clone();
            scope.spawn(move || {
                for i in 0u8..100 {
                    writer_table.add(Peer(vec![i, i, i, i])).unwrap();
                }
            });

            for _ in 0..4 {
                let reader_table = table.clone();
                scope.spawn(move || {
                    for _ in 0..50 {
                        let snapshot = reader_table.iterate();
                        assert!(snapshot.len() <= 100);
                        let _ = reader_table.closest(&vec![0, 0, 0, 0]);
                    }
                });
            }
        });

        assert!(table.count() <= 100);
    }

    #[test]
    fn get_after_concurrent_remove_observes_absence() {
        let table: Arc<RoutingTable<Peer>> = Arc::new(RoutingTable::new(RoutingTableConfig {
            local_id: Some(vec![0, 0, 0, 0]),
            ..RoutingTableConfig::default()
        }));
        let id = vec![0, 0, 0, 1];
        table.add(Peer(id.clone())).unwrap();
        assert!(table.get(&id).is_some());

        let remover_table = table.clone();
        let remover_id = id.clone();
        std::thread::scope(|scope| {
            scope.spawn(move || {
                assert!(remover_table.remove(&remover_id));
            });
        });

        assert!(table.get(&id).is_none());
    }
}
