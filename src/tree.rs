//! Binary tree of buckets keyed by identifier bit-prefix.
//!
//! Based on `Node<V>`/`split`/`Kbucket::add`'s descent loop in
//! <https://github.com/tristanls/k-bucket/blob/master/index.js> (as ported by the teacher
//! crate's `kbucket.rs`): a pure tree, no back-pointers, leaf-iff-both-children-absent.

use tracing::{instrument, trace};

use crate::bucket::Bucket;
use crate::contact::Contact;
use crate::error::RoutingTableError;
use crate::identifier::{bit_at, Id};

/// A node is a leaf iff both children are absent; this is a type-level invariant here
/// rather than a runtime convention (§3).
pub(crate) enum Node<C> {
    Leaf(Bucket<C>),
    Internal {
        left: Box<Node<C>>,
        right: Box<Node<C>>,
    },
}

impl<C: Contact> Node<C> {
    fn new_leaf() -> Self {
        Node::Leaf(Bucket::new())
    }
}

pub(crate) struct Tree<C> {
    root: Node<C>,
}

impl<C: Contact> Tree<C> {
    pub fn new() -> Self {
        Tree {
            root: Node::new_leaf(),
        }
    }

    pub fn clear(&mut self) {
        self.root = Node::new_leaf();
    }

    /// Walk from the root to the leaf governing `id`, returning a mutable reference to
    /// that node (always the `Leaf` variant) and the depth (number of bits consumed).
    pub fn descend_mut(&mut self, id: &Id) -> (&mut Node<C>, usize) {
        let mut depth = 0usize;
        let mut node = &mut self.root;
        loop {
            match node {
                Node::Internal { left, right } => {
                    node = if bit_at(id, depth) {
                        right.as_mut()
                    } else {
                        left.as_mut()
                    };
                    depth += 1;
                }
                Node::Leaf(_) => return (node, depth),
            }
        }
    }

    pub fn descend(&self, id: &Id) -> (&Bucket<C>, usize) {
        let mut depth = 0usize;
        let mut node = &self.root;
        loop {
            match node {
                Node::Internal { left, right } => {
                    node = if bit_at(id, depth) { right } else { left };
                    depth += 1;
                }
                Node::Leaf(bucket) => return (bucket, depth),
            }
        }
    }

    /// Split the leaf `node` (found at `depth`) into two children, redistributing its
    /// contacts by the bit at `depth`, and mark whichever child does *not* cover
    /// `local_id` as `do_not_split` (§4.3). `node` must currently be `Node::Leaf`; the
    /// caller (`RoutingTable::add`) is expected to enforce that, but since splitting an
    /// internal node would silently discard its children, this is also checked at the one
    /// call site where it is actually reachable, via `RoutingTableError::InvariantViolation`
    /// rather than a `debug_assert!` that release builds would compile out.
    #[instrument(skip(node, local_id), fields(depth))]
    pub fn split(node: &mut Node<C>, depth: usize, local_id: &Id) -> Result<(), RoutingTableError> {
        let bucket = match node {
            Node::Leaf(bucket) => bucket,
            Node::Internal { .. } => {
                return Err(RoutingTableError::InvariantViolation(
                    "split called on an internal node",
                ));
            }
        };
        trace!("splitting full leaf into two children");

        let mut left = Bucket::new();
        let mut right = Bucket::new();
        for contact in bucket.take_contacts() {
            if bit_at(contact.id(), depth) {
                right.append(contact);
            } else {
                left.append(contact);
            }
        }

        // The child that does *not* cover local_id can never split further.
        if bit_at(local_id, depth) {
            left.set_do_not_split(true);
        } else {
            right.set_do_not_split(true);
        }

        *node = Node::Internal {
            left: Box::new(Node::Leaf(left)),
            right: Box::new(Node::Leaf(right)),
        };
        Ok(())
    }

    pub fn deep_count(&self) -> usize {
        fn walk<C>(node: &Node<C>) -> usize {
            match node {
                Node::Leaf(bucket) => bucket.count(),
                Node::Internal { left, right } => walk(left) + walk(right),
            }
        }
        walk(&self.root)
    }

    /// Left-first, in-order snapshot of every contact currently admitted.
    pub fn all_contacts(&self) -> Vec<C> {
        fn walk<C: Contact>(node: &Node<C>, out: &mut Vec<C>) {
            match node {
                Node::Leaf(bucket) => out.extend(bucket.iterate().cloned()),
                Node::Internal { left, right } => {
                    walk(left, out);
                    walk(right, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }

    #[cfg(test)]
    pub fn leaf_count(&self) -> usize {
        fn walk<C>(node: &Node<C>) -> usize {
            match node {
                Node::Leaf(_) => 1,
                Node::Internal { left, right } => walk(left) + walk(right),
            }
        }
        walk(&self.root)
    }
}
