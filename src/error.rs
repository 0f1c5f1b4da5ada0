/// Errors the routing table's public API can return (§7).
///
/// `NotFound` and the soft `CapacityExhausted` condition are deliberately not variants
/// here: absence is a `bool`/`Option` return, and a full-and-unsplittable bucket is a
/// successful call whose effect is a [`crate::ReviewNotification`] plus `add` returning
/// `false` (spec's propagation policy, §7).
#[derive(Debug, thiserror::Error)]
pub enum RoutingTableError {
    #[error("contact identifier must not be empty")]
    InvalidArgument,

    /// An internal consistency check failed; this represents a bug in this crate, not
    /// caller misuse. Constructed at the one call site where the check is actually
    /// reachable ([`crate::RoutingTable::add`]'s split step), so both debug and release
    /// builds return a typed error instead of silently discarding state.
    #[error("routing table invariant violated: {0}")]
    InvariantViolation(&'static str),
}
