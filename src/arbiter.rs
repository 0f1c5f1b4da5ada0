use crate::contact::Contact;

/// Which of the two identifier-colliding contacts a duplicate-insert resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Incumbent,
    Candidate,
}

/// Tie-break policy invoked when a contact is added whose identifier already exists in
/// the table. Receives the contact currently admitted (`incumbent`) and the one being
/// inserted (`candidate`); both are guaranteed to carry the same identifier.
pub trait Arbiter<C: Contact>: Send + Sync {
    fn arbitrate(&self, incumbent: &C, candidate: &C) -> Choice;
}

/// Kademlia's textbook default: prefer the contact already known to be live over a
/// freshly-seen one with the same identifier.
#[derive(Debug, Default)]
pub struct PreferIncumbent;

impl<C: Contact> Arbiter<C> for PreferIncumbent {
    fn arbitrate(&self, _incumbent: &C, _candidate: &C) -> Choice {
        Choice::Incumbent
    }
}
