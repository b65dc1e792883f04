//! Notifications raised by replicated cells. Cells queue them; the owner
//! drains them with `take_events()` after mutating, deserializing or ticking.

/// Raised by [`SyncLink`](super::SyncLink) whenever its local value changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEvent<E> {
    Changed(Option<E>),
}

/// Raised by [`SyncLinks`](super::SyncLinks).
///
/// `Changed` follows the element events: once per local mutation, once per
/// applied delta batch, once per full snapshot, and once per member that
/// resolves or is removed outside of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinksEvent<E> {
    Added(E),
    Removed(E),
    Cleared,
    Changed,
}

/// Raised by [`SyncVar`](super::SyncVar) and
/// [`SyncVarPredictive`](super::SyncVarPredictive).
#[derive(Clone, Debug, PartialEq)]
pub enum VarEvent<T> {
    Changed(T),
}
