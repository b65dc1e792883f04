use crate::types::NetEntity;

/// The host's table of live replicated entities, as seen by a cell.
///
/// Both queries must be synchronous and side-effect free: cells call them
/// while deserializing and once per tick for every pending resolution.
pub trait EntityLookup<E> {
    /// Returns the live local entity registered under `net_entity`, if any
    fn try_resolve(&self, net_entity: NetEntity) -> Option<E>;

    /// Returns the identifier the authoritative side assigned to `entity`,
    /// or `None` if it has not been replicated yet
    fn net_entity(&self, entity: &E) -> Option<NetEntity>;
}
