//! Interfaces a cell needs from the host application: the entity lookup
//! table and the lifecycle event source. Both are owned by the host; cells
//! only read them through a shared [`HostHandle`].

use std::sync::Arc;

pub mod entity_lookup;
pub mod lifecycle;

use entity_lookup::EntityLookup;
use lifecycle::LifecycleEvents;

/// Everything a cell needs from the host, bundled for `attach_host()`
pub trait ReplicationHost<E>: EntityLookup<E> + LifecycleEvents<E> + Send + Sync {}

impl<E, T> ReplicationHost<E> for T where T: EntityLookup<E> + LifecycleEvents<E> + Send + Sync {}

pub type HostHandle<E> = Arc<dyn ReplicationHost<E>>;
