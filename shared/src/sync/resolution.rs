use log::warn;

use crate::{host::entity_lookup::EntityLookup, types::NetEntity};

use super::{config::SyncConfig, scope::CancelScope};

/// Outcome of polling a [`Resolution`] for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvePoll<E> {
    Ready(E),
    Pending,
    Cancelled,
}

/// A suspended "wait until this identifier resolves" task.
///
/// There is no blocking and no timeout: the owning cell polls it once per
/// tick until the lookup knows the identifier or the scope is cancelled.
pub struct Resolution {
    net_entity: NetEntity,
    scope: CancelScope,
    waited_ticks: u32,
    warned: bool,
}

impl Resolution {
    pub fn new(net_entity: NetEntity, scope: CancelScope) -> Self {
        Self {
            net_entity,
            scope,
            waited_ticks: 0,
            warned: false,
        }
    }

    pub fn net_entity(&self) -> NetEntity {
        self.net_entity
    }

    pub fn waited_ticks(&self) -> u32 {
        self.waited_ticks
    }

    /// True once the "still unresolved" warning has been logged
    pub fn has_warned(&self) -> bool {
        self.warned
    }

    /// Queries the lookup once. `lookup` is `None` while the cell has no
    /// host attached, which counts as a miss.
    pub fn poll<E, L: EntityLookup<E> + ?Sized>(
        &mut self,
        lookup: Option<&L>,
        config: &SyncConfig,
    ) -> ResolvePoll<E> {
        if self.scope.is_cancelled() {
            return ResolvePoll::Cancelled;
        }

        let found = lookup.and_then(|lookup| lookup.try_resolve(self.net_entity));

        // the lookup may have run arbitrary host code
        if self.scope.is_cancelled() {
            return ResolvePoll::Cancelled;
        }

        match found {
            Some(entity) => ResolvePoll::Ready(entity),
            None => {
                self.waited_ticks = self.waited_ticks.saturating_add(1);
                if !self.warned && self.waited_ticks >= config.unresolved_warn_ticks {
                    self.warned = true;
                    warn!(
                        "Reference to {:?} still unresolved after {} ticks; the entity may never appear",
                        self.net_entity, self.waited_ticks
                    );
                }
                ResolvePoll::Pending
            }
        }
    }
}
