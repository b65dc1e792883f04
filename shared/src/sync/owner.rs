use crate::host::lifecycle::RemovalWatch;

pub(crate) enum OwnerStatus {
    Alive,
    /// The owner was destroyed or despawned; reported once
    Removed,
    /// The owner came back from a pool and needs a fresh watch
    Respawned,
}

/// A cell's subscription to the entity that embeds it.
pub(crate) struct OwnerWatch<E> {
    entity: E,
    watch: RemovalWatch,
    removed: bool,
}

impl<E: Copy> OwnerWatch<E> {
    pub fn new(entity: E, watch: RemovalWatch) -> Self {
        Self {
            entity,
            watch,
            removed: false,
        }
    }

    pub fn entity(&self) -> E {
        self.entity
    }

    pub fn poll(&mut self) -> OwnerStatus {
        if self.watch.respawned() {
            return OwnerStatus::Respawned;
        }
        if self.watch.has_fired() && !self.removed {
            self.removed = true;
            return OwnerStatus::Removed;
        }
        OwnerStatus::Alive
    }

    pub fn rewatch(&mut self, watch: RemovalWatch) {
        self.watch = watch;
        self.removed = false;
    }
}
