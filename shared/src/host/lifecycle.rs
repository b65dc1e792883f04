use std::{
    collections::HashMap,
    hash::Hash,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use log::info;

/// Per-entity source of "removed" notifications.
pub trait LifecycleEvents<E> {
    /// Subscribes to the removal of `entity`. The returned watch has already
    /// fired if the entity is despawned or was never spawned.
    fn on_removed(&self, entity: &E) -> RemovalWatch;
}

struct RemovalSignal {
    removed: AtomicBool,
    respawned: AtomicBool,
}

impl RemovalSignal {
    fn new(removed: bool) -> Self {
        Self {
            removed: AtomicBool::new(removed),
            respawned: AtomicBool::new(false),
        }
    }
}

/// A single-fire subscription to one entity's removal.
///
/// Dropping the watch is unsubscribing; the host only keeps the signal.
#[derive(Clone)]
pub struct RemovalWatch {
    signal: Arc<RemovalSignal>,
}

impl RemovalWatch {
    /// A watch that has already fired
    pub fn fired() -> Self {
        Self {
            signal: Arc::new(RemovalSignal::new(true)),
        }
    }

    pub fn has_fired(&self) -> bool {
        self.signal.removed.load(Ordering::Acquire)
    }

    /// True once the watched entity was despawned and then spawned again
    /// (pooled entities). A respawned entity hands out new watches.
    pub fn respawned(&self) -> bool {
        self.signal.respawned.load(Ordering::Acquire)
    }
}

/// Host-side bookkeeping implementing [`LifecycleEvents`].
///
/// Keyed by entity identity; cells never store callbacks inside an entity,
/// they hold a [`RemovalWatch`] cloned from the entity's current signal.
pub struct LifecycleRegistry<E: Copy + Eq + Hash> {
    signals: HashMap<E, Arc<RemovalSignal>>,
}

impl<E: Copy + Eq + Hash> LifecycleRegistry<E> {
    pub fn new() -> Self {
        Self {
            signals: HashMap::new(),
        }
    }

    /// Marks `entity` as live. Spawning a despawned entity again is a
    /// respawn: watches on the old signal see `respawned()`.
    pub fn spawn(&mut self, entity: E) {
        if let Some(signal) = self.signals.get(&entity) {
            if !signal.removed.load(Ordering::Acquire) {
                return;
            }
            signal.respawned.store(true, Ordering::Release);
            info!("LifecycleRegistry: respawning pooled entity");
        }
        self.signals
            .insert(entity, Arc::new(RemovalSignal::new(false)));
    }

    /// Fires every watch on `entity`. Returns false if it was not live.
    pub fn despawn(&mut self, entity: &E) -> bool {
        let Some(signal) = self.signals.get(entity) else {
            return false;
        };
        !signal.removed.swap(true, Ordering::AcqRel)
    }

    /// Despawns `entity` and drops its signal entirely (entity destroyed,
    /// not pooled).
    pub fn forget(&mut self, entity: &E) {
        self.despawn(entity);
        self.signals.remove(entity);
    }

    pub fn is_live(&self, entity: &E) -> bool {
        self.signals
            .get(entity)
            .is_some_and(|signal| !signal.removed.load(Ordering::Acquire))
    }

    pub fn watch(&self, entity: &E) -> RemovalWatch {
        match self.signals.get(entity) {
            Some(signal) => RemovalWatch {
                signal: signal.clone(),
            },
            None => RemovalWatch::fired(),
        }
    }

    /// Number of watches currently held on `entity`'s live signal
    pub fn subscriber_count(&self, entity: &E) -> usize {
        self.signals
            .get(entity)
            .map_or(0, |signal| Arc::strong_count(signal) - 1)
    }
}

impl<E: Copy + Eq + Hash> Default for LifecycleRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Copy + Eq + Hash> LifecycleEvents<E> for LifecycleRegistry<E> {
    fn on_removed(&self, entity: &E) -> RemovalWatch {
        self.watch(entity)
    }
}
