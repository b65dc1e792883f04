use std::{collections::HashMap, hash::Hash};

use super::scope::CancelScope;

struct ScopedEntry<T> {
    scope: CancelScope,
    generation: u64,
    payload: T,
}

/// Per-key cancellation scopes, each carrying a payload that lives exactly
/// as long as the scope (typically a lifecycle subscription).
///
/// Used by the set cell twice: keyed by member entity for removal waits,
/// and keyed by identifier for resolutions that have not completed yet.
pub struct ScopeRegistry<K: Eq + Hash, T = ()> {
    entries: HashMap<K, ScopedEntry<T>>,
    next_generation: u64,
}

impl<K: Eq + Hash, T> ScopeRegistry<K, T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_generation: 0,
        }
    }

    /// Opens a scope for `key` beneath `parent`. An existing scope for the
    /// same key is cancelled and its payload dropped.
    ///
    /// Returns the generation identifying this particular scope, for
    /// [`release_generation`](Self::release_generation).
    pub fn open(&mut self, key: K, parent: &CancelScope, payload: T) -> (u64, CancelScope) {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);

        let scope = parent.child();
        let previous = self.entries.insert(
            key,
            ScopedEntry {
                scope: scope.clone(),
                generation,
                payload,
            },
        );
        if let Some(previous) = previous {
            previous.scope.cancel();
        }
        (generation, scope)
    }

    /// Cancels the scope for `key`. Returns whether one existed.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                entry.scope.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, entry) in self.entries.drain() {
            entry.scope.cancel();
        }
    }

    /// Removes the entry for a wait that completed, without cancelling it
    pub fn release(&mut self, key: &K) -> Option<T> {
        self.entries.remove(key).map(|entry| entry.payload)
    }

    /// Like [`release`](Self::release), but only if `key` is still held by
    /// the scope opened as `generation`. A superseded wait must not evict
    /// its replacement.
    pub fn release_generation(&mut self, key: &K, generation: u64) -> Option<T> {
        if self.entries.get(key)?.generation != generation {
            return None;
        }
        self.release(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&T> {
        self.entries.get(key).map(|entry| &entry.payload)
    }

    pub fn scope(&self, key: &K) -> Option<&CancelScope> {
        self.entries.get(key).map(|entry| &entry.scope)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &T)> {
        self.entries.iter().map(|(key, entry)| (key, &entry.payload))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, T> Default for ScopeRegistry<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
