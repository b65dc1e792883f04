use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
};

use log::{info, warn};

use synclink_serde::{ByteReader, ByteWrite};

use crate::{
    host::{lifecycle::RemovalWatch, HostHandle},
    types::NetEntity,
};

use super::{
    change_log::{read_len, write_len, Change, ChangeLog, SetOperation},
    config::SyncConfig,
    event::LinksEvent,
    owner::{OwnerStatus, OwnerWatch},
    resolution::{ResolvePoll, Resolution},
    scope::CancelScope,
    scope_registry::ScopeRegistry,
    sync_object::SyncObject,
    SyncError,
};

/// A replicated set of references to other replicated entities.
///
/// The authority mutates the set and every mutation is queued in a change
/// log that is sent as a delta. A replica that joins late receives a full
/// snapshot carrying the length of the log at that moment, and skips that
/// many leading delta operations because the snapshot already reflects
/// them.
///
/// Identifiers that are not known locally yet are resolved across ticks in
/// [`update`](SyncObject::update). A REMOVE or CLEAR arriving before the
/// entity shows up cancels the wait, so the member never appears.
pub struct SyncLinks<E: Copy + Eq + Hash> {
    config: SyncConfig,
    host: Option<HostHandle<E>>,
    owner: Option<OwnerWatch<E>>,
    authority: bool,
    members: HashMap<E, NetEntity>,
    by_net_entity: HashMap<NetEntity, E>,
    change_log: ChangeLog,
    pending_skip: u32,
    member_scopes: ScopeRegistry<E, RemovalWatch>,
    pending_scopes: ScopeRegistry<NetEntity>,
    /// In-flight waits, tagged with the generation of their pending scope
    resolutions: Vec<(u64, Resolution)>,
    owner_scope: CancelScope,
    events: Vec<LinksEvent<E>>,
}

impl<E: Copy + Eq + Hash> SyncLinks<E> {
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    pub fn with_config(config: SyncConfig) -> Self {
        Self {
            config,
            host: None,
            owner: None,
            authority: false,
            members: HashMap::new(),
            by_net_entity: HashMap::new(),
            change_log: ChangeLog::new(),
            pending_skip: 0,
            member_scopes: ScopeRegistry::new(),
            pending_scopes: ScopeRegistry::new(),
            resolutions: Vec::new(),
            owner_scope: CancelScope::new(),
            events: Vec::new(),
        }
    }

    /// Binds the set to the host's entity lookup and lifecycle events
    pub fn attach_host(&mut self, host: HostHandle<E>) {
        self.host = Some(host);
    }

    /// Tears the set down when `owner` is removed, and resets it when a
    /// pooled `owner` respawns
    pub fn observe_owner(&mut self, owner: E) -> Result<(), SyncError> {
        let Some(host) = &self.host else {
            return Err(SyncError::HostNotAttached {
                operation: "observe_owner",
            });
        };
        self.owner = Some(OwnerWatch::new(owner, host.on_removed(&owner)));
        Ok(())
    }

    // Accessors

    pub fn contains(&self, entity: &E) -> bool {
        self.members.contains_key(entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.members.keys()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get_by_net_entity(&self, net_entity: &NetEntity) -> Option<E> {
        self.by_net_entity.get(net_entity).copied()
    }

    /// Identifiers received but not resolved to a local entity yet
    pub fn pending_len(&self) -> usize {
        self.pending_scopes.len()
    }

    /// Leading delta operations still to be skipped after a full snapshot
    pub fn pending_skip_count(&self) -> u32 {
        self.pending_skip
    }

    pub fn change_count(&self) -> usize {
        self.change_log.len()
    }

    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.change_log.iter()
    }

    pub fn take_events(&mut self) -> Vec<LinksEvent<E>> {
        std::mem::take(&mut self.events)
    }

    // Set queries

    /// True if every member is in `other`
    pub fn is_subset_of<I: IntoIterator<Item = E>>(&self, other: I) -> bool {
        let other: HashSet<E> = other.into_iter().collect();
        self.members.keys().all(|entity| other.contains(entity))
    }

    /// True if every entity of `other` is a member
    pub fn is_superset_of<I: IntoIterator<Item = E>>(&self, other: I) -> bool {
        other
            .into_iter()
            .all(|entity| self.members.contains_key(&entity))
    }

    pub fn is_proper_subset_of<I: IntoIterator<Item = E>>(&self, other: I) -> bool {
        let other: HashSet<E> = other.into_iter().collect();
        other.len() > self.members.len() && self.is_subset_of(other)
    }

    pub fn is_proper_superset_of<I: IntoIterator<Item = E>>(&self, other: I) -> bool {
        let other: HashSet<E> = other.into_iter().collect();
        self.members.len() > other.len() && self.is_superset_of(other)
    }

    /// True if at least one entity of `other` is a member
    pub fn overlaps<I: IntoIterator<Item = E>>(&self, other: I) -> bool {
        other
            .into_iter()
            .any(|entity| self.members.contains_key(&entity))
    }

    /// True if the members are exactly the entities of `other`
    pub fn set_equals<I: IntoIterator<Item = E>>(&self, other: I) -> bool {
        let other: HashSet<E> = other.into_iter().collect();
        other.len() == self.members.len() && self.is_subset_of(other)
    }

    // Mutation

    /// Adds `entity`. Authority only. Returns false if it was already a member.
    pub fn add(&mut self, entity: &E) -> Result<bool, SyncError> {
        self.check_authority("add")?;

        if self.members.contains_key(entity) {
            return Ok(false);
        }

        let Some(host) = self.host.as_ref() else {
            return Err(SyncError::HostNotAttached { operation: "add" });
        };
        let Some(net_entity) = host.net_entity(entity) else {
            warn!("SyncLinks: cannot add an entity that has not been replicated yet");
            return Err(SyncError::EntityNotReplicated);
        };
        let watch = host.on_removed(entity);

        self.insert_member(*entity, net_entity, watch);
        self.change_log.push(SetOperation::Add, Some(net_entity));
        self.events.push(LinksEvent::Added(*entity));
        self.events.push(LinksEvent::Changed);
        Ok(true)
    }

    /// Removes `entity`. Authority only. Returns whether it was a member.
    pub fn remove(&mut self, entity: &E) -> Result<bool, SyncError> {
        self.check_authority("remove")?;

        let Some(net_entity) = self.remove_member(entity) else {
            return Ok(false);
        };

        self.change_log.push(SetOperation::Remove, Some(net_entity));
        self.events.push(LinksEvent::Removed(*entity));
        self.events.push(LinksEvent::Changed);
        Ok(true)
    }

    /// Removes every member. Authority only.
    pub fn clear(&mut self) -> Result<(), SyncError> {
        self.check_authority("clear")?;

        self.cancel_all_scopes();
        self.change_log.push(SetOperation::Clear, None);
        self.events.push(LinksEvent::Cleared);
        self.events.push(LinksEvent::Changed);
        Ok(())
    }

    /// Adds every entity of `other`. Fails without changing anything if
    /// one of the new entities cannot be added.
    pub fn union_with<I: IntoIterator<Item = E>>(&mut self, other: I) -> Result<(), SyncError> {
        self.check_authority("union_with")?;
        let other: Vec<E> = other.into_iter().collect();
        self.check_addable(&other, "union_with")?;
        for entity in other {
            self.add(&entity)?;
        }
        Ok(())
    }

    /// Removes every entity of `other`
    pub fn except_with<I: IntoIterator<Item = E>>(&mut self, other: I) -> Result<(), SyncError> {
        self.check_authority("except_with")?;
        for entity in other {
            self.remove(&entity)?;
        }
        Ok(())
    }

    /// Keeps only the members that are also in `other`
    pub fn intersect_with<I: IntoIterator<Item = E>>(
        &mut self,
        other: I,
    ) -> Result<(), SyncError> {
        self.check_authority("intersect_with")?;
        let keep: HashSet<E> = other.into_iter().collect();
        let stale: Vec<E> = self
            .members
            .keys()
            .filter(|entity| !keep.contains(entity))
            .copied()
            .collect();
        for entity in stale {
            self.remove(&entity)?;
        }
        Ok(())
    }

    /// Keeps the entities that are in exactly one of the set and `other`
    pub fn symmetric_except_with<I: IntoIterator<Item = E>>(
        &mut self,
        other: I,
    ) -> Result<(), SyncError> {
        self.check_authority("symmetric_except_with")?;
        let mut seen = HashSet::new();
        let other: Vec<E> = other
            .into_iter()
            .filter(|entity| seen.insert(*entity))
            .collect();
        self.check_addable(&other, "symmetric_except_with")?;
        for entity in other {
            if !self.remove(&entity)? {
                self.add(&entity)?;
            }
        }
        Ok(())
    }

    /// Cancels every wait and clears all state, including the change log.
    /// Until [`reset`](SyncObject::reset) is called, received identifiers
    /// are never bound.
    pub fn teardown(&mut self) {
        self.owner_scope.cancel();
        self.cancel_all_scopes();
        self.change_log.clear();
        self.pending_skip = 0;
    }

    fn check_authority(&self, operation: &'static str) -> Result<(), SyncError> {
        if !self.authority {
            return Err(SyncError::NotAuthoritative { operation });
        }
        Ok(())
    }

    /// Every non-member in `entities` must have an identifier, so a batch
    /// mutation either applies in full or not at all
    fn check_addable(&self, entities: &[E], operation: &'static str) -> Result<(), SyncError> {
        let mut candidates = entities
            .iter()
            .filter(|entity| !self.members.contains_key(*entity))
            .peekable();
        if candidates.peek().is_none() {
            return Ok(());
        }
        let Some(host) = self.host.as_ref() else {
            return Err(SyncError::HostNotAttached { operation });
        };
        if candidates.any(|entity| host.net_entity(entity).is_none()) {
            warn!("SyncLinks: {}() given an entity that has not been replicated yet", operation);
            return Err(SyncError::EntityNotReplicated);
        }
        Ok(())
    }

    // Membership bookkeeping

    fn insert_member(&mut self, entity: E, net_entity: NetEntity, watch: RemovalWatch) {
        if let Some(previous) = self.by_net_entity.insert(net_entity, entity) {
            if previous != entity {
                warn!(
                    "SyncLinks: {:?} now resolves to a different entity, dropping the old one",
                    net_entity
                );
                self.members.remove(&previous);
                self.member_scopes.cancel(&previous);
            }
        }
        self.members.insert(entity, net_entity);
        let _ = self.member_scopes.open(entity, &self.owner_scope, watch);
    }

    fn remove_member(&mut self, entity: &E) -> Option<NetEntity> {
        let net_entity = self.members.remove(entity)?;
        if self.by_net_entity.get(&net_entity) == Some(entity) {
            self.by_net_entity.remove(&net_entity);
        }
        self.member_scopes.cancel(entity);
        Some(net_entity)
    }

    fn cancel_all_scopes(&mut self) {
        self.member_scopes.cancel_all();
        self.pending_scopes.cancel_all();
        self.resolutions.clear();
        self.members.clear();
        self.by_net_entity.clear();
    }

    // Receiving

    /// Resolves `net_entity` now or queues a wait for it. Returns whether
    /// a member was bound right away.
    fn start_add(&mut self, net_entity: NetEntity) -> bool {
        if self.by_net_entity.contains_key(&net_entity) {
            return false;
        }

        let (generation, scope) = self.pending_scopes.open(net_entity, &self.owner_scope, ());
        let mut resolution = Resolution::new(net_entity, scope);

        match resolution.poll(self.host.as_deref(), &self.config) {
            ResolvePoll::Ready(entity) => {
                self.pending_scopes
                    .release_generation(&net_entity, generation);
                self.bind_member(entity, net_entity)
            }
            ResolvePoll::Pending => {
                self.resolutions.push((generation, resolution));
                false
            }
            ResolvePoll::Cancelled => {
                self.pending_scopes
                    .release_generation(&net_entity, generation);
                false
            }
        }
    }

    fn bind_member(&mut self, entity: E, net_entity: NetEntity) -> bool {
        if self.members.contains_key(&entity) {
            return false;
        }
        let Some(host) = self.host.as_ref() else {
            return false;
        };
        let watch = host.on_removed(&entity);
        // resolved, but already despawned: it would only be removed again
        if watch.has_fired() {
            info!("SyncLinks: {:?} resolved to a removed entity, not adding it", net_entity);
            return false;
        }
        self.insert_member(entity, net_entity, watch);
        self.events.push(LinksEvent::Added(entity));
        true
    }

    /// Applies one delta operation. Returns whether membership changed.
    /// An ADD that has to wait reports its change once it resolves.
    fn apply(&mut self, change: Change) -> bool {
        match change.operation {
            SetOperation::Add => {
                let Some(net_entity) = change.net_entity else {
                    warn!("SyncLinks: ignoring ADD without an identifier");
                    return false;
                };
                self.start_add(net_entity)
            }
            SetOperation::Remove => {
                let Some(net_entity) = change.net_entity else {
                    warn!("SyncLinks: ignoring REMOVE without an identifier");
                    return false;
                };
                // aborts an ADD that has not resolved yet
                self.pending_scopes.cancel(&net_entity);
                let Some(entity) = self.by_net_entity.get(&net_entity).copied() else {
                    return false;
                };
                self.remove_member(&entity);
                self.events.push(LinksEvent::Removed(entity));
                true
            }
            SetOperation::Clear => {
                self.cancel_all_scopes();
                self.events.push(LinksEvent::Cleared);
                true
            }
        }
    }

    // Ticking

    fn poll_owner(&mut self) {
        let Some(owner) = self.owner.as_mut() else {
            return;
        };
        match owner.poll() {
            OwnerStatus::Alive => {}
            OwnerStatus::Removed => {
                info!("SyncLinks: owner removed, tearing down");
                self.teardown();
            }
            OwnerStatus::Respawned => {
                info!("SyncLinks: owner respawned, resetting");
                let entity = owner.entity();
                let watch = self.host.as_ref().map(|host| host.on_removed(&entity));
                if let (Some(owner), Some(watch)) = (self.owner.as_mut(), watch) {
                    owner.rewatch(watch);
                }
                self.reset();
            }
        }
    }

    fn poll_resolutions(&mut self) {
        let resolutions = std::mem::take(&mut self.resolutions);
        for (generation, mut resolution) in resolutions {
            let net_entity = resolution.net_entity();
            match resolution.poll(self.host.as_deref(), &self.config) {
                ResolvePoll::Pending => {
                    self.resolutions.push((generation, resolution));
                }
                ResolvePoll::Ready(entity) => {
                    self.pending_scopes
                        .release_generation(&net_entity, generation);
                    info!(
                        "SyncLinks: {:?} resolved after {} ticks",
                        net_entity,
                        resolution.waited_ticks()
                    );
                    if self.bind_member(entity, net_entity) {
                        self.events.push(LinksEvent::Changed);
                    }
                }
                ResolvePoll::Cancelled => {
                    self.pending_scopes
                        .release_generation(&net_entity, generation);
                }
            }
        }
    }

    fn poll_members(&mut self) {
        let removed: Vec<E> = self
            .member_scopes
            .iter()
            .filter(|(_, watch)| watch.has_fired())
            .map(|(entity, _)| *entity)
            .collect();

        for entity in removed {
            let Some(net_entity) = self.remove_member(&entity) else {
                continue;
            };
            // a replica only echoes the removal locally
            if self.authority {
                self.change_log.push(SetOperation::Remove, Some(net_entity));
            }
            self.events.push(LinksEvent::Removed(entity));
            self.events.push(LinksEvent::Changed);
        }
    }
}

impl<E: Copy + Eq + Hash> Default for SyncLinks<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Copy + Eq + Hash> SyncObject for SyncLinks<E> {
    fn is_dirty(&self) -> bool {
        !self.change_log.is_empty()
    }

    fn flush(&mut self) {
        self.change_log.clear();
    }

    fn reset(&mut self) {
        self.teardown();
        self.owner_scope = CancelScope::new();
    }

    fn has_authority(&self) -> bool {
        self.authority
    }

    fn set_authority(&mut self, authority: bool) {
        self.authority = authority;
    }

    /// `[memberCount]`, every member identifier, then the number of changes
    /// still in the log. Those changes are already part of this snapshot,
    /// so the receiver must skip them when they arrive as a delta.
    fn serialize_full(&self, writer: &mut dyn ByteWrite) {
        write_len(self.members.len(), writer);
        for net_entity in self.members.values() {
            NetEntity::ser_optional(Some(*net_entity), writer);
        }
        write_len(self.change_log.len(), writer);
    }

    fn serialize_delta(&self, writer: &mut dyn ByteWrite) {
        self.change_log.ser(writer);
    }

    fn deserialize_full(&mut self, reader: &mut ByteReader) -> Result<(), SyncError> {
        // read everything first so a malformed snapshot leaves us untouched
        let count = read_len(reader)?;
        self.config.check_batch_len(count)?;
        let mut net_entities = Vec::with_capacity(count as usize);
        for _ in 0..count {
            net_entities.push(NetEntity::de_optional(reader)?);
        }
        let pending_skip = read_len(reader)?;
        self.config.check_batch_len(pending_skip)?;

        self.cancel_all_scopes();
        self.change_log.clear();
        self.events.push(LinksEvent::Cleared);

        for net_entity in net_entities {
            match net_entity {
                Some(net_entity) => {
                    self.start_add(net_entity);
                }
                None => warn!("SyncLinks: ignoring empty identifier in full snapshot"),
            }
        }

        self.pending_skip = pending_skip;
        self.events.push(LinksEvent::Changed);
        Ok(())
    }

    fn deserialize_delta(&mut self, reader: &mut ByteReader) -> Result<(), SyncError> {
        let count = read_len(reader)?;
        self.config.check_batch_len(count)?;
        let mut changes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            changes.push(Change::de(reader)?);
        }

        let mut changed = false;
        for change in changes {
            if self.pending_skip > 0 {
                self.pending_skip -= 1;
                continue;
            }
            changed |= self.apply(change);
        }

        if changed {
            self.events.push(LinksEvent::Changed);
        }
        Ok(())
    }

    fn update(&mut self) {
        self.poll_owner();
        self.poll_resolutions();
        self.poll_members();
    }
}
