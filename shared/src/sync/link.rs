use std::hash::Hash;

use log::{info, warn};

use synclink_serde::{ByteReader, ByteWrite};

use crate::{
    host::{lifecycle::RemovalWatch, HostHandle},
    types::NetEntity,
};

use super::{
    config::SyncConfig,
    event::LinkEvent,
    owner::{OwnerStatus, OwnerWatch},
    resolution::{ResolvePoll, Resolution},
    scope::{CancelScope, ScopeSlot},
    sync_object::SyncObject,
    SyncError,
};

enum LinkState<E> {
    Empty,
    /// Replica side: the identifier is known, the entity is not (yet)
    Resolving(Resolution),
    /// Authority side: the entity has no identifier yet
    AwaitingSpawn(E),
    Bound {
        entity: E,
        watch: Option<RemovalWatch>,
    },
}

/// A replicated optional reference to another replicated entity.
///
/// The authority points the link at an entity with [`set`](Self::set); the
/// identifier is replicated and every replica resolves it back into its own
/// local handle, waiting across ticks if the entity has not arrived yet.
/// Both sides drop the reference on their own when the target is removed.
pub struct SyncLink<E: Copy + Eq + Hash> {
    config: SyncConfig,
    host: Option<HostHandle<E>>,
    owner: Option<OwnerWatch<E>>,
    authority: bool,
    state: LinkState<E>,
    agreed: Option<NetEntity>,
    dirty: bool,
    owner_scope: CancelScope,
    value_scope: ScopeSlot,
    events: Vec<LinkEvent<E>>,
}

impl<E: Copy + Eq + Hash> SyncLink<E> {
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    pub fn with_config(config: SyncConfig) -> Self {
        Self {
            config,
            host: None,
            owner: None,
            authority: false,
            state: LinkState::Empty,
            agreed: None,
            dirty: false,
            owner_scope: CancelScope::new(),
            value_scope: ScopeSlot::new(),
            events: Vec::new(),
        }
    }

    /// Binds the link to the host's entity lookup and lifecycle events
    pub fn attach_host(&mut self, host: HostHandle<E>) {
        self.host = Some(host);
    }

    /// Tears the link down when `owner` is removed, and resets it when a
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

    pub fn get(&self) -> Option<E> {
        match &self.state {
            LinkState::Bound { entity, .. } | LinkState::AwaitingSpawn(entity) => Some(*entity),
            LinkState::Empty | LinkState::Resolving(_) => None,
        }
    }

    pub fn has_value(&self) -> bool {
        self.get().is_some()
    }

    /// The identifier both sides currently agree on
    pub fn net_entity(&self) -> Option<NetEntity> {
        self.agreed
    }

    /// True while waiting for a received identifier to appear locally
    pub fn is_resolving(&self) -> bool {
        matches!(self.state, LinkState::Resolving(_))
    }

    pub fn take_events(&mut self) -> Vec<LinkEvent<E>> {
        std::mem::take(&mut self.events)
    }

    // Mutation

    /// Points the link at `entity`. Authority only.
    pub fn set(&mut self, entity: &E) -> Result<(), SyncError> {
        self.check_authority("set")?;

        if self.get() == Some(*entity) {
            return Ok(());
        }

        // drops the previous value's watch along with its scope
        self.value_scope.renew(&self.owner_scope);

        match self
            .host
            .as_ref()
            .and_then(|host| host.net_entity(entity))
        {
            Some(net_entity) => {
                let watch = self.host.as_ref().map(|host| host.on_removed(entity));
                self.state = LinkState::Bound {
                    entity: *entity,
                    watch,
                };
                self.agreed = Some(net_entity);
            }
            None => {
                self.state = LinkState::AwaitingSpawn(*entity);
                self.agreed = None;
            }
        }

        self.dirty = true;
        self.events.push(LinkEvent::Changed(Some(*entity)));
        Ok(())
    }

    /// Clears the link. Authority only.
    pub fn set_to_none(&mut self) -> Result<(), SyncError> {
        self.check_authority("set_to_none")?;

        if matches!(self.state, LinkState::Empty) && self.agreed.is_none() {
            return Ok(());
        }

        self.value_scope.cancel();
        self.state = LinkState::Empty;
        self.agreed = None;
        self.dirty = true;
        self.events.push(LinkEvent::Changed(None));
        Ok(())
    }

    /// Cancels every wait and clears all state. Until [`reset`](SyncObject::reset)
    /// is called, received identifiers are recorded but never bound.
    pub fn teardown(&mut self) {
        self.owner_scope.cancel();
        self.value_scope.cancel();
        self.state = LinkState::Empty;
        self.agreed = None;
        self.dirty = false;
    }

    fn check_authority(&self, operation: &'static str) -> Result<(), SyncError> {
        if !self.authority {
            return Err(SyncError::NotAuthoritative { operation });
        }
        Ok(())
    }

    // Receiving

    fn receive(&mut self, net_entity: Option<NetEntity>) {
        if net_entity == self.agreed {
            return;
        }

        let had_value = self.has_value();
        let scope = self.value_scope.renew(&self.owner_scope);
        self.agreed = net_entity;

        let Some(net_entity) = net_entity else {
            self.state = LinkState::Empty;
            self.events.push(LinkEvent::Changed(None));
            return;
        };

        let mut resolution = Resolution::new(net_entity, scope);
        match resolution.poll(self.host.as_deref(), &self.config) {
            ResolvePoll::Ready(entity) => {
                if !self.bind(entity) && had_value {
                    self.events.push(LinkEvent::Changed(None));
                }
            }
            ResolvePoll::Pending => {
                self.state = LinkState::Resolving(resolution);
                if had_value {
                    self.events.push(LinkEvent::Changed(None));
                }
            }
            ResolvePoll::Cancelled => {
                self.state = LinkState::Empty;
            }
        }
    }

    /// Returns false, leaving the link empty, if `entity` is already removed
    fn bind(&mut self, entity: E) -> bool {
        let watch = self.host.as_ref().map(|host| host.on_removed(&entity));
        if watch.as_ref().is_some_and(|watch| watch.has_fired()) {
            info!("SyncLink: {:?} resolved to a removed entity, staying empty", self.agreed);
            self.value_scope.cancel();
            self.state = LinkState::Empty;
            self.agreed = None;
            return false;
        }
        self.state = LinkState::Bound { entity, watch };
        self.events.push(LinkEvent::Changed(Some(entity)));
        true
    }

    // Ticking

    fn poll_owner(&mut self) {
        let Some(owner) = self.owner.as_mut() else {
            return;
        };
        match owner.poll() {
            OwnerStatus::Alive => {}
            OwnerStatus::Removed => {
                info!("SyncLink: owner removed, tearing down");
                self.teardown();
            }
            OwnerStatus::Respawned => {
                info!("SyncLink: owner respawned, resetting");
                let entity = owner.entity();
                let watch = self.host.as_ref().map(|host| host.on_removed(&entity));
                if let (Some(owner), Some(watch)) = (self.owner.as_mut(), watch) {
                    owner.rewatch(watch);
                }
                self.reset();
            }
        }
    }

    fn poll_state(&mut self) {
        let state = std::mem::replace(&mut self.state, LinkState::Empty);
        self.state = match state {
            LinkState::Empty => LinkState::Empty,
            LinkState::Resolving(mut resolution) => {
                match resolution.poll(self.host.as_deref(), &self.config) {
                    ResolvePoll::Ready(entity) => {
                        info!(
                            "SyncLink: {:?} resolved after {} ticks",
                            resolution.net_entity(),
                            resolution.waited_ticks()
                        );
                        // the value was already reported cleared when the wait began
                        self.bind(entity);
                        return;
                    }
                    ResolvePoll::Pending => LinkState::Resolving(resolution),
                    ResolvePoll::Cancelled => LinkState::Empty,
                }
            }
            LinkState::AwaitingSpawn(entity) => {
                match self.host.as_ref().and_then(|host| host.net_entity(&entity)) {
                    Some(net_entity) => {
                        self.agreed = Some(net_entity);
                        self.dirty = true;
                        let watch = self.host.as_ref().map(|host| host.on_removed(&entity));
                        LinkState::Bound { entity, watch }
                    }
                    None => LinkState::AwaitingSpawn(entity),
                }
            }
            LinkState::Bound { entity, watch } => {
                if !self.value_scope.is_live() {
                    LinkState::Empty
                } else {
                    let watch = watch
                        .or_else(|| self.host.as_ref().map(|host| host.on_removed(&entity)));
                    if watch.as_ref().is_some_and(|watch| watch.has_fired()) {
                        self.on_target_removed();
                        LinkState::Empty
                    } else {
                        LinkState::Bound { entity, watch }
                    }
                }
            }
        };
    }

    fn on_target_removed(&mut self) {
        self.value_scope.cancel();
        self.agreed = None;
        // only the authority turns a local removal into outgoing traffic
        if self.authority {
            self.dirty = true;
        }
        self.events.push(LinkEvent::Changed(None));
    }
}

impl<E: Copy + Eq + Hash> Default for SyncLink<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Copy + Eq + Hash> SyncObject for SyncLink<E> {
    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn flush(&mut self) {
        self.dirty = false;
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

    fn serialize_full(&self, writer: &mut dyn ByteWrite) {
        if matches!(self.state, LinkState::AwaitingSpawn(_)) {
            warn!("SyncLink: serializing a link whose target has no identifier yet, sending none");
        }
        NetEntity::ser_optional(self.agreed, writer);
    }

    fn serialize_delta(&self, writer: &mut dyn ByteWrite) {
        self.serialize_full(writer);
    }

    fn deserialize_full(&mut self, reader: &mut ByteReader) -> Result<(), SyncError> {
        let net_entity = NetEntity::de_optional(reader)?;
        self.receive(net_entity);
        Ok(())
    }

    fn deserialize_delta(&mut self, reader: &mut ByteReader) -> Result<(), SyncError> {
        self.deserialize_full(reader)
    }

    fn update(&mut self) {
        self.poll_owner();
        self.poll_state();
    }
}
