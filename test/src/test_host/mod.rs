//! In-memory host for exercising replicated cells
//! Plays the role of one peer's entity world: spawns entities, assigns
//! identifiers and fires removal signals on demand.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use synclink_shared::{
    EntityLookup, HostHandle, LifecycleEvents, LifecycleRegistry, NetEntity, RemovalWatch,
};

// TestEntity - Simple u64-based entity
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct TestEntity(u64);

impl TestEntity {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Default)]
struct HostState {
    by_net_entity: HashMap<NetEntity, TestEntity>,
    net_entities: HashMap<TestEntity, NetEntity>,
    lifecycle: LifecycleRegistry<TestEntity>,
    lookups: usize,
}

// TestHost - HashMap-based world behind a lock, shared with the cells
#[derive(Default)]
pub struct TestHost {
    state: RwLock<HostState>,
}

impl TestHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn handle(self: &Arc<Self>) -> HostHandle<TestEntity> {
        self.clone()
    }

    /// Spawns a local entity that has no network identifier yet
    pub fn spawn(&self, id: u64) -> TestEntity {
        let entity = TestEntity::new(id);
        self.state.write().unwrap().lifecycle.spawn(entity);
        entity
    }

    /// Assigns `net_id` to an already spawned entity
    pub fn register(&self, entity: TestEntity, net_id: u32) -> NetEntity {
        let net_entity = NetEntity::new(net_id).expect("net id must be non-zero");
        let mut state = self.state.write().unwrap();
        state.by_net_entity.insert(net_entity, entity);
        state.net_entities.insert(entity, net_entity);
        net_entity
    }

    /// Spawns an entity and assigns it `net_id` in one step
    pub fn spawn_replicated(&self, id: u64, net_id: u32) -> TestEntity {
        let entity = self.spawn(id);
        self.register(entity, net_id);
        entity
    }

    /// Despawns `entity` into the pool. Its identifier stops resolving.
    pub fn despawn(&self, entity: TestEntity) {
        let mut state = self.state.write().unwrap();
        state.lifecycle.despawn(&entity);
        if let Some(net_entity) = state.net_entities.remove(&entity) {
            state.by_net_entity.remove(&net_entity);
        }
    }

    /// Destroys `entity` for good
    pub fn destroy(&self, entity: TestEntity) {
        let mut state = self.state.write().unwrap();
        state.lifecycle.forget(&entity);
        if let Some(net_entity) = state.net_entities.remove(&entity) {
            state.by_net_entity.remove(&net_entity);
        }
    }

    pub fn is_live(&self, entity: TestEntity) -> bool {
        self.state.read().unwrap().lifecycle.is_live(&entity)
    }

    /// Removal watches currently held on `entity`
    pub fn subscriber_count(&self, entity: TestEntity) -> usize {
        self.state.read().unwrap().lifecycle.subscriber_count(&entity)
    }

    /// Number of `try_resolve` calls served so far
    pub fn lookup_count(&self) -> usize {
        self.state.read().unwrap().lookups
    }
}

impl EntityLookup<TestEntity> for TestHost {
    fn try_resolve(&self, net_entity: NetEntity) -> Option<TestEntity> {
        let mut state = self.state.write().unwrap();
        state.lookups += 1;
        state.by_net_entity.get(&net_entity).copied()
    }

    fn net_entity(&self, entity: &TestEntity) -> Option<NetEntity> {
        self.state.read().unwrap().net_entities.get(entity).copied()
    }
}

impl LifecycleEvents<TestEntity> for TestHost {
    fn on_removed(&self, entity: &TestEntity) -> RemovalWatch {
        self.state.read().unwrap().lifecycle.on_removed(entity)
    }
}
