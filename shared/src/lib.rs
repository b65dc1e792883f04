//! # Synclink Shared
//! Replicated entity references for an authoritative networking host.
//!
//! The host owns the entities, assigns them network identifiers and moves
//! bytes between peers. This crate provides the cells that live on those
//! entities and keep references between them in sync.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use synclink_serde::{
    ByteReader, ByteWrite, ByteWriter, Serde, SerdeErr, VarU32, MAX_VAR_U32_BYTES,
};

mod host;
mod sync;
mod types;

pub use host::{
    entity_lookup::EntityLookup,
    lifecycle::{LifecycleEvents, LifecycleRegistry, RemovalWatch},
    HostHandle, ReplicationHost,
};
pub use sync::{
    CancelScope, Change, ChangeLog, LinkEvent, LinksEvent, NetworkClock, Predict, ResolvePoll,
    Resolution, ScopeRegistry, ScopeSlot, SetOperation, SyncConfig, SyncError, SyncLink,
    SyncLinks, SyncObject, SyncVar, SyncVarPredictive, VarEvent,
};
pub use types::NetEntity;
