//! # Replicated cells
//!
//! A cell is a field embedded in a replicated entity that the host
//! serializes whenever it is dirty and hands to the remote side.
//!
//! * [`SyncLink`] holds at most one reference to another entity.
//! * [`SyncLinks`] holds a set of references and replicates it as an
//!   ordered log of ADD/REMOVE/CLEAR operations.
//! * [`SyncVar`] and [`SyncVarPredictive`] hold plain values.
//!
//! References travel as [`NetEntity`](crate::NetEntity) identifiers. A
//! receiving cell may learn an identifier before the entity it names has
//! been spawned locally; the lookup is then retried on every `update()`
//! until it succeeds or its [`CancelScope`] is cancelled.

mod change_log;
mod config;
mod error;
mod event;
mod link;
mod links;
mod owner;
mod predictive;
mod resolution;
mod scope;
mod scope_registry;
mod sync_object;
mod var;

pub use change_log::{Change, ChangeLog, SetOperation};
pub use config::SyncConfig;
pub use error::SyncError;
pub use event::{LinkEvent, LinksEvent, VarEvent};
pub use link::SyncLink;
pub use links::SyncLinks;
pub use predictive::{NetworkClock, Predict, SyncVarPredictive};
pub use resolution::{ResolvePoll, Resolution};
pub use scope::{CancelScope, ScopeSlot};
pub use scope_registry::ScopeRegistry;
pub use sync_object::SyncObject;
pub use var::SyncVar;
