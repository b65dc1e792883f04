use thiserror::Error;

use synclink_serde::SerdeErr;

/// Errors that can occur when mutating or deserializing a replicated cell
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Attempted to mutate a cell on a side that does not own it
    #[error("Must have authority over the cell before calling {operation}()")]
    NotAuthoritative { operation: &'static str },

    /// The operation needs the host's entity lookup, but none was attached
    #[error("Cannot {operation}() before a host is attached. Call `attach_host()` first")]
    HostNotAttached { operation: &'static str },

    /// The entity has not been assigned an identifier by the host yet
    #[error("Entity has no network identifier yet, so it cannot be added to a replicated set")]
    EntityNotReplicated,

    /// A delta batch contained an operation code we don't know
    #[error("Unknown set operation code {code} in delta batch")]
    UnknownOperation { code: u8 },

    /// A count read off the wire is larger than the configured limit
    #[error("Batch of {count} entries exceeds the limit of {limit}")]
    BatchTooLarge { count: u32, limit: u32 },

    /// The underlying byte cursor failed
    #[error("Malformed sync message: {0}")]
    Serde(#[from] SerdeErr),
}
