use synclink_serde::{ByteReader, ByteWrite};

use super::SyncError;

/// The contract between a replicated cell and the replication driver.
///
/// The driver calls `serialize_full` once when a replica starts observing
/// the owning entity and `serialize_delta` on every later tick where
/// `is_dirty()`. It calls `flush` only after the delta bytes were handed to
/// the transport; flushing earlier would lose the change on a dropped send.
pub trait SyncObject {
    /// True while there are changes that have not been flushed
    fn is_dirty(&self) -> bool;

    /// Forgets pending changes after a successful send
    fn flush(&mut self);

    /// Returns the cell to its freshly-constructed state
    fn reset(&mut self);

    fn has_authority(&self) -> bool;

    fn set_authority(&mut self, authority: bool);

    fn serialize_full(&self, writer: &mut dyn ByteWrite);

    fn serialize_delta(&self, writer: &mut dyn ByteWrite);

    /// Errors are protocol-fatal: the driver should drop the channel
    fn deserialize_full(&mut self, reader: &mut ByteReader) -> Result<(), SyncError>;

    /// Errors are protocol-fatal: the driver should drop the channel
    fn deserialize_delta(&mut self, reader: &mut ByteReader) -> Result<(), SyncError>;

    /// Advances deferred work by one scheduling tick
    fn update(&mut self) {}
}
