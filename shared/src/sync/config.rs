//! # `SyncConfig` – tuning knobs shared by every replicated cell
//!
//! Cells are cheap and numerous (one per reference field on every
//! replicated entity), so the config is a small `Copy` struct cloned into
//! each cell at construction; there is no run-time mutation.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncConfig {
    /// *Ticks an identifier may stay unresolved before a warning is logged.*
    /// The wait itself never times out; only cancellation ends it. This only
    /// controls when a reference that never shows up gets reported.
    pub unresolved_warn_ticks: u32,
    /// *Upper bound on any element count read from the wire.*
    /// A peer announcing more entries than this is treated as malformed and
    /// the message is rejected before anything is allocated.
    pub max_batch_len: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            // five seconds at 60 ticks per second
            unresolved_warn_ticks: 300,
            max_batch_len: 65_536,
        }
    }
}

impl SyncConfig {
    pub(crate) fn check_batch_len(&self, count: u32) -> Result<(), super::SyncError> {
        if count > self.max_batch_len {
            return Err(super::SyncError::BatchTooLarge {
                count,
                limit: self.max_batch_len,
            });
        }
        Ok(())
    }
}
