use synclink_serde::{ByteReader, ByteWrite, Serde};

use super::{event::VarEvent, sync_object::SyncObject, SyncError};

/// A replicated plain value. Delta and full state are the same: the value.
pub struct SyncVar<T: Serde> {
    initial: T,
    value: T,
    authority: bool,
    dirty: bool,
    events: Vec<VarEvent<T>>,
}

impl<T: Serde> SyncVar<T> {
    pub fn new(value: T) -> Self {
        Self {
            initial: value.clone(),
            value,
            authority: false,
            dirty: false,
            events: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Authority only. Setting an equal value is a no-op.
    pub fn set(&mut self, value: T) -> Result<(), SyncError> {
        if !self.authority {
            return Err(SyncError::NotAuthoritative { operation: "set" });
        }
        if value == self.value {
            return Ok(());
        }
        self.value = value.clone();
        self.dirty = true;
        self.events.push(VarEvent::Changed(value));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<VarEvent<T>> {
        std::mem::take(&mut self.events)
    }
}

impl<T: Serde + Default> Default for SyncVar<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Serde> SyncObject for SyncVar<T> {
    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn flush(&mut self) {
        self.dirty = false;
    }

    fn reset(&mut self) {
        self.value = self.initial.clone();
        self.dirty = false;
    }

    fn has_authority(&self) -> bool {
        self.authority
    }

    fn set_authority(&mut self, authority: bool) {
        self.authority = authority;
    }

    fn serialize_full(&self, writer: &mut dyn ByteWrite) {
        self.value.ser(writer);
    }

    fn serialize_delta(&self, writer: &mut dyn ByteWrite) {
        self.serialize_full(writer);
    }

    fn deserialize_full(&mut self, reader: &mut ByteReader) -> Result<(), SyncError> {
        let value = T::de(reader)?;
        if value == self.value {
            return Ok(());
        }
        self.value = value.clone();
        self.events.push(VarEvent::Changed(value));
        Ok(())
    }

    fn deserialize_delta(&mut self, reader: &mut ByteReader) -> Result<(), SyncError> {
        self.deserialize_full(reader)
    }
}
