use synclink_serde::{ByteReader, ByteWrite, Serde, SerdeErr, VarU32};

use crate::types::NetEntity;

use super::SyncError;

/// Operation kinds carried in a set cell's delta batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SetOperation {
    Add = 0,
    Clear = 1,
    Remove = 2,
}

impl SetOperation {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, SyncError> {
        match code {
            0 => Ok(SetOperation::Add),
            1 => Ok(SetOperation::Clear),
            2 => Ok(SetOperation::Remove),
            _ => Err(SyncError::UnknownOperation { code }),
        }
    }

    /// ADD and REMOVE are followed by an identifier on the wire, CLEAR is not
    pub fn has_target(&self) -> bool {
        !matches!(self, SetOperation::Clear)
    }
}

/// One queued operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Change {
    pub operation: SetOperation,
    pub net_entity: Option<NetEntity>,
}

impl Change {
    pub fn new(operation: SetOperation, net_entity: Option<NetEntity>) -> Self {
        Self {
            operation,
            net_entity,
        }
    }

    pub fn ser(&self, writer: &mut dyn ByteWrite) {
        writer.write_byte(self.operation.code());
        if self.operation.has_target() {
            NetEntity::ser_optional(self.net_entity, writer);
        }
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, SyncError> {
        let operation = SetOperation::from_code(reader.read_byte()?)?;
        let net_entity = if operation.has_target() {
            NetEntity::de_optional(reader)?
        } else {
            None
        };
        Ok(Self::new(operation, net_entity))
    }
}

/// Operations produced by authoritative mutation, waiting to be sent.
///
/// Cleared once per successful outbound flush and on reset.
#[derive(Default)]
pub struct ChangeLog {
    changes: Vec<Change>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    pub fn push(&mut self, operation: SetOperation, net_entity: Option<NetEntity>) {
        self.changes.push(Change::new(operation, net_entity));
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }

    /// `[count]` followed by every change in order
    pub fn ser(&self, writer: &mut dyn ByteWrite) {
        write_len(self.changes.len(), writer);
        for change in &self.changes {
            change.ser(writer);
        }
    }
}

/// Writes a collection length as a var-length `u32`.
pub(crate) fn write_len(len: usize, writer: &mut dyn ByteWrite) {
    // collections never approach u32::MAX entries; saturate rather than wrap
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    VarU32::new(len).ser(writer);
}

pub(crate) fn read_len(reader: &mut ByteReader) -> Result<u32, SerdeErr> {
    Ok(VarU32::de(reader)?.get())
}
