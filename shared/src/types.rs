use std::{fmt, num::NonZeroU32};

use synclink_serde::{ByteReader, ByteWrite, Serde, SerdeErr, VarU32};

/// Identifier the authoritative side assigns to a replicated entity.
///
/// Zero is reserved on the wire for "no reference", so a `NetEntity` is
/// always non-zero and an absent reference is `Option<NetEntity>::None`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetEntity(NonZeroU32);

impl NetEntity {
    /// Returns `None` for the reserved value `0`
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn to_u32(&self) -> u32 {
        self.0.get()
    }

    /// Writes an optional identifier as a single var-length integer, `0` for none.
    pub fn ser_optional(net_entity: Option<NetEntity>, writer: &mut dyn ByteWrite) {
        let raw = net_entity.map_or(0, |net_entity| net_entity.to_u32());
        VarU32::new(raw).ser(writer);
    }

    pub fn de_optional(reader: &mut ByteReader) -> Result<Option<NetEntity>, SerdeErr> {
        let raw = VarU32::de(reader)?.get();
        Ok(Self::new(raw))
    }
}

impl From<NonZeroU32> for NetEntity {
    fn from(value: NonZeroU32) -> Self {
        Self(value)
    }
}

impl fmt::Debug for NetEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetEntity({})", self.0)
    }
}

impl fmt::Display for NetEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
