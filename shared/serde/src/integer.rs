use crate::{byte_reader::ByteReader, byte_writer::ByteWrite, error::SerdeErr, serde::Serde};

/// Longest LEB128 encoding of a `u32`.
pub const MAX_VAR_U32_BYTES: usize = 5;

/// Unsigned 32-bit integer written as LEB128: seven payload bits per byte,
/// high bit set while more bytes follow. Small values (identifiers, counts)
/// take a single byte.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct VarU32(u32);

impl VarU32 {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn encoded_len(&self) -> usize {
        let mut value = self.0 >> 7;
        let mut output = 1;
        while value != 0 {
            value >>= 7;
            output += 1;
        }
        output
    }
}

impl From<u32> for VarU32 {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<VarU32> for u32 {
    fn from(value: VarU32) -> Self {
        value.0
    }
}

impl Serde for VarU32 {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        let mut value = self.0;
        loop {
            let low = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                writer.write_byte(low);
                return;
            }
            writer.write_byte(low | 0x80);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let start = reader.offset();
        let mut output: u32 = 0;

        for index in 0..MAX_VAR_U32_BYTES {
            let byte = reader.read_byte()?;
            let payload = u32::from(byte & 0x7F);

            // the fifth byte only has room for the top four bits
            if index == MAX_VAR_U32_BYTES - 1 && payload > 0x0F {
                return Err(SerdeErr::VarIntOverflow { offset: start });
            }

            output |= payload << (7 * index);

            if byte & 0x80 == 0 {
                return Ok(Self(output));
            }
        }

        Err(SerdeErr::VarIntOverflow { offset: start })
    }
}

// Tests
