use crate::error::SerdeErr;

/// Borrowing cursor over an incoming byte buffer.
pub struct ByteReader<'b> {
    buffer: &'b [u8],
    offset: usize,
}

impl<'b> ByteReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let Some(byte) = self.buffer.get(self.offset) else {
            return Err(SerdeErr::UnexpectedEnd {
                offset: self.offset,
                needed: 1,
            });
        };
        self.offset += 1;
        Ok(*byte)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'b [u8], SerdeErr> {
        let end = self.offset.saturating_add(len);
        if end > self.buffer.len() {
            return Err(SerdeErr::UnexpectedEnd {
                offset: self.offset,
                needed: end - self.buffer.len(),
            });
        }
        let bytes = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
