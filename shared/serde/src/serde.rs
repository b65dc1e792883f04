use crate::{byte_reader::ByteReader, byte_writer::ByteWrite, error::SerdeErr};

/// A type that can be written to and read from a byte cursor.
pub trait Serde: Sized + Clone + PartialEq {
    /// Writes the value into the outgoing byte stream
    fn ser(&self, writer: &mut dyn ByteWrite);

    /// Reads a value back from the incoming byte stream
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;
}
