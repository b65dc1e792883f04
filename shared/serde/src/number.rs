use crate::{
    byte_reader::ByteReader, byte_writer::ByteWrite, error::SerdeErr, integer::VarU32,
    serde::Serde,
};

// Fixed-width numbers, little endian

macro_rules! impl_serde_fixed {
    ($($ty:ty),*) => {
        $(
            impl Serde for $ty {
                fn ser(&self, writer: &mut dyn ByteWrite) {
                    writer.write_bytes(&self.to_le_bytes());
                }

                fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                    let bytes = reader.read_bytes(std::mem::size_of::<$ty>())?;
                    let mut array = [0u8; std::mem::size_of::<$ty>()];
                    array.copy_from_slice(bytes);
                    Ok(<$ty>::from_le_bytes(array))
                }
            }
        )*
    };
}

impl_serde_fixed!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

// Bool

impl Serde for bool {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        writer.write_byte(u8::from(*self));
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(SerdeErr::InvalidValue { type_name: "bool" }),
        }
    }
}

// String

impl Serde for String {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        let length = u32::try_from(self.len()).unwrap_or(u32::MAX);
        VarU32::new(length).ser(writer);
        writer.write_bytes(&self.as_bytes()[..length as usize]);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = VarU32::de(reader)?.get() as usize;
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SerdeErr::InvalidValue {
            type_name: "String",
        })
    }
}

// Option

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        match self {
            Some(value) => {
                writer.write_byte(1);
                value.ser(writer);
            }
            None => writer.write_byte(0),
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(None),
            1 => Ok(Some(T::de(reader)?)),
            _ => Err(SerdeErr::InvalidValue { type_name: "Option" }),
        }
    }
}
