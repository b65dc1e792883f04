//! # Synclink Serde
//! Ordered byte cursor used by synclink's replicated cells: a growable
//! writer, a borrowing reader, LEB128 variable-length integers and the
//! [`Serde`] trait for opaque scalar payloads.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod byte_reader;
mod byte_writer;
mod error;
mod integer;
mod number;
mod serde;

pub use byte_reader::ByteReader;
pub use byte_writer::{ByteWrite, ByteWriter};
pub use error::SerdeErr;
pub use integer::{VarU32, MAX_VAR_U32_BYTES};
pub use serde::Serde;
