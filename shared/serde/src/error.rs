use thiserror::Error;

/// Errors raised while reading primitives off a byte cursor.
///
/// Any of these means the peer sent a malformed message; callers treat them
/// as protocol-fatal for the channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The buffer ended before the value was complete
    #[error("Unexpected end of buffer: needed {needed} more byte(s) at offset {offset}")]
    UnexpectedEnd { offset: usize, needed: usize },

    /// A variable-length integer did not fit in 32 bits
    #[error("Variable-length integer at offset {offset} overflows u32")]
    VarIntOverflow { offset: usize },

    /// The bytes decoded to a value the type cannot represent
    #[error("Invalid {type_name} value on the wire")]
    InvalidValue { type_name: &'static str },
}
