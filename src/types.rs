// SPDX-License-Identifier: Apache-2.0

//! Resolved ABI type descriptions and their encoded layout.

use std::fmt;

/// Every value is encoded into one or more 32 byte slots.
pub(crate) const SLOT: usize = 32;

/// The length of an array dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayLength {
    Fixed(u32),
    Dynamic,
}

/// Description of a single ABI type, as resolved by the type checker. The
/// coder never mutates these; one tree describes one parameter for the
/// lifetime of a function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Unsigned integer, width in bits. The width is a multiple of 8 up to 256.
    Uint(u16),
    /// Signed two's complement integer, width in bits
    Int(u16),
    /// 160 bit address, occupying the low bytes of its slot
    Address,
    Bool,
    /// Fixed size byte string `bytesN` with N between 1 and 32, left
    /// aligned in its slot
    Bytes(u8),
    /// Enumeration with the given number of members, encoded like uint8
    Enum(u16),
    /// Variable length byte string
    DynamicBytes,
    String,
    Array(Box<Type>, ArrayLength),
    /// Ordered fields, e.g. a struct
    Tuple(Vec<Type>),
}

impl Type {
    /// Does the encoding of this type have variable length
    pub fn is_dynamic(&self) -> bool {
        match self {
            Type::String | Type::DynamicBytes => true,
            Type::Array(_, ArrayLength::Dynamic) => true,
            Type::Array(elem, ArrayLength::Fixed(_)) => elem.is_dynamic(),
            Type::Tuple(fields) => fields.iter().any(Type::is_dynamic),
            _ => false,
        }
    }

    /// Return the encoded length of this type, fixed part only: the number
    /// of bytes it occupies in its enclosing head region. A dynamic type
    /// occupies a single slot there, holding the offset of its tail. Always
    /// a multiple of 32.
    pub fn encoded_fixed_length(&self) -> usize {
        if self.is_dynamic() {
            return SLOT;
        }

        match self {
            Type::Array(elem, ArrayLength::Fixed(dim)) => {
                (*dim as usize).saturating_mul(elem.encoded_fixed_length())
            }
            Type::Tuple(fields) => fields
                .iter()
                .map(Type::encoded_fixed_length)
                .fold(0, usize::saturating_add),
            _ => SLOT,
        }
    }
}

impl fmt::Display for Type {
    /// The canonical signature fragment for this type, as written into the
    /// contract metadata
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Uint(width) => write!(f, "uint{width}"),
            Type::Int(width) => write!(f, "int{width}"),
            Type::Address => write!(f, "address"),
            Type::Bool => write!(f, "bool"),
            Type::Bytes(length) => write!(f, "bytes{length}"),
            Type::Enum(_) => write!(f, "uint8"),
            Type::DynamicBytes => write!(f, "bytes"),
            Type::String => write!(f, "string"),
            Type::Array(elem, ArrayLength::Fixed(dim)) => write!(f, "{elem}[{dim}]"),
            Type::Array(elem, ArrayLength::Dynamic) => write!(f, "{elem}[]"),
            Type::Tuple(fields) => {
                write!(f, "(")?;
                for (no, field) in fields.iter().enumerate() {
                    if no > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, ")")
            }
        }
    }
}
