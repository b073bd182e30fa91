// SPDX-License-Identifier: Apache-2.0

//! Decoded ABI values.

use crate::types::{ArrayLength, Type, SLOT};
use num_bigint::BigInt;
use std::fmt;

/// A single decoded value, mirroring the shape of the [Type] it was decoded
/// against. Integers carry their declared width so that a token round-trips
/// through the encoder without consulting the schema again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address([u8; 20]),
    Int { width: u16, value: BigInt },
    Uint { width: u16, value: BigInt },
    Bool(bool),
    /// An enum tag. In lenient mode this may lie outside the declared member
    /// range; the caller must not assume it names a member.
    Enum(u8),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    FixedArray(Vec<Token>),
    Array(Vec<Token>),
    Tuple(Vec<Token>),
}

impl Token {
    /// Does the encoding of this value have variable length
    pub fn is_dynamic(&self) -> bool {
        match self {
            Token::Bytes(_) | Token::String(_) | Token::Array(_) => true,
            Token::FixedArray(elems) | Token::Tuple(elems) => {
                elems.iter().any(Token::is_dynamic)
            }
            _ => false,
        }
    }

    /// The number of bytes this value occupies in its enclosing head region
    pub(crate) fn encoded_fixed_length(&self) -> usize {
        if self.is_dynamic() {
            return SLOT;
        }

        match self {
            Token::FixedArray(elems) | Token::Tuple(elems) => {
                elems.iter().map(Token::encoded_fixed_length).sum()
            }
            _ => SLOT,
        }
    }

    /// Check that this value conforms to the given type
    pub fn type_check(&self, ty: &Type) -> bool {
        match (self, ty) {
            (Token::Uint { width, .. }, Type::Uint(w)) => width == w,
            (Token::Int { width, .. }, Type::Int(w)) => width == w,
            (Token::Address(_), Type::Address) => true,
            (Token::Bool(_), Type::Bool) => true,
            (Token::Enum(_), Type::Enum(_)) => true,
            (Token::FixedBytes(bytes), Type::Bytes(len)) => bytes.len() == *len as usize,
            (Token::Bytes(_), Type::DynamicBytes) => true,
            (Token::String(_), Type::String) => true,
            (Token::FixedArray(elems), Type::Array(elem, ArrayLength::Fixed(dim))) => {
                elems.len() == *dim as usize && elems.iter().all(|e| e.type_check(elem))
            }
            (Token::Array(elems), Type::Array(elem, ArrayLength::Dynamic)) => {
                elems.iter().all(|e| e.type_check(elem))
            }
            (Token::Tuple(fields), Type::Tuple(tys)) => {
                fields.len() == tys.len()
                    && fields.iter().zip(tys).all(|(field, ty)| field.type_check(ty))
            }
            _ => false,
        }
    }

    pub fn into_bigint(self) -> Option<BigInt> {
        match self {
            Token::Uint { value, .. } => Some(value),
            Token::Int { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn into_address(self) -> Option<[u8; 20]> {
        match self {
            Token::Address(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            Token::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_enum(self) -> Option<u8> {
        match self {
            Token::Enum(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_fixed_bytes(self) -> Option<Vec<u8>> {
        match self {
            Token::FixedBytes(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Token::Bytes(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Token::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_fixed_array(self) -> Option<Vec<Token>> {
        match self {
            Token::FixedArray(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Token>> {
        match self {
            Token::Array(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_tuple(self) -> Option<Vec<Token>> {
        match self {
            Token::Tuple(value) => Some(value),
            _ => None,
        }
    }
}

/// Check that the given values conform to the parameter list, pairwise and
/// in order. This is the conformance gate in front of the encoder.
pub fn types_check(tokens: &[Token], types: &[Type]) -> bool {
    tokens.len() == types.len()
        && tokens
            .iter()
            .zip(types)
            .all(|(token, ty)| token.type_check(ty))
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Address(address) => write!(f, "0x{}", hex::encode(address)),
            Token::Int { value, .. } | Token::Uint { value, .. } => write!(f, "{value}"),
            Token::Bool(value) => write!(f, "{value}"),
            Token::Enum(tag) => write!(f, "{tag}"),
            Token::FixedBytes(bytes) | Token::Bytes(bytes) => {
                write!(f, "hex\"{}\"", hex::encode(bytes))
            }
            Token::String(value) => write!(f, "{value:?}"),
            Token::FixedArray(elems) | Token::Array(elems) => {
                write!(f, "[")?;
                for (no, elem) in elems.iter().enumerate() {
                    if no > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, "]")
            }
            Token::Tuple(fields) => {
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
