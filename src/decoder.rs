// SPDX-License-Identifier: Apache-2.0

//! The recursive ABI decoder.
//!
//! The buffer is a tree of head/tail regions: every value owns one head slot
//! in its enclosing region, which either holds the value itself or, for
//! dynamic types, the offset of the value's tail relative to the start of
//! that region. The decoder walks this tree with an explicit region anchor
//! rather than a running cursor, so every bounds check is local to the read
//! it guards. A buffer must never be read past its end: in strict mode any
//! short read or out of range reference is an error, in lenient mode missing
//! bytes read as zero, like CALLDATALOAD.

use crate::errors::Error;
use crate::token::Token;
use crate::types::{ArrayLength, Type, SLOT};
use crate::DecodeMode;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

/// Decode the buffer against the given parameter list. The buffer itself is
/// the outermost region, anchored at offset 0.
pub fn decode(types: &[Type], data: &[u8], mode: DecodeMode) -> Result<Vec<Token>, Error> {
    decode_fields(types, data, 0, mode)
}

/// Decode a parameter list laid out in the region starting at `region`: one
/// head slot per parameter, tails following the head slots. The top level
/// parameter list and a tuple's fields follow the same discipline.
fn decode_fields(
    fields: &[Type],
    data: &[u8],
    region: usize,
    mode: DecodeMode,
) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::with_capacity(fields.len());
    let mut offset = 0;

    for field in fields {
        tokens.push(decode_ty(field, data, region, offset, mode)?);
        offset = offset
            .checked_add(field.encoded_fixed_length())
            .ok_or(Error::OutOfBounds)?;
    }

    Ok(tokens)
}

/// Recursively decode a single value. `head_offset` is the position of the
/// value's head slot within the region starting at `region`.
fn decode_ty(
    ty: &Type,
    data: &[u8],
    region: usize,
    head_offset: usize,
    mode: DecodeMode,
) -> Result<Token, Error> {
    let head = region.checked_add(head_offset).ok_or(Error::OutOfBounds)?;

    if ty.is_dynamic() {
        // the head slot holds the offset of the value's tail, relative to
        // the start of the enclosing region
        let slot = read_slot(data, head, mode)?;
        let offset = to_offset(BigUint::from_bytes_be(&slot))?;
        let tail = region.checked_add(offset).ok_or(Error::OutOfBounds)?;

        if mode == DecodeMode::Strict {
            // the tail's own head region must be present before the offset
            // is followed anywhere
            check_overrun(data, tail, tail_fixed_length(ty))?;
        }

        return decode_tail(ty, data, tail, mode);
    }

    match ty {
        Type::Array(elem, ArrayLength::Fixed(dim)) => {
            // a static fixed array is its elements in consecutive head
            // slots, with no length prefix
            decode_elements(elem, *dim as usize, data, head, mode).map(Token::FixedArray)
        }
        Type::Tuple(fields) => {
            // a static tuple is flattened into the enclosing head region
            decode_fields(fields, data, head, mode).map(Token::Tuple)
        }
        _ => decode_primitive(ty, data, head, mode),
    }
}

/// Decode a dynamic value from its tail at `tail`, which is also the region
/// its own members' offsets are relative to.
fn decode_tail(ty: &Type, data: &[u8], tail: usize, mode: DecodeMode) -> Result<Token, Error> {
    match ty {
        Type::DynamicBytes => decode_bytes(data, tail, mode).map(Token::Bytes),
        Type::String => {
            let bytes = decode_bytes(data, tail, mode)?;
            let value = match mode {
                DecodeMode::Strict => {
                    String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?
                }
                DecodeMode::Lenient => String::from_utf8_lossy(&bytes).into_owned(),
            };
            Ok(Token::String(value))
        }
        Type::Array(elem, ArrayLength::Fixed(dim)) => {
            // the element type is dynamic, otherwise the array would not
            // be: the tail holds one offset slot per element
            decode_elements(elem, *dim as usize, data, tail, mode).map(Token::FixedArray)
        }
        Type::Array(elem, ArrayLength::Dynamic) => {
            // element count, then the elements as their own region anchored
            // right after the count
            let slot = read_slot(data, tail, mode)?;
            let length = to_offset(BigUint::from_bytes_be(&slot))?;
            let region = tail.checked_add(SLOT).ok_or(Error::OutOfBounds)?;
            decode_elements(elem, length, data, region, mode).map(Token::Array)
        }
        Type::Tuple(fields) => decode_fields(fields, data, tail, mode).map(Token::Tuple),
        _ => unreachable!("static types have no tail"),
    }
}

/// Decode `length` array elements laid out in the region starting at
/// `region`.
fn decode_elements(
    elem: &Type,
    length: usize,
    data: &[u8],
    region: usize,
    mode: DecodeMode,
) -> Result<Vec<Token>, Error> {
    let size = elem.encoded_fixed_length();

    // a length that cannot even fit its head slots is rejected before
    // anything is allocated
    let head_length = length.checked_mul(size).ok_or(Error::OutOfBounds)?;
    if mode == DecodeMode::Strict {
        check_overrun(data, region, head_length)?;
    }

    let mut elems = Vec::with_capacity(length);
    let mut offset = 0;
    for _ in 0..length {
        elems.push(decode_ty(elem, data, region, offset, mode)?);
        offset += size;
    }

    Ok(elems)
}

/// Decode a single primitive, which is always encoded in one 32 byte slot.
fn decode_primitive(
    ty: &Type,
    data: &[u8],
    offset: usize,
    mode: DecodeMode,
) -> Result<Token, Error> {
    let slot = read_slot(data, offset, mode)?;

    match ty {
        Type::Uint(width) => {
            let value = BigUint::from_bytes_be(&slot);
            let value = match mode {
                DecodeMode::Strict => {
                    if !(&value >> *width as usize).is_zero() {
                        return Err(Error::InvalidPadding);
                    }
                    value
                }
                DecodeMode::Lenient => value & bits_mask(*width as usize),
            };
            Ok(Token::Uint {
                width: *width,
                value: value.into(),
            })
        }
        Type::Int(width) => {
            let width = *width as usize;
            let value = BigUint::from_bytes_be(&slot);

            if mode == DecodeMode::Strict {
                // everything above the value's sign bit must replicate it
                let extension = &value >> (width - 1);
                if !extension.is_zero() && extension != bits_mask(257 - width) {
                    return Err(Error::InvalidPadding);
                }
            }

            let value = value & bits_mask(width);
            let value = if (&value >> (width - 1)).is_one() {
                BigInt::from(value) - (BigInt::one() << width)
            } else {
                BigInt::from(value)
            };
            Ok(Token::Int {
                width: width as u16,
                value,
            })
        }
        Type::Address => {
            // unconditionally drop everything above the low 160 bits
            let mut address = [0u8; 20];
            address.copy_from_slice(&slot[12..]);
            Ok(Token::Address(address))
        }
        Type::Bool => {
            let value = match mode {
                DecodeMode::Strict => {
                    if slot[..SLOT - 1].iter().any(|b| *b != 0) || slot[SLOT - 1] > 1 {
                        return Err(Error::InvalidBool);
                    }
                    slot[SLOT - 1] == 1
                }
                DecodeMode::Lenient => slot.iter().any(|b| *b != 0),
            };
            Ok(Token::Bool(value))
        }
        Type::Enum(members) => {
            let tag = match mode {
                DecodeMode::Strict => {
                    let value = BigUint::from_bytes_be(&slot);
                    if value >= BigUint::from(*members) {
                        return Err(Error::InvalidEnum);
                    }
                    value.to_u8().ok_or(Error::InvalidEnum)?
                }
                // the first generation decoder only ever read the low byte
                DecodeMode::Lenient => slot[SLOT - 1],
            };
            Ok(Token::Enum(tag))
        }
        Type::Bytes(length) => Ok(Token::FixedBytes(slot[..*length as usize].to_vec())),
        _ => unreachable!("not a primitive type"),
    }
}

/// Decode a `bytes` or `string` tail: a 32 byte length followed by the raw
/// bytes, right padded to a whole number of slots.
fn decode_bytes(data: &[u8], tail: usize, mode: DecodeMode) -> Result<Vec<u8>, Error> {
    let slot = read_slot(data, tail, mode)?;
    let length = to_offset(BigUint::from_bytes_be(&slot))?;
    let offset = tail.checked_add(SLOT).ok_or(Error::OutOfBounds)?;

    if mode == DecodeMode::Strict {
        // the padding counts towards the required size
        let padded = Integer::div_ceil(&length, &SLOT)
            .checked_mul(SLOT)
            .ok_or(Error::OutOfBounds)?;
        check_overrun(data, offset, padded)?;
    }

    let mut bytes = vec![0u8; length];
    read_exact(data, offset, &mut bytes, mode)?;
    Ok(bytes)
}

/// The size of a dynamic type's own head region: what must minimally be
/// present at its tail.
fn tail_fixed_length(ty: &Type) -> usize {
    match ty {
        // the length word
        Type::DynamicBytes | Type::String | Type::Array(_, ArrayLength::Dynamic) => SLOT,
        Type::Array(elem, ArrayLength::Fixed(dim)) => {
            (*dim as usize).saturating_mul(elem.encoded_fixed_length())
        }
        Type::Tuple(fields) => fields
            .iter()
            .map(Type::encoded_fixed_length)
            .fold(0, usize::saturating_add),
        _ => unreachable!("static types have no tail"),
    }
}

/// Read the 32 byte slot at `offset`.
fn read_slot(data: &[u8], offset: usize, mode: DecodeMode) -> Result<[u8; SLOT], Error> {
    let mut slot = [0u8; SLOT];
    read_exact(data, offset, &mut slot, mode)?;
    Ok(slot)
}

/// Copy `buffer.len()` bytes from `data` at `offset`. Strict mode requires
/// the whole range to be within the buffer; lenient mode zero fills whatever
/// is missing.
fn read_exact(
    data: &[u8],
    offset: usize,
    buffer: &mut [u8],
    mode: DecodeMode,
) -> Result<(), Error> {
    let end = offset.checked_add(buffer.len()).ok_or(Error::OutOfBounds)?;
    if end <= data.len() {
        buffer.copy_from_slice(&data[offset..end]);
        return Ok(());
    }

    if mode == DecodeMode::Strict {
        return Err(Error::OutOfBounds);
    }

    // missing calldata reads as zero
    buffer.fill(0);
    if offset < data.len() {
        let present = data.len() - offset;
        buffer[..present].copy_from_slice(&data[offset..]);
    }
    Ok(())
}

/// Narrow a slot value to a usize offset or length. A value that does not
/// fit cannot address anything within the buffer.
fn to_offset(value: BigUint) -> Result<usize, Error> {
    value.to_usize().ok_or(Error::OutOfBounds)
}

/// Check that reading `length` bytes at `offset` stays within the buffer.
fn check_overrun(data: &[u8], offset: usize, length: usize) -> Result<(), Error> {
    let end = offset.checked_add(length).ok_or(Error::OutOfBounds)?;
    if end > data.len() {
        return Err(Error::OutOfBounds);
    }
    Ok(())
}

/// The lowest `bits` bits set.
fn bits_mask(bits: usize) -> BigUint {
    (BigUint::one() << bits) - 1u32
}
