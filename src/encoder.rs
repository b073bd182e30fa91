// SPDX-License-Identifier: Apache-2.0

//! The recursive ABI encoder. Mirrors the decoder: one head slot per value,
//! dynamic tails appended after the head slots in declaration order, with
//! each head slot back-patched to the tail's offset within the region.
//! Encoding is the same in both decode modes and cannot fail; values outside
//! their declared domain are truncated to the slot rather than rejected,
//! since the type checker rules them out upstream.

use crate::token::Token;
use crate::types::SLOT;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;

/// ABI encode the given values into one buffer.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    encode_fields(tokens)
}

/// Encode a parameter list as one head/tail region. The top level parameter
/// list, a tuple's fields and an array's elements follow the same
/// discipline.
fn encode_fields(tokens: &[Token]) -> Vec<u8> {
    let head_length: usize = tokens.iter().map(Token::encoded_fixed_length).sum();

    let mut head = Vec::with_capacity(head_length);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            // the tail goes at the end of everything written so far; its
            // offset is relative to the start of this region
            encode_int(&BigInt::from(head_length + tail.len()), &mut head);
            encode_tail(token, &mut tail);
        } else {
            encode_ty(token, &mut head);
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Write a static value into the head region.
fn encode_ty(token: &Token, buffer: &mut Vec<u8>) {
    match token {
        Token::Uint { value, .. } | Token::Int { value, .. } => encode_int(value, buffer),
        Token::Address(address) => {
            buffer.resize(buffer.len() + SLOT - address.len(), 0);
            buffer.extend_from_slice(address);
        }
        Token::Bool(value) => {
            buffer.resize(buffer.len() + SLOT - 1, 0);
            buffer.push(*value as u8);
        }
        Token::Enum(tag) => {
            buffer.resize(buffer.len() + SLOT - 1, 0);
            buffer.push(*tag);
        }
        Token::FixedBytes(bytes) => {
            // left aligned in the slot
            let length = bytes.len().min(SLOT);
            buffer.extend_from_slice(&bytes[..length]);
            buffer.resize(buffer.len() + SLOT - length, 0);
        }
        Token::FixedArray(elems) | Token::Tuple(elems) => {
            // static members only, flattened in place
            for elem in elems {
                encode_ty(elem, buffer);
            }
        }
        _ => unreachable!("dynamic values are encoded as tails"),
    }
}

/// Write a dynamic value's tail: its own head/tail region.
fn encode_tail(token: &Token, buffer: &mut Vec<u8>) {
    match token {
        Token::Bytes(bytes) => encode_bytes(bytes, buffer),
        Token::String(value) => encode_bytes(value.as_bytes(), buffer),
        Token::Array(elems) => {
            // length prefix, then the elements anchored right after it
            encode_int(&BigInt::from(elems.len()), buffer);
            buffer.extend_from_slice(&encode_fields(elems));
        }
        Token::FixedArray(elems) | Token::Tuple(elems) => {
            buffer.extend_from_slice(&encode_fields(elems));
        }
        _ => unreachable!("static values are encoded in place"),
    }
}

/// Write a byte string: a 32 byte length followed by the data, right padded
/// to a whole number of slots.
fn encode_bytes(bytes: &[u8], buffer: &mut Vec<u8>) {
    encode_int(&BigInt::from(bytes.len()), buffer);
    buffer.extend_from_slice(bytes);

    // round up the length to the next 32 bytes block
    let padded = Integer::div_ceil(&bytes.len(), &SLOT) * SLOT;
    buffer.resize(buffer.len() + padded - bytes.len(), 0);
}

/// Write `value` as a full big endian slot, two's complement for negative
/// values; the canonical zero or sign extension falls out of reducing into
/// the slot's modulus.
fn encode_int(value: &BigInt, buffer: &mut Vec<u8>) {
    let modulus = BigInt::one() << (SLOT * 8);
    let (_, bytes) = value.mod_floor(&modulus).to_bytes_be();

    // left pad to a whole slot
    buffer.resize(buffer.len() + SLOT - bytes.len(), 0);
    buffer.extend_from_slice(&bytes);
}
