// SPDX-License-Identifier: Apache-2.0

//! Decode failures.

use thiserror::Error;

/// An error thrown by the decoder. A failure at any depth aborts the whole
/// decode; there is no partial value. Encoding cannot fail: values outside
/// their declared domain are rejected by the type checker upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The bits above an integer's declared width are not a valid zero or
    /// sign extension
    #[error("invalid padding")]
    InvalidPadding,

    /// A boolean slot held a value other than 0 or 1
    #[error("invalid boolean")]
    InvalidBool,

    /// An enum tag was not below the declared number of members
    #[error("invalid enum value")]
    InvalidEnum,

    /// A string's bytes are not valid UTF-8
    #[error("invalid utf-8 in string")]
    InvalidUtf8,

    /// An offset, length or size would require reading past the end of the
    /// buffer, or overflowed while being computed
    #[error("data out of bounds")]
    OutOfBounds,
}
