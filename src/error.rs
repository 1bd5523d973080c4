//! Error taxonomy of the engine.
//!
//! [InputError] covers everything a caller can fix by changing the content or
//! the options. [InternalError] means an engine invariant broke and is never
//! expected in correct operation.

use thiserror::Error;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl Error {
    /// Returns the input error if this error is user-correctable.
    pub fn as_input(&self) -> Option<&InputError> {
        match self {
            Error::Input(e) => Some(e),
            Error::Internal(_) => None,
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, Error::Input(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("content is empty, at least one character is required")]
    EmptyContent,

    #[error("invalid value `{value}` for option `{option}`: {reason}")]
    InvalidOption {
        option: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("content of length {length} needs {needed} data codewords but at most {max} fit")]
    CapacityExceeded {
        length: usize,
        needed: usize,
        max: usize,
    },

    #[error("content of length {length} exceeds the maximum of {max}")]
    ContentTooLong { length: usize, max: usize },

    #[error("character {character:?} at position {position} cannot be encoded in {charset}")]
    UnencodableCharacter {
        character: char,
        position: usize,
        charset: &'static str,
    },

    #[error("byte 0x{value:02X} at position {position} cannot be encoded by {symbology}")]
    UnencodableByte {
        value: u8,
        position: usize,
        symbology: &'static str,
    },

    #[error("invalid GS1 data: {0}")]
    InvalidGs1(String),

    #[error("the symbol has not been encoded, call encode() first")]
    NotEncoded,
}

impl InputError {
    pub(crate) fn invalid(option: &'static str, value: impl ToString, reason: &'static str) -> Self {
        InputError::InvalidOption { option, value: value.to_string(), reason }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("{mode} encoder appended {actual} codewords, its cost model declares {expected}")]
    CodewordCountMismatch {
        mode: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("assembled {actual} codewords where the capacity table requires {expected}")]
    CapacityMismatch { expected: usize, actual: usize },

    #[error("codeword {value} lies outside a field of {size} elements")]
    CodewordOutOfRange { value: u32, size: u32 },

    #[error("invalid field parameters: {0}")]
    InvalidField(&'static str),

    #[error("sub-mode plan cannot represent byte 0x{0:02X}")]
    UnplannedByte(u8),

    #[error("numeric group conversion failed")]
    NumericConversion,
}
