use packed_struct::PackingError;

use crate::header::PRIMARY_HEADER_LEN;

/// A secondary-header time layout that cannot be represented.
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("invalid time width: {total} total bytes with {fraction} fraction bytes")]
pub struct InvalidTimeWidth {
    pub total:    usize,
    pub fraction: usize,
}

/// Failure to turn a single field descriptor into bytes.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("malformed field descriptor (expected [gap:]format:value): {reason}")]
    MalformedFieldSpec { reason: String },

    #[error("invalid integer literal {literal:?} for format {format:?}: {reason}")]
    InvalidIntegerLiteral {
        format:  String,
        literal: String,
        reason:  String,
    },

    #[error("invalid float literal {literal:?} for format {format:?}: {reason}")]
    InvalidFloatLiteral {
        format:  String,
        literal: String,
        reason:  String,
    },

    #[error("invalid string format {format:?}: {reason}")]
    InvalidStringFormat { format: String, reason: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("field {index} ({descriptor:?}): {source}")]
    Field {
        index:      usize,
        descriptor: String,
        #[source]
        source:     FieldError,
    },

    #[error("hex data must have even length, got {len} digits")]
    OddLengthHex { len: usize },

    #[error("invalid hex digit {character:?} at index {index}")]
    InvalidHexDigit { character: char, index: usize },

    #[error(transparent)]
    InvalidTimeWidth(#[from] InvalidTimeWidth),

    #[error("time {seconds} s is not representable in a {width}-byte seconds field")]
    TimeOutOfRange { seconds: f64, width: usize },

    #[error("invalid timestamp {input:?} (expected ISO 8601 without zone)")]
    InvalidTimestamp {
        input:  String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("user data of {len} bytes does not fit the 16-bit length field")]
    PacketTooLong { len: usize },

    #[error(transparent)]
    Packing(#[from] PackingError),
}

#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("packet too short: {len} bytes, the primary header needs {}", PRIMARY_HEADER_LEN)]
    PacketTooShort { len: usize },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown epoch {0:?} (expected one of tai, unix, gps, j2000)")]
pub struct UnknownEpoch(pub String);
