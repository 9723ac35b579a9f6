//! CCSDS space packet construction and inspection.
//!
//! Encoding runs descriptor → [`field::FieldSpec`] → [`payload::PayloadBuilder`] → optional
//! [`time::SecondaryHeader`] → [`header::PrimaryHeader`]. Decoding inspects a received buffer with
//! [`decode::decode`] or, for telemetry streams, [`preprocess::Preprocessor`].

pub mod decode;
pub mod error;
pub mod field;
pub mod header;
pub mod packet;
pub mod payload;
pub mod preprocess;
pub mod time;

pub use decode::{
    decode,
    DecodeOptions,
    DecodedHeader,
};
pub use error::{
    DecodeError,
    EncodeError,
    FieldError,
    InvalidTimeWidth,
};
pub use header::{
    PrimaryHeader,
    SequenceFlags,
    PRIMARY_HEADER_LEN,
};
pub use packet::{
    encode,
    Packet,
    PacketConfig,
    Timestamp,
};
pub use preprocess::{
    Epoch,
    Preprocessor,
    PreprocessorConfig,
    TelemetryInfo,
};
pub use time::{
    parse_timestamp,
    SecondaryHeader,
    TimeFormat,
};
