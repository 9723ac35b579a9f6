use std::fmt::{
    Display,
    Formatter,
};

use bytes::{
    BufMut,
    Bytes,
    BytesMut,
};
use chrono::{
    DateTime,
    Utc,
};
use packed_struct::PackedStruct;

use crate::{
    error::EncodeError,
    header::{
        PrimaryHeader,
        PRIMARY_HEADER_LEN,
    },
    payload,
    time::{
        SecondaryHeader,
        TimeFormat,
    },
};

/// Timestamp and layout of the secondary header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timestamp {
    pub time:   DateTime<Utc>,
    pub format: TimeFormat,
}

/// Everything needed to build one packet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PacketConfig {
    pub apid:             u16,
    pub sequence_count:   u16,
    /// `None` omits the secondary header.
    pub secondary_header: Option<Timestamp>,
    /// Minimum payload length, zero-padded.
    pub length:           Option<usize>,
    /// Hex-encoded bytes written at the start of the payload.
    pub data:             Option<String>,
    /// `[gap:]format:value` descriptors, placed in order.
    pub fields:           Vec<String>,
}

/// A complete packet: primary header, optional secondary header, payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    header: PrimaryHeader,
    bytes:  Bytes,
}

impl Packet {
    /// Prefix `payload` with the primary header and, if present, the secondary header.
    ///
    /// User data is padded to the one-byte minimum when both are empty.
    #[tracing::instrument(skip(secondary, payload), fields(payload.len = payload.len()), err(Display))]
    pub fn compose(
        apid: u16,
        sequence_count: u16,
        secondary: Option<&SecondaryHeader>,
        payload: &[u8],
    ) -> Result<Self, EncodeError> {
        let secondary_len = secondary.map(|s| s.format.total_bytes()).unwrap_or(0);
        let user_data_len = (secondary_len + payload.len()).max(1);

        let header =
            PrimaryHeader::unsegmented(apid, secondary.is_some(), sequence_count, user_data_len)?;

        let mut out = BytesMut::with_capacity(PRIMARY_HEADER_LEN + user_data_len);
        out.put_slice(&header.pack()?);

        if let Some(secondary) = secondary {
            secondary.write_to(&mut out);
        }

        out.put_slice(payload);
        out.resize(PRIMARY_HEADER_LEN + user_data_len, 0);

        Ok(Self {
            header,
            bytes: out.freeze(),
        })
    }

    #[inline]
    pub fn header(&self) -> &PrimaryHeader {
        &self.header
    }

    /// Everything after the primary header.
    #[inline]
    pub fn user_data(&self) -> &[u8] {
        &self.bytes[PRIMARY_HEADER_LEN..]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for Packet {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.bytes.as_ref()
    }
}

impl From<Packet> for Bytes {
    #[inline]
    fn from(packet: Packet) -> Self {
        packet.bytes
    }
}

impl Display for Packet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / user data: 0x{}", self.header().display(), hex::encode(self.user_data()))
    }
}

/// Build a packet from `config`: payload first, then secondary header, then primary header.
pub fn encode(config: &PacketConfig) -> Result<Packet, EncodeError> {
    let payload = payload::build(config.length, config.data.as_deref(), &config.fields)?;

    let secondary = config
        .secondary_header
        .map(|ts| SecondaryHeader::from_datetime(ts.time, ts.format))
        .transpose()?;

    Packet::compose(config.apid, config.sequence_count, secondary.as_ref(), &payload)
}
