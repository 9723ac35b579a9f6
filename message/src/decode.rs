use std::fmt::{
    Display,
    Formatter,
};

use packed_struct::PackedStruct;

use crate::{
    error::DecodeError,
    header::{
        PrimaryHeader,
        SequenceFlags,
        PRIMARY_HEADER_LEN,
    },
};

const OPCODE_MASK: u8 = 0x7f;

/// How much structure to assume in a received buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DecodeOptions {
    /// Interpret the buffer as a CCSDS space packet at all.
    pub ccsds:  bool,
    /// Read an opcode/checksum pair from the first two user-data bytes.
    pub opcode: bool,
}

impl Default for DecodeOptions {
    #[inline]
    fn default() -> Self {
        Self {
            ccsds:  true,
            opcode: true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DecodedHeader {
    pub apid:             u16,
    pub secondary_header: bool,
    pub sequence_flags:   SequenceFlags,
    pub sequence_count:   u16,
    /// Raw length field (user-data length minus one).
    pub declared_length:  u16,
    /// Bytes actually present after the primary header.
    pub actual_length:    usize,
    pub length_mismatch:  bool,
    pub opcode:           Option<u8>,
    pub checksum:         Option<u8>,
}

impl Display for DecodedHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  APID: {:#05x} ({})", self.apid, self.apid)?;
        writeln!(f, "  sequence count: {} ({:?})", self.sequence_count, self.sequence_flags)?;
        writeln!(f, "  secondary header: {}", self.secondary_header)?;
        write!(f, "  length: {} (actual {})", self.declared_length, self.actual_length)?;

        if self.length_mismatch {
            write!(f, " [length mismatch]")?;
        }

        if let Some(opcode) = self.opcode {
            write!(f, "\n  opcode: {opcode:#04x}")?;
        }

        if let Some(checksum) = self.checksum {
            write!(f, "\n  checksum: {checksum:#04x}")?;
        }

        Ok(())
    }
}

/// Interpret a received buffer.
///
/// Returns `Ok(None)` when `options.ccsds` is unset: the buffer is opaque. A length field that
/// disagrees with the buffer is reported on the result, never as an error.
pub fn decode(buf: &[u8], options: DecodeOptions) -> Result<Option<DecodedHeader>, DecodeError> {
    if !options.ccsds {
        return Ok(None);
    }

    let raw: &[u8; PRIMARY_HEADER_LEN] = buf
        .get(..PRIMARY_HEADER_LEN)
        .and_then(|b| b.try_into().ok())
        .ok_or(DecodeError::PacketTooShort {
            len: buf.len(),
        })?;

    let header = PrimaryHeader::unpack(raw).map_err(|_| DecodeError::PacketTooShort {
        len: buf.len(),
    })?;

    let actual_length = buf.len() - PRIMARY_HEADER_LEN;
    let length_mismatch = header.user_data_len() != actual_length;

    if length_mismatch {
        tracing::warn!(
            apid = header.apid(),
            declared = header.data_length(),
            actual = actual_length,
            "length field does not match datagram"
        );
    }

    let (opcode, checksum) = match buf.get(PRIMARY_HEADER_LEN..PRIMARY_HEADER_LEN + 2) {
        Some(&[opcode, checksum]) if options.opcode => (Some(opcode & OPCODE_MASK), Some(checksum)),
        _ => (None, None),
    };

    Ok(Some(DecodedHeader {
        apid: header.apid(),
        secondary_header: header.secondary_header(),
        sequence_flags: header.sequence_flags(),
        sequence_count: header.sequence_count(),
        declared_length: header.data_length(),
        actual_length,
        length_mismatch,
        opcode,
        checksum,
    }))
}
