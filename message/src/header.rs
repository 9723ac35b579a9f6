use packed_struct::prelude::*;

use crate::error::EncodeError;

pub const PRIMARY_HEADER_LEN: usize = 6;

pub const APID_MASK: u16 = 0x07ff;
pub const SEQUENCE_COUNT_MASK: u16 = 0x3fff;

/// Largest user-data length the 16-bit length field can describe.
pub const MAX_USER_DATA_LEN: usize = u16::MAX as usize + 1;

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PrimitiveEnum_u8, serde::Serialize, serde::Deserialize,
)]
#[repr(u8)]
pub enum SequenceFlags {
    Continuation = 0b00,
    First        = 0b01,
    Last         = 0b10,
    Unsegmented  = 0b11,
}

/// The 6-byte CCSDS primary header.
///
/// ```text
/// | version (3) | type (1) | sec hdr (1) | apid (11) | seq flags (2) | seq count (14) | length - 1 (16) |
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PackedStruct)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "6")]
pub struct PrimaryHeader {
    #[packed_field(bits = "0..=2")]
    version:          Integer<u8, packed_bits::Bits<3>>,
    #[packed_field(bits = "3..=3")]
    command:          bool,
    #[packed_field(bits = "4..=4")]
    secondary_header: bool,
    #[packed_field(bits = "5..=15", endian = "msb")]
    apid:             Integer<u16, packed_bits::Bits<11>>,
    #[packed_field(bits = "16..=17", ty = "enum")]
    sequence_flags:   SequenceFlags,
    #[packed_field(bits = "18..=31", endian = "msb")]
    sequence_count:   Integer<u16, packed_bits::Bits<14>>,
    #[packed_field(bits = "32..=47", endian = "msb")]
    data_length:      u16,
}

impl PrimaryHeader {
    /// Header for an unsegmented telemetry packet carrying `user_data_len` bytes after the header.
    ///
    /// The APID and sequence count are masked to their field widths rather than rejected. A
    /// zero `user_data_len` is described as the one-byte minimum.
    pub fn unsegmented(
        apid: u16,
        secondary_header: bool,
        sequence_count: u16,
        user_data_len: usize,
    ) -> Result<Self, EncodeError> {
        if user_data_len > MAX_USER_DATA_LEN {
            return Err(EncodeError::PacketTooLong {
                len: user_data_len,
            });
        }

        if apid & !APID_MASK != 0 {
            tracing::debug!(apid, masked = apid & APID_MASK, "apid wider than 11 bits, masking");
        }

        Ok(Self {
            version: 0u8.into(),
            command: false,
            secondary_header,
            apid: (apid & APID_MASK).into(),
            sequence_flags: SequenceFlags::Unsegmented,
            sequence_count: (sequence_count & SEQUENCE_COUNT_MASK).into(),
            data_length: user_data_len.saturating_sub(1) as u16,
        })
    }

    #[inline]
    pub fn apid(&self) -> u16 {
        u16::from(self.apid)
    }

    #[inline]
    pub fn secondary_header(&self) -> bool {
        self.secondary_header
    }

    #[inline]
    pub fn sequence_flags(&self) -> SequenceFlags {
        self.sequence_flags
    }

    #[inline]
    pub fn sequence_count(&self) -> u16 {
        u16::from(self.sequence_count)
    }

    /// The raw length field: user-data length minus one.
    #[inline]
    pub fn data_length(&self) -> u16 {
        self.data_length
    }

    #[inline]
    pub fn user_data_len(&self) -> usize {
        self.data_length as usize + 1
    }

    #[inline]
    pub fn display(&self) -> String {
        format!(
            "apid {} [seq {} {:?}]{} len {}",
            self.apid(),
            self.sequence_count(),
            self.sequence_flags,
            self.secondary_header.then(|| " [2nd hdr]").unwrap_or(""),
            self.user_data_len(),
        )
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_layout() {
        let header = PrimaryHeader::unsegmented(100, true, 123, 10).unwrap();
        let packed = header.pack().unwrap();

        assert_eq!(packed, [0x08, 0x64, 0xc0, 0x7b, 0x00, 0x09]);
    }

    #[test]
    fn test_idle_apid() {
        let header = PrimaryHeader::unsegmented(2047, false, 0, 1).unwrap();
        assert_eq!(header.pack().unwrap(), [0x07, 0xff, 0xc0, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_apid_masking() {
        let wide = PrimaryHeader::unsegmented(2048, false, 0, 1).unwrap().pack().unwrap();
        let zero = PrimaryHeader::unsegmented(0, false, 0, 1).unwrap().pack().unwrap();
        assert_eq!(wide, zero);

        let flagged = PrimaryHeader::unsegmented(2048, true, 0, 1).unwrap().pack().unwrap();
        assert_eq!(flagged[0], zero[0] | 0x08);
        assert_eq!(flagged[1..], zero[1..]);
    }

    #[test]
    fn test_sequence_count_masking() {
        let header = PrimaryHeader::unsegmented(1, false, 0xffff, 1).unwrap();
        assert_eq!(header.sequence_count(), 0x3fff);
        assert_eq!(header.pack().unwrap()[2..4], [0xff, 0xff]);
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(PrimaryHeader::unsegmented(1, false, 0, 0).unwrap().data_length(), 0);
        assert!(PrimaryHeader::unsegmented(1, false, 0, MAX_USER_DATA_LEN).is_ok());
        assert!(matches!(
            PrimaryHeader::unsegmented(1, false, 0, MAX_USER_DATA_LEN + 1),
            Err(EncodeError::PacketTooLong { .. })
        ));
    }

    #[test]
    fn test_display() {
        let header = PrimaryHeader::unsegmented(100, true, 123, 10).unwrap();
        assert_eq!(header.display(), "apid 100 [seq 123 Unsegmented] [2nd hdr] len 10");

        let plain = PrimaryHeader::unsegmented(7, false, 0, 1).unwrap();
        assert_eq!(plain.display(), "apid 7 [seq 0 Unsegmented] len 1");
    }

    proptest! {
        #[test]
        fn pack_unpack_equivalence(apid in 0u16..0x800, seq in 0u16..0x4000, len in 1usize..=MAX_USER_DATA_LEN, sec in any::<bool>()) {
            let header = PrimaryHeader::unsegmented(apid, sec, seq, len).unwrap();
            let unpacked = PrimaryHeader::unpack(&header.pack().unwrap()).unwrap();

            prop_assert_eq!(header, unpacked);
            prop_assert_eq!(unpacked.apid(), apid);
            prop_assert_eq!(unpacked.sequence_count(), seq);
            prop_assert_eq!(unpacked.user_data_len(), len);
        }

        #[test]
        fn unpack_pack_equivalence(data in any::<[u8; 6]>()) {
            let header = PrimaryHeader::unpack(&data).unwrap();
            prop_assert_eq!(header.pack().unwrap(), data);
        }
    }
}
