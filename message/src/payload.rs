use crate::{
    error::EncodeError,
    field::FieldSpec,
    header::MAX_USER_DATA_LEN,
};

const HEX_WHITESPACE: [char; 4] = [' ', '\t', '\n', '\r'];

/// End of an `len`-byte write at `offset`, if it fits in one packet.
#[inline]
fn extent(offset: usize, len: usize) -> Result<usize, EncodeError> {
    offset.checked_add(len).filter(|&end| end <= MAX_USER_DATA_LEN).ok_or(
        EncodeError::PacketTooLong {
            len: offset.saturating_add(len),
        },
    )
}

/// Zero-filled payload buffer that only ever grows.
///
/// Later writes overwrite earlier ones, so a field may land on top of raw data or length padding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PayloadBuilder {
    buf:    Vec<u8>,
    cursor: usize,
}

impl PayloadBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow to at least `len` bytes, zero-filling the new tail.
    ///
    /// Nothing is allocated for a length past [`MAX_USER_DATA_LEN`].
    #[inline]
    pub fn ensure_room(&mut self, len: usize) -> Result<(), EncodeError> {
        let len = extent(0, len)?;

        if self.buf.len() < len {
            self.buf.resize(len, 0);
        }

        Ok(())
    }

    #[inline]
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), EncodeError> {
        let end = extent(offset, bytes.len())?;

        self.ensure_room(end)?;
        self.buf[offset..end].copy_from_slice(bytes);

        Ok(())
    }

    /// Overwrite the start of the payload with hex-encoded bytes.
    ///
    /// Whitespace between digits is ignored. The field cursor is not moved.
    pub fn raw_hex(&mut self, data: &str) -> Result<&mut Self, EncodeError> {
        let digits = data.replace(&HEX_WHITESPACE[..], "");
        let count = digits.chars().count();

        if count % 2 != 0 {
            return Err(EncodeError::OddLengthHex {
                len: count,
            });
        }

        if let Some((index, character)) = data
            .chars()
            .enumerate()
            .find(|&(_, c)| !c.is_ascii_hexdigit() && !HEX_WHITESPACE.contains(&c))
        {
            return Err(EncodeError::InvalidHexDigit {
                character,
                index,
            });
        }

        let bytes = hex::decode(&digits).map_err(|_| EncodeError::OddLengthHex {
            len: count,
        })?;

        self.write_at(0, &bytes)?;
        Ok(self)
    }

    /// Place one `[gap:]format:value` field after the previous one.
    pub fn field(&mut self, index: usize, descriptor: &str) -> Result<&mut Self, EncodeError> {
        let encoded = FieldSpec::parse(descriptor)
            .and_then(|spec| spec.encode().map(|bytes| (spec.gap, bytes)))
            .map_err(|source| EncodeError::Field {
                index,
                descriptor: descriptor.to_owned(),
                source,
            })?;

        let (gap, bytes) = encoded;
        let offset = extent(self.cursor, gap)?;

        tracing::trace!(index, offset, width = bytes.len(), "placing field");

        self.write_at(offset, &bytes)?;
        self.cursor = offset + bytes.len();

        Ok(self)
    }

    /// Offset at which the next field (before its gap) will be placed.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Assemble a payload from a minimum length, raw hex data, and field descriptors, in that order.
#[tracing::instrument(skip(fields), fields(fields.len = fields.len()), err(Display))]
pub fn build<S>(length: Option<usize>, data: Option<&str>, fields: &[S]) -> Result<Vec<u8>, EncodeError>
where
    S: AsRef<str>,
{
    let mut builder = PayloadBuilder::new();

    if let Some(length) = length {
        builder.ensure_room(length)?;
    }

    if let Some(data) = data {
        builder.raw_hex(data)?;
    }

    for (index, descriptor) in fields.iter().enumerate() {
        builder.field(index, descriptor.as_ref())?;
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;
    use crate::error::FieldError;

    const NO_FIELDS: &[&str] = &[];

    #[test]
    fn test_field_gap() {
        let payload = build(None, None, &["B:10", "2:B:12"]).unwrap();
        assert_eq!(payload, vec![0x0a, 0x00, 0x00, 0x0c]);
    }

    #[test]
    fn test_three_fields() {
        let payload = build(None, None, &[">I:12345", "B:10", "2:B:12"]).unwrap();
        assert_eq!(payload, vec![0x00, 0x00, 0x30, 0x39, 0x0a, 0x00, 0x00, 0x0c]);
    }

    #[test]
    fn test_length_only() {
        assert_eq!(build(Some(100), None, NO_FIELDS).unwrap(), vec![0; 100]);
        assert_eq!(build(None, None, NO_FIELDS).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_data_shorter_than_length() {
        let payload = build(Some(5), Some("010203"), NO_FIELDS).unwrap();
        assert_eq!(payload, vec![1, 2, 3, 0, 0]);
    }

    #[test]
    fn test_data_longer_than_length() {
        let payload = build(Some(2), Some("01 02\n03"), NO_FIELDS).unwrap();
        assert_eq!(payload, vec![1, 2, 3]);
    }

    #[test]
    fn test_fields_overwrite_data() {
        let payload = build(Some(6), Some("aabbccdd"), &["1:H:258"]).unwrap();
        assert_eq!(payload, vec![0xaa, 0x01, 0x02, 0xdd, 0x00, 0x00]);
    }

    #[test]
    fn test_fields_extend_past_length() {
        let payload = build(Some(2), None, &["3:H:1"]).unwrap();
        assert_eq!(payload, vec![0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_hex_errors() {
        assert_eq!(build(None, Some("abc"), NO_FIELDS), Err(EncodeError::OddLengthHex { len: 3 }));
        assert_eq!(
            build(None, Some("0g"), NO_FIELDS),
            Err(EncodeError::InvalidHexDigit {
                character: 'g',
                index:     1,
            })
        );
    }

    #[test]
    fn test_hex_digit_position() {
        assert_eq!(
            build(None, Some("01 02 0x"), NO_FIELDS),
            Err(EncodeError::InvalidHexDigit {
                character: 'x',
                index:     7,
            })
        );

        assert_eq!(
            build(None, Some("00\tä1"), NO_FIELDS),
            Err(EncodeError::InvalidHexDigit {
                character: 'ä',
                index:     3,
            })
        );
    }

    #[test]
    fn test_huge_length_allocates_nothing() {
        assert_eq!(
            build(Some(10_000_000_000_000), None, NO_FIELDS),
            Err(EncodeError::PacketTooLong {
                len: 10_000_000_000_000,
            })
        );

        let largest = build(Some(MAX_USER_DATA_LEN), None, NO_FIELDS).unwrap();
        assert_eq!(largest.len(), MAX_USER_DATA_LEN);
    }

    #[test]
    fn test_gap_overflow() {
        assert_eq!(
            build(None, None, &["18446744073709551615:B:1"]),
            Err(EncodeError::PacketTooLong { len: usize::MAX })
        );

        assert_eq!(
            build(None, None, &["B:1", "18446744073709551615:B:1"]),
            Err(EncodeError::PacketTooLong { len: usize::MAX })
        );
    }

    #[test]
    fn test_field_past_largest_packet() {
        let gap = MAX_USER_DATA_LEN - 1;
        let last_byte = build(None, None, &[format!("{gap}:B:1")]).unwrap();
        assert_eq!(last_byte.len(), MAX_USER_DATA_LEN);
        assert_eq!(last_byte[gap], 1);

        assert_eq!(
            build(None, None, &[format!("{gap}:H:1")]),
            Err(EncodeError::PacketTooLong {
                len: MAX_USER_DATA_LEN + 1,
            })
        );
    }

    #[test]
    fn test_field_error_context() {
        let err = build(Some(4), None, &["B:1", "B:300"]).unwrap_err();

        match err {
            EncodeError::Field {
                index,
                descriptor,
                source: FieldError::InvalidIntegerLiteral { literal, .. },
            } => {
                assert_eq!(index, 1);
                assert_eq!(descriptor, "B:300");
                assert_eq!(literal, "300");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cursor_ignores_raw_data() {
        let mut builder = PayloadBuilder::new();
        builder.raw_hex("ffffffff").unwrap();
        assert_eq!(builder.cursor(), 0);

        builder.field(0, "B:0").unwrap();
        assert_eq!(builder.cursor(), 1);
        assert_eq!(builder.as_slice(), &[0x00, 0xff, 0xff, 0xff]);
    }

    proptest! {
        #[test]
        fn length_is_max_extent(
            length in prop::option::of(0usize..64),
            data in prop::option::of(prop::collection::vec(any::<u8>(), 0..32)),
            gaps in prop::collection::vec(0usize..8, 0..8),
        ) {
            let hex = data.as_ref().map(hex::encode);
            let fields = gaps.iter().map(|gap| format!("{gap}:H:1")).collect::<Vec<_>>();

            let mut builder = PayloadBuilder::new();
            let mut prev = 0;

            if let Some(length) = length {
                builder.ensure_room(length).unwrap();
                prop_assert!(builder.len() >= prev);
                prev = builder.len();
            }

            if let Some(hex) = &hex {
                builder.raw_hex(hex).unwrap();
                prop_assert!(builder.len() >= prev);
                prev = builder.len();
            }

            for (index, field) in fields.iter().enumerate() {
                builder.field(index, field).unwrap();
                prop_assert!(builder.len() >= prev);
                prev = builder.len();
            }

            let field_end = gaps.iter().map(|gap| gap + 2).sum::<usize>();
            let data_end = data.map(|d| d.len()).unwrap_or(0);
            let expected = length.unwrap_or(0).max(data_end).max(field_end);

            prop_assert_eq!(builder.len(), expected);
            prop_assert_eq!(build(length, hex.as_deref(), &fields[..]).unwrap().len(), expected);
        }
    }
}
