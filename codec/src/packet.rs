use bytes::{
    Bytes,
    BytesMut,
};
use message::{
    DecodeError,
    DecodeOptions,
    DecodedHeader,
    Packet,
    PacketConfig,
};
use tokio_util::codec::{
    Decoder,
    Encoder,
};

use crate::Error;

/// One received datagram and whatever could be made of its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    pub raw:    Bytes,
    /// `Ok(None)` when the codec was told not to interpret the buffer.
    pub header: Result<Option<DecodedHeader>, DecodeError>,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PacketCodec {
    options: DecodeOptions,
}

impl PacketCodec {
    #[inline]
    pub const fn new(options: DecodeOptions) -> Self {
        Self {
            options,
        }
    }

    #[inline]
    pub fn options(&self) -> DecodeOptions {
        self.options
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = Error;

    #[inline]
    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(item.as_ref());

        Ok(())
    }
}

impl<'a> Encoder<&'a PacketConfig> for PacketCodec {
    type Error = Error;

    fn encode(&mut self, item: &'a PacketConfig, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let packet = message::encode(item)?;
        Encoder::<Packet>::encode(self, packet, dst)
    }
}

impl Decoder for PacketCodec {
    type Error = Error;
    type Item = Received;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let raw = src.split().freeze();
        tracing::trace!(len = raw.len(), raw = %hex::encode(&raw), "datagram");

        let header = message::decode(&raw, self.options);

        Ok(Some(Received {
            raw,
            header,
        }))
    }
}

#[cfg(test)]
mod test {
    use futures::prelude::*;
    use proptest::prelude::*;
    use tokio_util::codec::FramedRead;

    use super::*;

    async fn decode_one(codec: PacketCodec, src: &[u8]) -> eyre::Result<Vec<Received>> {
        FramedRead::new(src, codec).map_err(eyre::Report::from).try_collect().await
    }

    #[test]
    fn test_encode_config() -> eyre::Result<()> {
        let mut dst = BytesMut::new();

        PacketCodec::default().encode(
            &PacketConfig {
                apid: 2047,
                fields: vec!["B:10".to_owned(), "2:B:12".to_owned()],
                ..Default::default()
            },
            &mut dst,
        )?;

        assert_eq!(dst.as_ref(), &[0x07, 0xff, 0xc0, 0x00, 0x00, 0x03, 0x0a, 0x00, 0x00, 0x0c]);

        Ok(())
    }

    #[test]
    fn test_encode_error() {
        let mut dst = BytesMut::new();

        let result = PacketCodec::default().encode(
            &PacketConfig {
                fields: vec!["B".to_owned()],
                ..Default::default()
            },
            &mut dst,
        );

        assert!(matches!(result, Err(Error::Encode(_))));
        assert!(dst.is_empty());
    }

    #[tokio::test]
    async fn test_decode() -> eyre::Result<()> {
        let src = [0x18, 0x64, 0xc0, 0x05, 0x00, 0x01, 0x83, 0x5a];
        let received = decode_one(PacketCodec::default(), &src).await?;

        assert_eq!(received.len(), 1);
        assert_eq!(received[0].raw.as_ref(), &src);

        let header = received[0].header.clone()?.ok_or_else(|| eyre::eyre!("no header"))?;
        assert_eq!(header.apid, 100);
        assert_eq!(header.sequence_count, 5);
        assert_eq!(header.opcode, Some(3));

        Ok(())
    }

    #[tokio::test]
    async fn test_short_datagram_is_an_item() -> eyre::Result<()> {
        let received = decode_one(PacketCodec::default(), &[0x01, 0x02]).await?;

        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0].header,
            Err(DecodeError::PacketTooShort {
                len: 2,
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_opaque() -> eyre::Result<()> {
        let codec = PacketCodec::new(DecodeOptions {
            ccsds:  false,
            opcode: false,
        });

        let received = decode_one(codec, &[0x01, 0x02]).await?;
        assert_eq!(received[0].header, Ok(None));

        Ok(())
    }

    #[tokio::test]
    async fn test_empty() -> eyre::Result<()> {
        assert!(decode_one(PacketCodec::default(), &[]).await?.is_empty());
        Ok(())
    }

    proptest! {
        #[test]
        fn encoder_and_decoder_agree(
            apid in 0u16..0x800,
            seq in 0u16..0x4000,
            payload in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            let mut codec = PacketCodec::default();
            let mut buf = BytesMut::new();

            let packet = Packet::compose(apid, seq, None, &payload).unwrap();
            let len = packet.len();
            Encoder::<Packet>::encode(&mut codec, packet, &mut buf).unwrap();

            let received = Decoder::decode(&mut codec, &mut buf).unwrap().unwrap();
            prop_assert!(buf.is_empty());
            prop_assert_eq!(received.raw.len(), len);

            let header = received.header.unwrap().unwrap();
            prop_assert_eq!(header.apid, apid);
            prop_assert_eq!(header.sequence_count, seq);
            prop_assert!(!header.length_mismatch);

            let opcode = payload.first().filter(|_| payload.len() >= 2).map(|op| op & 0x7f);
            prop_assert_eq!(header.opcode, opcode);
        }
    }
}
