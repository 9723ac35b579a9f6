use bytes::{
    Bytes,
    BytesMut,
};
use message::{
    Preprocessor,
    PreprocessorConfig,
    TelemetryInfo,
};
use tokio_util::codec::Decoder;

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telemetry {
    pub raw:  Bytes,
    /// `None` for datagrams too short to carry a primary header.
    pub info: Option<TelemetryInfo>,
}

/// Decoder for one telemetry link. Tracks sequence continuity across datagrams, so use one
/// instance per link.
#[derive(Debug, Clone, Default)]
pub struct TelemetryCodec {
    preprocessor: Preprocessor,
}

impl TelemetryCodec {
    #[inline]
    pub fn new(config: PreprocessorConfig) -> Self {
        Self {
            preprocessor: Preprocessor::new(config),
        }
    }
}

impl Decoder for TelemetryCodec {
    type Error = Error;
    type Item = Telemetry;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let raw = src.split().freeze();
        let info = self.preprocessor.process(&raw);

        Ok(Some(Telemetry {
            raw,
            info,
        }))
    }
}
