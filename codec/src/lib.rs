//! Datagram codecs for space packets.
//!
//! Each `decode` call consumes the whole buffer as one datagram, which is what
//! `tokio_util::udp::UdpFramed` hands a codec.

pub use ::tokio_util::codec as tokio_codec;

mod packet;
mod telemetry;

pub use self::{
    packet::*,
    telemetry::*,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Encode(#[from] message::EncodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
