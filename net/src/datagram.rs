use std::{
    io,
    net::{
        Ipv4Addr,
        Ipv6Addr,
        SocketAddr,
    },
};

use tokio::net::UdpSocket;

use crate::Address;

#[async_trait::async_trait]
pub trait DatagramOps: Sized {
    type Address;

    async fn connect(address: &Self::Address) -> io::Result<Self>;
    async fn bind(address: &Self::Address) -> io::Result<Self>;
    fn display_addr(addr: &Self::Address) -> String;
}

#[async_trait::async_trait]
pub trait DatagramSender {
    async fn send(&self, packet: &[u8]) -> io::Result<usize>;
}

#[async_trait::async_trait]
impl DatagramOps for UdpSocket {
    type Address = Address;

    #[tracing::instrument(err, fields(address = Self::display_addr(address).as_str()))]
    #[inline]
    async fn connect(address: &Address) -> io::Result<Self> {
        let remote = address.resolve().await?;

        let local = match remote {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        };

        let sock = UdpSocket::bind(local).await?;
        sock.connect(remote).await?;

        Ok(sock)
    }

    #[tracing::instrument(err, fields(address = Self::display_addr(address).as_str()))]
    #[inline]
    async fn bind(address: &Self::Address) -> io::Result<Self> {
        UdpSocket::bind(address.resolve().await?).await
    }

    #[inline]
    fn display_addr(addr: &Address) -> String {
        addr.to_string()
    }
}

#[async_trait::async_trait]
impl DatagramSender for UdpSocket {
    #[tracing::instrument(err, fields(packet.len = packet.len(), self.addr = ?self.local_addr().ok()), skip(packet, self))]
    #[inline]
    async fn send(&self, packet: &[u8]) -> io::Result<usize> {
        tracing::trace!(packet = %hex::encode(packet), "sending");
        UdpSocket::send(self, packet).await
    }
}
