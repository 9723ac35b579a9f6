use std::net::SocketAddr;

use tokio::net::UdpSocket;

use spacepacket::net::{
    Address,
    DatagramOps,
};

pub fn trace_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_env_filter("debug").try_init();
}

/// A receiver bound to an ephemeral loopback port and a sender connected to it.
pub async fn loopback_pair() -> eyre::Result<(UdpSocket, UdpSocket, SocketAddr)> {
    let receiver = <UdpSocket as DatagramOps>::bind(&Address::new("127.0.0.1", 0)).await?;
    let target = receiver.local_addr()?;

    let sender = <UdpSocket as DatagramOps>::connect(&Address::new("127.0.0.1", target.port())).await?;

    Ok((receiver, sender, target))
}
