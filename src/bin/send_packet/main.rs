use eyre::Result;
use structopt::StructOpt as _;
use tokio::net::UdpSocket;

use net::{
    DatagramOps,
    DatagramSender,
};
use spacepacket::{
    trace,
    util::{
        self,
        build,
    },
};

pub use crate::options::Options;

mod options;

#[tokio::main]
async fn main() -> Result<()> {
    let options: Options = Options::from_args();

    util::bootstrap!(
        "starting send_packet {} (built at {}, rustc {})",
        build::VERSION,
        build::BUILD_TIMESTAMP,
        build::RUSTC_COMMIT_HASH
    );
    trace::init(false);

    let config = options.packet_config()?;
    let packet = message::encode(&config)?;
    tracing::debug!(%packet, "encoded");

    if options.dry_run {
        println!("Packet:");
        println!("{}", util::hexdump(packet.as_ref()));

        return Ok(());
    }

    let address = options.address();
    let sock = <UdpSocket as DatagramOps>::connect(&address).await?;
    let sent = DatagramSender::send(&sock, packet.as_ref()).await?;

    tracing::info!(%address, len = sent, apid = packet.header().apid(), "sent packet");

    if options.verbose {
        println!("Sent packet:");
        println!("{}", util::hexdump(packet.as_ref()));
    }

    Ok(())
}
