use eyre::Result;
use futures::StreamExt;
use structopt::StructOpt as _;
use tokio::net::UdpSocket;
use tokio_util::udp::UdpFramed;

use codec::{
    PacketCodec,
    Received,
};
use net::DatagramOps;
use spacepacket::{
    trace,
    util::{
        self,
        build,
        trace_catch,
    },
};

pub use crate::options::Options;

mod options;

fn show(received: &Received, json: bool) -> Result<()> {
    println!("Received packet:");
    println!("{}", util::hexdump(&received.raw));

    match &received.header {
        Ok(Some(header)) if json => println!("{}", serde_json::to_string(header)?),
        Ok(Some(header)) => {
            if header.length_mismatch {
                println!(
                    "Packet length is incorrect, got {} but header has {}",
                    header.actual_length,
                    header.declared_length as usize + 1,
                );
            }

            println!("{header}");
        },
        Ok(None) => {},
        Err(e) => println!("  {e}"),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let options: Options = Options::from_args();

    util::bootstrap!(
        "starting show_commands {} (built at {}, rustc {})",
        build::VERSION,
        build::BUILD_TIMESTAMP,
        build::RUSTC_COMMIT_HASH
    );
    trace::init(false);

    let address = options.address();
    let sock = <UdpSocket as DatagramOps>::bind(&address).await?;
    let mut frames = UdpFramed::new(sock, PacketCodec::new(options.decode_options()));

    tracing::info!(%address, "listening for commands");

    loop {
        let frame = tokio::select! {
            frame = frames.next() => frame,
            _ = tokio::signal::ctrl_c() => break,
        };

        let (received, from) = match frame {
            Some(frame) => match trace_catch!(frame, "receiving datagram") {
                Some(frame) => frame,
                None => continue,
            },
            None => break,
        };

        tracing::debug!(%from, len = received.raw.len(), "datagram");

        if let Err(e) = &received.header {
            tracing::warn!(%from, error = %e, "undecodable command");
        }

        show(&received, options.json)?;
    }

    Ok(())
}
