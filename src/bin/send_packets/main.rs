use chrono::{
    DateTime,
    Utc,
};
use eyre::Result;
use futures::SinkExt;
use structopt::StructOpt as _;
use tokio::net::UdpSocket;
use tokio_util::udp::UdpFramed;

use codec::PacketCodec;
use message::PacketConfig;
use net::DatagramOps;
use spacepacket::{
    sawtooth::Sawtooth,
    trace,
    util::{
        self,
        build,
    },
};

pub use crate::options::Options;

mod options;

const PROGRESS_INTERVAL: u32 = 100;

/// `u64` generation time in ms, `u32` sequence count, `u32` value; no secondary header.
fn sample_packet(apid: u16, sequence_count: u32, time: DateTime<Utc>, value: u32) -> PacketConfig {
    PacketConfig {
        apid,
        sequence_count: sequence_count as u16,
        fields: vec![
            format!(">Q:{}", time.timestamp_millis()),
            format!(">I:{}", sequence_count),
            format!(">I:{}", value),
        ],
        ..Default::default()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let options: Options = Options::from_args();

    util::bootstrap!(
        "starting send_packets {} (built at {}, rustc {})",
        build::VERSION,
        build::BUILD_TIMESTAMP,
        build::RUSTC_COMMIT_HASH
    );
    trace::init(false);

    let address = options.address();
    let target = address.resolve().await?;
    let sock = <UdpSocket as DatagramOps>::connect(&address).await?;
    let mut sink = UdpFramed::new(sock, PacketCodec::default());

    let mut time = options.start_time.unwrap_or_else(Utc::now);
    let mut values = Sawtooth::new(options.min, options.max);

    tracing::info!(%address, count = options.count, "sending packets");

    for sequence_count in 0..options.count {
        let value = values.next().unwrap_or(options.min);
        let config = sample_packet(options.apid, sequence_count, time, value);

        sink.send((&config, target)).await?;

        if options.verbose {
            println!("Sent packet:");
            println!("    value={} time={}", value, time.format("%Y-%m-%dT%H:%M:%S%.6fZ"));
        }

        tokio::time::sleep(options.delay()).await;

        if (sequence_count + 1) % PROGRESS_INTERVAL == 0 {
            println!("Sent {} packets", sequence_count + 1);
        }

        time = time + options.delta_time();
    }

    Ok(())
}
