use chrono::Utc;
use eyre::Result;
use futures::StreamExt;
use structopt::StructOpt as _;
use tokio::net::UdpSocket;
use tokio_util::udp::UdpFramed;

use codec::TelemetryCodec;
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

#[tokio::main]
async fn main() -> Result<()> {
    let options: Options = Options::from_args();

    util::bootstrap!(
        "starting show_telemetry {} (built at {}, rustc {})",
        build::VERSION,
        build::BUILD_TIMESTAMP,
        build::RUSTC_COMMIT_HASH
    );
    trace::init(false);

    let config = options.preprocessor_config()?;
    let address = options.address();
    let sock = <UdpSocket as DatagramOps>::bind(&address).await?;
    let mut frames = UdpFramed::new(sock, TelemetryCodec::new(config));

    tracing::info!(%address, epoch = %config.epoch(), "listening for telemetry");

    loop {
        let frame = tokio::select! {
            frame = frames.next() => frame,
            _ = tokio::signal::ctrl_c() => break,
        };

        let (telemetry, from) = match frame {
            Some(frame) => match trace_catch!(frame, "receiving datagram") {
                Some(frame) => frame,
                None => continue,
            },
            None => break,
        };

        let info = match telemetry.info {
            Some(info) => info,
            None => {
                println!("Short packet from {}: {}", from, hex::encode(&telemetry.raw));
                continue;
            },
        };

        if options.json {
            println!("{}", serde_json::to_string(&info)?);
            continue;
        }

        let time = info.generation_time.unwrap_or_else(Utc::now);

        println!(
            "APID {} seq {} time {}{}",
            info.apid,
            info.sequence_count,
            time.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            if info.sequence_jump { " [sequence jump]" } else { "" },
        );
    }

    Ok(())
}
