use std::time::Duration;

use chrono::{
    DateTime,
    Utc,
};
use message::parse_timestamp;
use net::Address;

/// Send a stream of sample telemetry packets carrying a sawtooth value.
#[derive(Debug, Clone, PartialEq, Eq, structopt::StructOpt)]
pub struct Options {
    #[structopt(long, default_value = "localhost")]
    pub host: String,

    #[structopt(long, default_value = "10015")]
    pub port: u16,

    #[structopt(long, default_value = "100")]
    pub apid: u16,

    /// How many packets to send.
    #[structopt(long, default_value = "1")]
    pub count: u32,

    /// Lowest sawtooth value.
    #[structopt(long, default_value = "0")]
    pub min: u32,

    /// Highest sawtooth value.
    #[structopt(long, default_value = "2500")]
    pub max: u32,

    /// Delay between packets in milliseconds.
    #[structopt(long, default_value = "50")]
    pub delay: u64,

    /// Generation time of the first packet, ISO 8601 in UTC. Defaults to now.
    #[structopt(long, parse(try_from_str = parse_timestamp))]
    pub start_time: Option<DateTime<Utc>>,

    /// Generation time increment in milliseconds. Defaults to the delay.
    #[structopt(long)]
    pub delta_time: Option<u64>,

    /// Print every packet sent.
    #[structopt(long)]
    pub verbose: bool,
}

impl Options {
    #[inline]
    pub fn address(&self) -> Address {
        Address::new(self.host.clone(), self.port)
    }

    #[inline]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay)
    }

    #[inline]
    pub fn delta_time(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.delta_time.unwrap_or(self.delay) as i64)
    }
}
