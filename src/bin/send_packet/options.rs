use chrono::{
    DateTime,
    Utc,
};
use message::{
    parse_timestamp,
    EncodeError,
    PacketConfig,
    TimeFormat,
    Timestamp,
};
use net::Address;

/// Send a single CCSDS packet over UDP.
#[derive(Debug, Clone, PartialEq, Eq, structopt::StructOpt)]
pub struct Options {
    /// Destination host.
    #[structopt(long, default_value = "localhost")]
    pub host: String,

    /// Destination UDP port.
    #[structopt(long, default_value = "1235")]
    pub port: u16,

    /// APID; values wider than 11 bits are masked.
    #[structopt(long)]
    pub apid: u16,

    /// Sequence count; values wider than 14 bits are masked.
    #[structopt(short = "n", long, default_value = "0")]
    pub sequence_count: u16,

    /// Omit the secondary (time) header.
    #[structopt(long)]
    pub no_secondary_header: bool,

    /// Raw payload bytes as hex, written at the start of the payload.
    #[structopt(long)]
    pub data: Option<String>,

    /// Minimum payload length, zero-padded.
    #[structopt(long)]
    pub length: Option<usize>,

    /// Payload field as `[gap:]format:value`, placed after the previous field. Repeatable.
    #[structopt(short = "f", long = "field", number_of_values = 1)]
    pub fields: Vec<String>,

    /// Secondary header time, ISO 8601 in UTC. Defaults to now.
    #[structopt(long, parse(try_from_str = parse_timestamp))]
    pub time: Option<DateTime<Utc>>,

    /// Total bytes in the secondary header time field.
    #[structopt(long, default_value = "6")]
    pub time_length: usize,

    /// Bytes of the time field holding the fraction of a second.
    #[structopt(long, default_value = "2")]
    pub time_fraction_length: usize,

    /// Print the packet after sending it.
    #[structopt(short, long)]
    pub verbose: bool,

    /// Print the packet without sending it.
    #[structopt(long)]
    pub dry_run: bool,
}

impl Options {
    #[inline]
    pub fn address(&self) -> Address {
        Address::new(self.host.clone(), self.port)
    }

    pub fn packet_config(&self) -> Result<PacketConfig, EncodeError> {
        let secondary_header = if self.no_secondary_header {
            None
        } else {
            Some(Timestamp {
                time:   self.time.unwrap_or_else(Utc::now),
                format: TimeFormat::new(self.time_length, self.time_fraction_length)?,
            })
        };

        Ok(PacketConfig {
            apid: self.apid,
            sequence_count: self.sequence_count,
            secondary_header,
            length: self.length,
            data: self.data.clone(),
            fields: self.fields.clone(),
        })
    }
}

#[cfg(test)]
mod test {
    use structopt::StructOpt as _;

    use super::*;

    #[test]
    fn test_defaults() -> eyre::Result<()> {
        let options = Options::from_iter_safe(["send_packet", "--apid", "100"])?;

        assert_eq!(options.address(), Address::new("localhost", 1235));
        assert_eq!(options.sequence_count, 0);

        let config = options.packet_config()?;
        assert_eq!(config.apid, 100);
        assert_eq!(config.secondary_header.map(|ts| ts.format), Some(TimeFormat::DEFAULT));

        Ok(())
    }

    #[test]
    fn test_fields_and_time() -> eyre::Result<()> {
        let options = Options::from_iter_safe([
            "send_packet",
            "--apid",
            "5",
            "-n",
            "7",
            "-f",
            "B:10",
            "--field",
            "2:B:12",
            "--time",
            "2021-01-10T16:28:32",
            "--time-length",
            "4",
            "--time-fraction-length",
            "0",
        ])?;

        let config = options.packet_config()?;
        assert_eq!(config.fields, vec!["B:10", "2:B:12"]);
        assert_eq!(config.sequence_count, 7);
        assert_eq!(config.secondary_header.map(|ts| ts.time.timestamp()), Some(1_610_296_112));

        Ok(())
    }

    #[test]
    fn test_no_secondary_header() -> eyre::Result<()> {
        let options = Options::from_iter_safe(["send_packet", "--apid", "1", "--no-secondary-header"])?;
        assert_eq!(options.packet_config()?.secondary_header, None);

        Ok(())
    }

    #[test]
    fn test_bad_time_width() -> eyre::Result<()> {
        let options = Options::from_iter_safe(["send_packet", "--apid", "1", "--time-length", "5"])?;
        assert!(matches!(options.packet_config(), Err(EncodeError::InvalidTimeWidth(_))));

        Ok(())
    }
}
