use message::{
    Epoch,
    InvalidTimeWidth,
    PreprocessorConfig,
};
use net::Address;

/// Show telemetry packets received via UDP with their generation times.
#[derive(Debug, Clone, PartialEq, Eq, structopt::StructOpt)]
pub struct Options {
    /// Host to bind to. Defaults to all interfaces.
    #[structopt(long, default_value = "")]
    pub host: String,

    #[structopt(long, default_value = "10015")]
    pub port: u16,

    /// Byte offset of the generation time. Without it, reception time is used.
    #[structopt(long)]
    pub time_offset: Option<usize>,

    /// Total bytes of the generation time.
    #[structopt(long, default_value = "6")]
    pub time_length: usize,

    /// Bytes of the generation time holding the fraction of a second.
    #[structopt(long, default_value = "2")]
    pub fraction_length: usize,

    /// Epoch the generation time counts from: tai, unix, gps, or j2000.
    #[structopt(long, default_value = "unix")]
    pub epoch: Epoch,

    /// Print each packet's information as JSON.
    #[structopt(long)]
    pub json: bool,
}

impl Options {
    #[inline]
    pub fn address(&self) -> Address {
        Address::new(self.host.clone(), self.port)
    }

    #[inline]
    pub fn preprocessor_config(&self) -> Result<PreprocessorConfig, InvalidTimeWidth> {
        PreprocessorConfig::new(self.time_offset, self.time_length, self.fraction_length, self.epoch)
    }
}
