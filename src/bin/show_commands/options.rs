use message::DecodeOptions;
use net::Address;

/// Show commands received via UDP.
#[derive(Debug, Clone, PartialEq, Eq, structopt::StructOpt)]
pub struct Options {
    /// Host to bind to. Defaults to all interfaces.
    #[structopt(long, default_value = "")]
    pub host: String,

    /// UDP port to listen for commands on.
    #[structopt(long, default_value = "1234")]
    pub port: u16,

    /// Commands are not CCSDS packets; only dump them.
    #[structopt(long)]
    pub not_ccsds: bool,

    /// Commands are not cFS-style; skip opcode decoding.
    #[structopt(long)]
    pub not_cfs: bool,

    /// Print decoded headers as JSON.
    #[structopt(long)]
    pub json: bool,
}

impl Options {
    #[inline]
    pub fn address(&self) -> Address {
        Address::new(self.host.clone(), self.port)
    }

    #[inline]
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            ccsds:  !self.not_ccsds,
            opcode: !self.not_cfs,
        }
    }
}
