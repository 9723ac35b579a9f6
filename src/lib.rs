pub use codec;
pub use message;
pub use net;
pub use util;

pub mod sawtooth;
pub mod trace;
