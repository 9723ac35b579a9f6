pub mod build;
mod hexdump;
mod macros;

pub use hexdump::hexdump;
