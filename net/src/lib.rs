pub use address::Address;
pub use datagram::{
    DatagramOps,
    DatagramSender,
};

mod address;
mod datagram;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SocketMode {
    Connect,
    Bind,
}

/// Open a socket of type `T` either bound to or connected to `address`.
#[inline]
pub async fn open<T>(mode: SocketMode, address: &T::Address) -> std::io::Result<T>
where
    T: DatagramOps,
{
    match mode {
        SocketMode::Connect => T::connect(address).await,
        SocketMode::Bind => T::bind(address).await,
    }
}
