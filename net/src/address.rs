use std::{
    fmt::{
        Display,
        Formatter,
    },
    io,
    net::{
        Ipv4Addr,
        SocketAddr,
    },
};

/// A host name or literal address plus a port. An empty host means every local interface.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    pub host: String,
    pub port: u16,
}

impl Address {
    #[inline]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Resolve to the first matching socket address.
    pub async fn resolve(&self) -> io::Result<SocketAddr> {
        if self.host.is_empty() {
            return Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port)));
        }

        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no addresses for {self}")))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.host.as_str() {
            "" => write!(f, "*:{}", self.port),
            host if host.contains(':') => write!(f, "[{}]:{}", host, self.port),
            host => write!(f, "{}:{}", host, self.port),
        }
    }
}
