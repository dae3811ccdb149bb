use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::core_error::ProtocolError;

// 0..=255 without leading zeros
const OCTET: &str = "25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9][0-9]|[0-9]";

static PASV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\(({o}),({o}),({o}),({o}),({o}),({o})\)",
        o = OCTET
    ))
    .expect("passive reply regex is valid")
});

/// Data channel address announced in a `227` reply.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PassiveAddress {
    ip: Ipv4Addr,
    port: u16,
}

impl PassiveAddress {
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self { ip, port }
    }

    /// Finds the `(h1,h2,h3,h4,p1,p2)` sextuple anywhere in the reply text.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let malformed = || ProtocolError::MalformedPassiveReply(text.to_string());

        let caps = PASV_RE.captures(text).ok_or_else(malformed)?;
        let mut fields = [0u8; 6];
        for (i, field) in fields.iter_mut().enumerate() {
            *field = caps[i + 1].parse().map_err(|_| malformed())?;
        }

        let ip = Ipv4Addr::new(fields[0], fields[1], fields[2], fields[3]);
        let port = (fields[4] as u16) * 256 + fields[5] as u16;
        Ok(Self { ip, port })
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.ip, self.port))
    }
}

impl FromStr for PassiveAddress {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PassiveAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}
