//! Endpoint - parsed transport address
//!
//! Supported schemes:
//! - `tcp://host:port` (`*` as host binds every interface)
//! - `udp://host:port`
//! - `log://label`

use std::fmt;
use std::str::FromStr;

use crate::ContractError;

/// Parsed transport address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// TCP pub-sub listener, `host:port`
    Tcp(String),
    /// UDP datagram target, `host:port`
    Udp(String),
    /// Tracing-only sink
    Log(String),
}

impl Endpoint {
    /// Scheme name
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Tcp(_) => "tcp",
            Self::Udp(_) => "udp",
            Self::Log(_) => "log",
        }
    }
}

fn parse_host_port(address: &str, rest: &str) -> Result<String, ContractError> {
    let (host, port) = rest
        .rsplit_once(':')
        .ok_or_else(|| ContractError::invalid_address(address, "expected host:port"))?;

    if host.is_empty() {
        return Err(ContractError::invalid_address(address, "empty host"));
    }
    port.parse::<u16>()
        .map_err(|e| ContractError::invalid_address(address, format!("bad port '{port}': {e}")))?;

    let host = if host == "*" { "0.0.0.0" } else { host };
    Ok(format!("{host}:{port}"))
}

impl FromStr for Endpoint {
    type Err = ContractError;

    fn from_str(address: &str) -> Result<Self, Self::Err> {
        let (scheme, rest) = address
            .split_once("://")
            .ok_or_else(|| ContractError::invalid_address(address, "missing scheme"))?;

        match scheme {
            "tcp" => Ok(Self::Tcp(parse_host_port(address, rest)?)),
            "udp" => Ok(Self::Udp(parse_host_port(address, rest)?)),
            "log" => Ok(Self::Log(rest.to_string())),
            other => Err(ContractError::invalid_address(
                address,
                format!("unsupported scheme '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(target) | Self::Udp(target) | Self::Log(target) => {
                write!(f, "{}://{}", self.scheme(), target)
            }
        }
    }
}
