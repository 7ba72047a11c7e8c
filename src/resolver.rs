use crate::details::PingError;
use crate::PingResult;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

/// A resolved ping target. Immutable once a session starts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Destination {
    pub address: Ipv4Addr,
    /// The host as given by the caller.
    pub host: String,
    pub canonical_name: Option<String>,
}

impl Destination {
    /// The canonical name if known, the address otherwise.
    #[must_use]
    pub fn name(&self) -> String {
        self.canonical_name.clone().unwrap_or_else(|| self.address.to_string())
    }
}

impl From<Ipv4Addr> for Destination {
    fn from(address: Ipv4Addr) -> Self {
        Destination { address, host: address.to_string(), canonical_name: None }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.canonical_name {
            Some(name) if *name != self.address.to_string() => write!(f, "{name} [{}]", self.address),
            _ => write!(f, "{}", self.address),
        }
    }
}

/// Turns a host name or address literal into a [`Destination`].
pub trait Resolve {
    fn resolve(&self, host: &str) -> PingResult<Destination>;
}

/// Resolves through the system resolver.
///
/// A dotted-quad literal is used as is and reverse-resolved for its name; a host name is
/// resolved to its first IPv4 address and keeps the given name.
#[derive(Clone, Copy, Debug, Default)]
pub struct DnsResolver;

impl Resolve for DnsResolver {
    fn resolve(&self, host: &str) -> PingResult<Destination> {
        if let Ok(address) = host.parse::<Ipv4Addr>() {
            let canonical_name = lookup_addr(address);
            return Ok(Destination { address, host: host.to_owned(), canonical_name });
        }
        let address = lookup_host_v4(host)?;
        Ok(Destination { address, host: host.to_owned(), canonical_name: Some(host.to_owned()) })
    }
}

fn lookup_host_v4(hostname: &str) -> PingResult<Ipv4Addr> {
    let ips: Vec<IpAddr> = dns_lookup::lookup_host(hostname).map_err(|error| {
        tracing::debug!("lookup of {hostname} failed: {error}");
        PingError::resolution("could not resolve hostname ".to_owned() + hostname)
    })?;
    ips.into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(ipv4) => Some(ipv4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| PingError::resolution("could not resolve hostname ".to_owned() + hostname + " to IPv4"))
}

fn lookup_addr(address: Ipv4Addr) -> Option<String> {
    match dns_lookup::lookup_addr(&IpAddr::V4(address)) {
        Ok(hostname) => Some(hostname),
        Err(error) => {
            tracing::debug!("reverse lookup of {address} failed: {error}");
            None
        }
    }
}
