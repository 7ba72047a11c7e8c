use crate::details::icmp::v4::{ICMP_MIN_PACKET_SIZE, MAX_PING_DATA_SIZE};
use crate::details::PingError;
use std::time::Duration;

pub const DEFAULT_PACKET_SIZE: usize = 32;
pub const DEFAULT_TTL: u32 = 30;
pub const MAX_TTL: u32 = 255;

/// How many echo requests a session sends.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Attempts {
    Count(u32),
    /// Ping until halted. Records are reported but not retained.
    Unbounded,
}

impl Attempts {
    pub(crate) fn allows(self, attempt: u32) -> bool {
        match self {
            Attempts::Count(count) => attempt < count,
            Attempts::Unbounded => true,
        }
    }

    pub(crate) fn retains_records(self) -> bool {
        matches!(self, Attempts::Count(_))
    }
}

/// Invocation parameters of one ping session.
#[derive(Clone, Debug)]
pub struct PingConfig {
    /// Host name or dotted-quad address.
    pub host: String,
    /// Requested echo request size in bytes.
    pub packet_size: usize,
    pub ttl: u32,
    pub attempts: Attempts,
    /// Receive and send timeout of each attempt.
    pub timeout: Duration,
}

impl Default for PingConfig {
    fn default() -> Self {
        PingConfig {
            host: String::new(),
            packet_size: DEFAULT_PACKET_SIZE,
            ttl: DEFAULT_TTL,
            attempts: Attempts::Count(4),
            timeout: Duration::from_millis(1000),
        }
    }
}

impl PingConfig {
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        PingConfig { host: host.into(), ..PingConfig::default() }
    }

    /// Checks the parameters before anything is resolved or opened.
    pub fn validate(&self) -> Result<(), PingError> {
        if self.host.trim().is_empty() {
            return Err(PingError::configuration("Invalid or empty hostname."));
        }
        if !(ICMP_MIN_PACKET_SIZE..=MAX_PING_DATA_SIZE).contains(&self.packet_size) {
            return Err(PingError::configuration(format!(
                "Packet size out of bounds, {} < {ICMP_MIN_PACKET_SIZE} or {} > {MAX_PING_DATA_SIZE}.",
                self.packet_size, self.packet_size
            )));
        }
        if !(1..=MAX_TTL).contains(&self.ttl) {
            return Err(PingError::configuration(format!(
                "TTL size out of bounds, {} < 1 or {} > {MAX_TTL}.",
                self.ttl, self.ttl
            )));
        }
        if self.attempts == Attempts::Count(0) {
            return Err(PingError::configuration("Attempt count must be positive."));
        }
        if self.timeout.is_zero() {
            return Err(PingError::configuration("Timeout must be positive."));
        }
        Ok(())
    }
}
