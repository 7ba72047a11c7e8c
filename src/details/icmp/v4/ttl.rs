type TtlInnerType = u8;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Ttl(pub TtlInnerType);

impl Ttl {
    /// Estimates the path length from the TTL observed in a reply.
    ///
    /// The sender's initial TTL is unknown, so this relies on the common defaults: a reply
    /// arriving with 64 is counted as one hop (LAN), 128 as zero hops (local host), and
    /// anything else as `256 - ttl`. It is a heuristic, not a measurement.
    #[must_use]
    pub fn hops(self) -> u16 {
        match 256 - u16::from(self.0) {
            192 => 1,
            128 => 0,
            remaining => remaining,
        }
    }
}

impl From<TtlInnerType> for Ttl {
    fn from(integer: TtlInnerType) -> Self {
        Ttl(integer)
    }
}

impl From<Ttl> for TtlInnerType {
    fn from(ttl: Ttl) -> Self {
        ttl.0
    }
}

impl std::fmt::Display for Ttl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
