use rand::Rng;

type SessionIdInnerType = u16;

/// Identifier carried in every echo request of one session.
///
/// Raw sockets see all ICMP traffic of the host, so replies whose identifier differs
/// belong to some other pinger and are skipped.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct SessionId(SessionIdInnerType);

impl SessionId {
    pub(crate) fn random() -> SessionId {
        SessionId(rand::thread_rng().gen())
    }
}

impl From<SessionId> for SessionIdInnerType {
    fn from(value: SessionId) -> Self {
        value.0
    }
}

impl From<SessionIdInnerType> for SessionId {
    fn from(value: SessionIdInnerType) -> Self {
        SessionId(value)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}
