use crate::details::icmp::v4::{RawSocket, SessionId, TSocket, Ttl};
use crate::details::records::{AttemptRecord, SessionResult};
use crate::details::session::Session;
use crate::details::{PingError, PingResult};
use crate::{Destination, DnsResolver, PingConfig, Resolve};
use std::sync::mpsc;

/// Stops a running session from another thread.
///
/// The session notices the request before the next attempt, or after the receive that
/// is currently blocking returns (bounded by the configured timeout).
#[derive(Clone, Debug)]
pub struct HaltHandle(mpsc::Sender<()>);

impl HaltHandle {
    pub fn halt(&self) {
        // mpsc::Sender::send() returns error only if the session is gone already.
        let _maybe_err = self.0.send(());
    }
}

/// An echo session towards one destination.
pub struct PingSession<S = RawSocket>(Session<S>);

impl PingSession<RawSocket> {
    /// Opens a raw socket configured with the TTL and timeout of `config`.
    pub fn create(config: &PingConfig, destination: Destination) -> PingResult<Self> {
        config.validate()?;
        Self::open(config, destination)
    }

    // Expects a validated config.
    fn open(config: &PingConfig, destination: Destination) -> PingResult<Self> {
        let ttl = Ttl(u8::try_from(config.ttl).map_err(|_| PingError::configuration("TTL size out of bounds."))?);
        let socket = RawSocket::open(ttl, config.timeout, config.timeout).map_err(|e| {
            tracing::error!("could not open raw socket: {e}");
            PingError::setup(&e)
        })?;
        Ok(Self::assemble(config, destination, socket))
    }
}

impl<S> PingSession<S>
where
    S: TSocket,
{
    /// Runs the session over an already configured socket. The TTL of `config` is not
    /// applied to it; its timeout still bounds every attempt.
    pub fn with_socket(config: &PingConfig, destination: Destination, socket: S) -> PingResult<Self> {
        config.validate()?;
        Ok(Self::assemble(config, destination, socket))
    }

    fn assemble(config: &PingConfig, destination: Destination, socket: S) -> Self {
        PingSession(Session::new(
            socket,
            destination,
            config.packet_size,
            config.attempts,
            config.timeout,
            SessionId::random(),
        ))
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.0.session_id()
    }

    #[must_use]
    pub fn destination(&self) -> &Destination {
        self.0.destination()
    }

    #[must_use]
    pub fn halt_handle(&self) -> HaltHandle {
        HaltHandle(self.0.halt_sender())
    }

    pub fn run(&mut self) -> PingResult<SessionResult> {
        self.run_with(|_| {})
    }

    /// Like [`PingSession::run`], handing every record to `on_record` as soon as it is
    /// decided. This is the only way to see records of an unbounded session.
    pub fn run_with(&mut self, mut on_record: impl FnMut(&AttemptRecord)) -> PingResult<SessionResult> {
        self.0.run(&mut on_record)
    }
}

/// Validates `config`, resolves its host and pings it over a raw socket.
pub fn ping(config: &PingConfig) -> PingResult<SessionResult> {
    ping_with(config, &DnsResolver, |_| {})
}

pub fn ping_with(
    config: &PingConfig,
    resolver: &dyn Resolve,
    on_record: impl FnMut(&AttemptRecord),
) -> PingResult<SessionResult> {
    config.validate()?;
    let destination = resolver.resolve(&config.host)?;
    tracing::trace!("resolved {} to {}", config.host, destination.address);
    let mut session = PingSession::open(config, destination)?;
    session.run_with(on_record)
}
