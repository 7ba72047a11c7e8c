use crate::details::icmp::v4::echo_frame::EchoFrame;
use crate::details::icmp::v4::reply_decoder::{decode, Decoded};
use crate::details::icmp::v4::{SequenceNumber, SessionId, TSocket};
use crate::details::records::{AttemptRecord, AttemptRecordData, SessionResult};
use crate::details::tick_clock::TickClock;
use crate::details::transport::{ReceiveRecord, Transport};
use crate::details::{PingError, PingResult};
use crate::{Attempts, Destination};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Drives the echo exchanges of one session over one exclusively owned socket.
pub(crate) struct Session<S> {
    transport: Transport<S>,
    destination: Arc<Destination>,
    packet_size: usize,
    attempts: Attempts,
    timeout: Duration,
    session_id: SessionId,
    clock: TickClock,
    halt_tx: mpsc::Sender<()>,
    halt_rx: mpsc::Receiver<()>,
}

impl<S> Session<S>
where
    S: TSocket,
{
    pub(crate) fn new(
        socket: S,
        destination: Destination,
        packet_size: usize,
        attempts: Attempts,
        timeout: Duration,
        session_id: SessionId,
    ) -> Self {
        let clock = TickClock::start();
        let (halt_tx, halt_rx) = mpsc::channel::<()>();
        Session {
            transport: Transport::new(socket, clock),
            destination: Arc::new(destination),
            packet_size,
            attempts,
            timeout,
            session_id,
            clock,
            halt_tx,
            halt_rx,
        }
    }

    pub(crate) fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub(crate) fn destination(&self) -> &Destination {
        &self.destination
    }

    pub(crate) fn halt_sender(&self) -> mpsc::Sender<()> {
        self.halt_tx.clone()
    }

    /// Runs attempts until the budget is used up, the session is halted or a fatal
    /// transport error occurs. Timeouts are recorded, not returned as errors.
    pub(crate) fn run(&mut self, on_record: &mut dyn FnMut(&AttemptRecord)) -> PingResult<SessionResult> {
        tracing::debug!(
            "pinging {} with {} bytes, session id {}",
            self.destination,
            self.packet_size,
            self.session_id
        );
        let mut result = SessionResult::new(self.attempts.retains_records());
        let mut sequence_number = SequenceNumber::start_value();
        let mut attempt: u32 = 0;

        while self.attempts.allows(attempt) {
            if self.halted() {
                break;
            }
            let Some(record) = self.attempt(sequence_number)? else {
                break;
            };
            on_record(&record);
            result.append(&record);

            sequence_number = sequence_number.next();
            attempt = attempt.saturating_add(1);
        }
        tracing::debug!("session {} done after {attempt} attempts", self.session_id);
        Ok(result)
    }

    /// One echo exchange. `Ok(None)` if the session was halted while waiting for a reply.
    ///
    /// Foreign and late frames do not extend the wait: once `timeout` has passed since the
    /// send, the attempt is recorded as timed out.
    fn attempt(&mut self, sequence_number: SequenceNumber) -> PingResult<Option<AttemptRecord>> {
        let mut frame = EchoFrame::build(self.packet_size, sequence_number, self.session_id, self.clock.now_ms())
            .ok_or_else(|| PingError::configuration("could not create ICMP package"))?;

        let bytes_sent = self.transport.send(self.destination.address, &mut frame).map_err(|e| {
            tracing::error!("sending echo request {sequence_number} failed: {e}");
            PingError::from(e)
        })?;
        let deadline = Instant::now() + self.timeout;

        loop {
            if self.halted() {
                return Ok(None);
            }
            if Instant::now() >= deadline {
                tracing::debug!("echo request {sequence_number} timed out among unrelated traffic");
                return Ok(Some(self.record_data(sequence_number, frame.len(), bytes_sent).timed_out()));
            }
            let received = self.transport.receive().map_err(|e| {
                tracing::error!("receiving reply to {sequence_number} failed: {e}");
                PingError::from(e)
            })?;
            let (ip_addr, bytes_received, decoded) = match received {
                ReceiveRecord::Timeout => {
                    tracing::debug!("echo request {sequence_number} timed out");
                    return Ok(Some(self.record_data(sequence_number, frame.len(), bytes_sent).timed_out()));
                }
                ReceiveRecord::Data { ip_addr, frame: reply } => {
                    (ip_addr, reply.len(), decode(reply, self.session_id, self.clock.now_ms()))
                }
            };

            if let Some(replied) = answered_sequence_number(decoded) {
                if replied != sequence_number {
                    tracing::warn!("discarding late reply {replied} from {ip_addr}, waiting for {sequence_number}");
                    continue;
                }
            }
            match self.record_data(sequence_number, frame.len(), bytes_sent).decided(bytes_received, decoded) {
                Some(record) => {
                    tracing::debug!("echo request {sequence_number}: {decoded:?} from {ip_addr}");
                    return Ok(Some(record));
                }
                None => tracing::trace!("skipping frame from {ip_addr}"),
            }
        }
    }

    fn record_data(&self, sequence_number: SequenceNumber, packet_size: usize, bytes_sent: usize) -> AttemptRecordData {
        AttemptRecordData { destination: self.destination.clone(), packet_size, sequence_number, bytes_sent }
    }

    fn halted(&self) -> bool {
        match self.halt_rx.try_recv() {
            Ok(()) => {
                tracing::debug!("session {} halted", self.session_id);
                true
            }
            Err(mpsc::TryRecvError::Empty | mpsc::TryRecvError::Disconnected) => false,
        }
    }
}

// The sequence number a frame answers, if it is known to answer one of this session's requests.
fn answered_sequence_number(decoded: Decoded) -> Option<SequenceNumber> {
    match decoded {
        Decoded::Accepted { sequence_number, .. }
        | Decoded::TtlExceeded { sequence_number, quotes_session: true, .. } => Some(sequence_number),
        _ => None,
    }
}
