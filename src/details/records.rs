use crate::details::icmp::v4::reply_decoder::Decoded;
use crate::details::icmp::v4::{SequenceNumber, Ttl};
use crate::Destination;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// How one echo exchange ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttemptOutcome {
    /// An echo reply for this attempt arrived.
    Accepted,
    /// A router on the path reported that the TTL ran out.
    TtlExceeded,
    /// The destination was reported unreachable.
    Unreachable,
    /// The reply was too short to decode.
    Malformed,
    /// An ICMP message of a type this client does not handle.
    UnknownType(u8),
    /// No decisive reply before the receive timeout expired.
    TimedOut,
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Accepted => write!(f, "Reply received."),
            AttemptOutcome::TtlExceeded => write!(f, "TTL expired."),
            AttemptOutcome::Unreachable => write!(f, "Destination host unreachable."),
            AttemptOutcome::Malformed => write!(f, "Too few bytes returned from host."),
            AttemptOutcome::UnknownType(icmp_type) => write!(f, "Unknown ICMP packet type {icmp_type}."),
            AttemptOutcome::TimedOut => write!(f, "Request timed out."),
        }
    }
}

/// The result of one echo exchange. Never changed after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptRecord {
    pub destination: Arc<Destination>,
    /// Size of the echo request in bytes, header included.
    pub packet_size: usize,
    pub sequence_number: SequenceNumber,
    pub bytes_sent: usize,
    /// `None` if no reply arrived in time.
    pub bytes_received: Option<usize>,
    pub ttl: Option<Ttl>,
    pub hops: Option<u16>,
    /// Only known for accepted echo replies.
    pub rtt: Option<Duration>,
    pub outcome: AttemptOutcome,
}

impl AttemptRecord {
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.outcome == AttemptOutcome::TimedOut
    }
}

/// What the session knows about an attempt when it is decided.
pub(crate) struct AttemptRecordData {
    pub destination: Arc<Destination>,
    pub packet_size: usize,
    pub sequence_number: SequenceNumber,
    pub bytes_sent: usize,
}

impl AttemptRecordData {
    pub(crate) fn timed_out(self) -> AttemptRecord {
        self.into_record(None, None, None, None, AttemptOutcome::TimedOut)
    }

    /// Builds the record for a decoded reply, or `None` for `Decoded::Retry`, which does
    /// not decide the attempt.
    pub(crate) fn decided(self, bytes_received: usize, decoded: Decoded) -> Option<AttemptRecord> {
        let received = Some(bytes_received);
        let record = match decoded {
            Decoded::Retry => return None,
            Decoded::Accepted { sequence_number, ttl, hops, rtt_ms } => {
                let rtt = Some(Duration::from_millis(u64::from(rtt_ms)));
                AttemptRecord {
                    sequence_number,
                    ..self.into_record(received, Some(ttl), Some(hops), rtt, AttemptOutcome::Accepted)
                }
            }
            // Keeps the attempt's sequence number; a foreign quote says nothing about it.
            Decoded::TtlExceeded { ttl, hops, .. } => {
                self.into_record(received, Some(ttl), Some(hops), None, AttemptOutcome::TtlExceeded)
            }
            Decoded::Unreachable => self.into_record(received, None, None, None, AttemptOutcome::Unreachable),
            Decoded::Malformed => self.into_record(received, None, None, None, AttemptOutcome::Malformed),
            Decoded::UnknownType(icmp_type) => {
                self.into_record(received, None, None, None, AttemptOutcome::UnknownType(icmp_type))
            }
        };
        Some(record)
    }

    fn into_record(
        self,
        bytes_received: Option<usize>,
        ttl: Option<Ttl>,
        hops: Option<u16>,
        rtt: Option<Duration>,
        outcome: AttemptOutcome,
    ) -> AttemptRecord {
        AttemptRecord {
            destination: self.destination,
            packet_size: self.packet_size,
            sequence_number: self.sequence_number,
            bytes_sent: self.bytes_sent,
            bytes_received,
            ttl,
            hops,
            rtt,
            outcome,
        }
    }
}

/// Attempt records of one session, in attempt order.
///
/// Sessions with an unbounded attempt count do not retain records; they are only
/// handed to the reporting callback.
#[derive(Debug, Default)]
pub struct SessionResult {
    records: Vec<AttemptRecord>,
    retain: bool,
}

impl SessionResult {
    pub(crate) fn new(retain: bool) -> Self {
        SessionResult { records: Vec::new(), retain }
    }

    pub(crate) fn append(&mut self, record: &AttemptRecord) {
        if self.retain {
            self.records.push(record.clone());
        }
    }

    #[must_use]
    pub fn all(&self) -> &[AttemptRecord] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<AttemptRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn data(sequence_number: u16) -> AttemptRecordData {
        AttemptRecordData {
            destination: Arc::new(Destination::from(Ipv4Addr::LOCALHOST)),
            packet_size: 32,
            sequence_number: sequence_number.into(),
            bytes_sent: 32,
        }
    }

    #[test]
    fn timed_out_has_no_reply_fields() {
        let record = data(0).timed_out();
        assert!(record.timed_out());
        assert_eq!(None, record.bytes_received);
        assert_eq!(None, record.ttl);
        assert_eq!(None, record.rtt);
    }

    #[test]
    fn accepted_takes_reply_fields() {
        let decoded = Decoded::Accepted { sequence_number: 2.into(), ttl: Ttl(128), hops: 0, rtt_ms: 12 };
        let record = data(2).decided(52, decoded).unwrap();
        assert_eq!(AttemptOutcome::Accepted, record.outcome);
        assert_eq!(Some(52), record.bytes_received);
        assert_eq!(Some(Ttl(128)), record.ttl);
        assert_eq!(Some(0), record.hops);
        assert_eq!(Some(Duration::from_millis(12)), record.rtt);
    }

    #[test]
    fn ttl_exceeded_has_no_rtt() {
        let decoded =
            Decoded::TtlExceeded { sequence_number: 9.into(), ttl: Ttl(250), hops: 6, quotes_session: false };
        let record = data(1).decided(56, decoded).unwrap();
        assert_eq!(AttemptOutcome::TtlExceeded, record.outcome);
        assert_eq!(SequenceNumber::from(1), record.sequence_number);
        assert_eq!(Some(6), record.hops);
        assert_eq!(None, record.rtt);
    }

    #[test]
    fn unknown_type_keeps_sent_sequence_number() {
        let record = data(4).decided(28, Decoded::UnknownType(5)).unwrap();
        assert_eq!(AttemptOutcome::UnknownType(5), record.outcome);
        assert_eq!(SequenceNumber::from(4), record.sequence_number);
        assert_eq!(None, record.ttl);
    }

    #[test]
    fn retry_decides_nothing() {
        assert!(data(0).decided(28, Decoded::Retry).is_none());
    }

    #[test]
    fn result_keeps_attempt_order() {
        let mut result = SessionResult::new(true);
        result.append(&data(0).timed_out());
        result.append(&data(1).timed_out());
        let sequence_numbers: Vec<u16> = result.all().iter().map(|r| r.sequence_number.into()).collect();
        assert_eq!(vec![0, 1], sequence_numbers);
    }

    #[test]
    fn result_without_retention_stays_empty() {
        let mut result = SessionResult::new(false);
        result.append(&data(0).timed_out());
        assert!(result.into_records().is_empty());
    }

    #[test]
    fn outcome_messages() {
        assert_eq!("TTL expired.", format!("{}", AttemptOutcome::TtlExceeded));
        assert_eq!("Unknown ICMP packet type 13.", format!("{}", AttemptOutcome::UnknownType(13)));
    }
}
