use super::checksum::checksum;
use super::{SequenceNumber, SessionId};
use pnet_packet::icmp::echo_request::{EchoRequestPacket, MutableEchoRequestPacket};
use pnet_packet::icmp::{IcmpCode, IcmpTypes};
use pnet_packet::Packet;

/// Smallest valid ICMP message: type, code, checksum, identifier, sequence number.
pub(crate) const ICMP_MIN: usize = 8;
/// Echo header as sent by us: the standard eight bytes plus a 4-byte send timestamp.
pub const ECHO_HEADER_SIZE: usize = ICMP_MIN + TIMESTAMP_SIZE;
/// Largest accepted packet size.
pub const MAX_PING_DATA_SIZE: usize = 1024;

const TIMESTAMP_SIZE: usize = 4;
const TIMESTAMP_OFFSET: usize = ICMP_MIN;
const CHECKSUM_OFFSET: usize = 2;
const FILL_PATTERN: [u8; 4] = 0xDEAD_BEEF_u32.to_be_bytes();

/// Byte length of the echo request built for a requested packet size.
#[must_use]
pub fn frame_size(requested: usize) -> usize {
    requested.min(MAX_PING_DATA_SIZE).max(ECHO_HEADER_SIZE)
}

/// A complete echo request, ready to be written to the socket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct EchoFrame {
    bytes: Vec<u8>,
}

impl EchoFrame {
    /// Builds an echo request of `frame_size(size)` bytes.
    ///
    /// The payload behind the timestamp is padded with a repeating fixed pattern; the
    /// checksum is computed last, over the complete frame.
    pub(crate) fn build(
        size: usize,
        sequence_number: SequenceNumber,
        session_id: SessionId,
        timestamp: u32,
    ) -> Option<EchoFrame> {
        let len = frame_size(size);
        let mut payload = Vec::with_capacity(len - ICMP_MIN);
        payload.extend_from_slice(&timestamp.to_be_bytes());
        payload.extend(FILL_PATTERN.iter().copied().cycle().take(len - ECHO_HEADER_SIZE));

        let buf = vec![0u8; EchoRequestPacket::minimum_packet_size() + payload.len()];
        let mut package = MutableEchoRequestPacket::owned(buf)?;
        package.set_icmp_type(IcmpTypes::EchoRequest);
        package.set_icmp_code(IcmpCode::new(0));
        package.set_identifier(session_id.into());
        package.set_sequence_number(sequence_number.into());
        package.set_payload(&payload);
        package.set_checksum(0_u16);

        let mut frame = EchoFrame { bytes: package.packet().to_vec() };
        frame.update_checksum();
        Some(frame)
    }

    /// Overwrites the send timestamp and recomputes the checksum.
    pub(crate) fn stamp(&mut self, timestamp: u32) {
        self.bytes[TIMESTAMP_OFFSET..ECHO_HEADER_SIZE].copy_from_slice(&timestamp.to_be_bytes());
        self.update_checksum();
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    fn update_checksum(&mut self) {
        self.bytes[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].fill(0);
        let sum = checksum(&self.bytes);
        self.bytes[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&sum.to_be_bytes());
    }
}

/// Reads the send timestamp from an echo message produced by [`EchoFrame::build`].
pub(crate) fn read_timestamp(icmp: &[u8]) -> Option<u32> {
    let bytes: [u8; TIMESTAMP_SIZE] = icmp.get(TIMESTAMP_OFFSET..ECHO_HEADER_SIZE)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}
