use super::checksum::verify_checksum;
use super::echo_frame::{read_timestamp, ICMP_MIN};
use super::{SequenceNumber, SessionId, Ttl};
use pnet_packet::icmp::echo_reply::EchoReplyPacket;
use pnet_packet::icmp::echo_request::EchoRequestPacket;
use pnet_packet::icmp::time_exceeded::TimeExceededPacket;
use pnet_packet::icmp::{IcmpPacket, IcmpTypes};
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::Packet;

const MIN_IPV4_HEADER_SIZE: usize = 20;

/// Classification of one frame read from the raw socket.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Decoded {
    /// An echo reply to this session.
    Accepted { sequence_number: SequenceNumber, ttl: Ttl, hops: u16, rtt_ms: u32 },
    /// A router dropped the request because its TTL ran out. `quotes_session` is set when
    /// the quoted request carries this session's identifier.
    TtlExceeded { sequence_number: SequenceNumber, ttl: Ttl, hops: u16, quotes_session: bool },
    /// Traffic that is not ours to judge; receive again.
    Retry,
    Unreachable,
    Malformed,
    UnknownType(u8),
}

/// Decodes a raw IPv4 frame (IP header included) as read from the socket.
///
/// The ICMP message starts behind the IP header, whose length is taken from the header
/// itself since IP options make it variable. A bad reply checksum is logged, not rejected.
/// TTL-exceeded notifications are accepted whatever identifier they quote.
pub(crate) fn decode(frame: &[u8], session_id: SessionId, now_ms: u32) -> Decoded {
    let Some(ip_packet) = Ipv4Packet::new(frame) else {
        return Decoded::Malformed;
    };
    let header_len = usize::from(ip_packet.get_header_length()) * 4;
    if header_len < MIN_IPV4_HEADER_SIZE || frame.len() < header_len + ICMP_MIN {
        return Decoded::Malformed;
    }
    let icmp = &frame[header_len..];
    let ttl = Ttl(ip_packet.get_ttl());

    let Some(icmp_packet) = IcmpPacket::new(icmp) else {
        return Decoded::Malformed;
    };
    match icmp_packet.get_icmp_type() {
        IcmpTypes::EchoReply => decode_echo_reply(icmp, session_id, ttl, now_ms),
        IcmpTypes::TimeExceeded => decode_time_exceeded(icmp, session_id, ttl),
        IcmpTypes::DestinationUnreachable => Decoded::Unreachable,
        // A raw socket also sees the requests it sends to the loopback interface.
        IcmpTypes::EchoRequest => Decoded::Retry,
        other => Decoded::UnknownType(other.0),
    }
}

fn decode_echo_reply(icmp: &[u8], session_id: SessionId, ttl: Ttl, now_ms: u32) -> Decoded {
    let Some(echo_reply) = EchoReplyPacket::new(icmp) else {
        return Decoded::Malformed;
    };
    if echo_reply.get_identifier() != u16::from(session_id) {
        return Decoded::Retry;
    }
    let Some(timestamp) = read_timestamp(icmp) else {
        return Decoded::Malformed;
    };
    if !verify_checksum(icmp) {
        tracing::debug!("echo reply {} carries a bad checksum", echo_reply.get_sequence_number());
    }
    Decoded::Accepted {
        sequence_number: echo_reply.get_sequence_number().into(),
        ttl,
        hops: ttl.hops(),
        rtt_ms: now_ms.wrapping_sub(timestamp),
    }
}

fn decode_time_exceeded(icmp: &[u8], session_id: SessionId, ttl: Ttl) -> Decoded {
    let (sequence_number, quotes_session) = match quoted_echo_request(icmp) {
        Some((identifier, sequence_number)) => (sequence_number, identifier == u16::from(session_id)),
        None => {
            let sequence_number = EchoReplyPacket::new(icmp).map(|header| header.get_sequence_number());
            (sequence_number.unwrap_or_default(), false)
        }
    };
    Decoded::TtlExceeded { sequence_number: sequence_number.into(), ttl, hops: ttl.hops(), quotes_session }
}

// A TTL-exceeded message quotes the IP header and first 8 bytes of the dropped datagram.
// Returns identifier and sequence number of the quoted echo request.
fn quoted_echo_request(icmp: &[u8]) -> Option<(u16, u16)> {
    let time_exceeded = TimeExceededPacket::new(icmp)?;
    let quoted = time_exceeded.payload();
    let inner_ip = Ipv4Packet::new(quoted)?;
    let inner_header_len = usize::from(inner_ip.get_header_length()) * 4;
    let inner_icmp = quoted.get(inner_header_len..)?;
    if inner_header_len < MIN_IPV4_HEADER_SIZE || inner_icmp.len() < ICMP_MIN {
        return None;
    }
    let echo_request = EchoRequestPacket::new(inner_icmp)?;
    if echo_request.get_icmp_type() != IcmpTypes::EchoRequest {
        return None;
    }
    Some((echo_request.get_identifier(), echo_request.get_sequence_number()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::details::icmp::v4::echo_frame::EchoFrame;
    use pnet_packet::icmp::echo_reply::MutableEchoReplyPacket;
    use pnet_packet::icmp::IcmpCode;
    use pnet_packet::ipv4::MutableIpv4Packet;

    const SESSION: u16 = 0xABCD;

    /// Wraps an ICMP message in an IPv4 header with `options_len` bytes of IP options.
    pub(crate) fn ipv4_frame(ttl: u8, options_len: usize, icmp: &[u8]) -> Vec<u8> {
        let header_len = MIN_IPV4_HEADER_SIZE + options_len;
        let mut buf = vec![0u8; header_len + icmp.len()];
        let mut ip = MutableIpv4Packet::new(&mut buf).unwrap();
        ip.set_version(4);
        ip.set_header_length(u8::try_from(header_len / 4).unwrap());
        ip.set_total_length(u16::try_from(header_len + icmp.len()).unwrap());
        ip.set_ttl(ttl);
        ip.set_next_level_protocol(pnet_packet::ip::IpNextHeaderProtocols::Icmp);
        buf[header_len..].copy_from_slice(icmp);
        buf
    }

    /// An echo reply as a peer would return it for our request.
    pub(crate) fn echo_reply(identifier: u16, sequence_number: u16, timestamp: u32) -> Vec<u8> {
        let request =
            EchoFrame::build(32, sequence_number.into(), identifier.into(), timestamp).unwrap();
        let mut bytes = request.as_bytes().to_vec();
        let mut reply = MutableEchoReplyPacket::new(&mut bytes).unwrap();
        reply.set_icmp_type(IcmpTypes::EchoReply);
        reply.set_icmp_code(IcmpCode::new(0));
        bytes
    }

    /// A TTL-exceeded message quoting an echo request with the given fields.
    pub(crate) fn time_exceeded(identifier: u16, sequence_number: u16) -> Vec<u8> {
        let request = EchoFrame::build(32, sequence_number.into(), identifier.into(), 0).unwrap();
        let quoted = ipv4_frame(1, 0, &request.as_bytes()[..ICMP_MIN]);
        let mut icmp = vec![11u8, 0, 0, 0, 0, 0, 0, 0];
        icmp.extend_from_slice(&quoted);
        icmp
    }

    #[test]
    fn accepts_matching_echo_reply() {
        let frame = ipv4_frame(128, 0, &echo_reply(SESSION, 5, 1000));
        let decoded = decode(&frame, SESSION.into(), 1042);
        assert_eq!(
            Decoded::Accepted { sequence_number: 5.into(), ttl: Ttl(128), hops: 0, rtt_ms: 42 },
            decoded
        );
    }

    #[test]
    fn header_length_locates_icmp_message() {
        let frame = ipv4_frame(64, 8, &echo_reply(SESSION, 9, 10));
        let decoded = decode(&frame, SESSION.into(), 15);
        assert_eq!(
            Decoded::Accepted { sequence_number: 9.into(), ttl: Ttl(64), hops: 1, rtt_ms: 5 },
            decoded
        );
    }

    #[test]
    fn rtt_survives_clock_wrap() {
        let frame = ipv4_frame(250, 0, &echo_reply(SESSION, 1, u32::MAX - 1));
        match decode(&frame, SESSION.into(), 3) {
            Decoded::Accepted { rtt_ms, hops, .. } => {
                assert_eq!(5, rtt_ms);
                assert_eq!(6, hops);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn foreign_identifier_is_retried() {
        for (ttl, sequence_number) in [(1u8, 0u16), (64, 7), (128, 65535), (255, 3)] {
            let frame = ipv4_frame(ttl, 0, &echo_reply(0x1234, sequence_number, 0));
            assert_eq!(Decoded::Retry, decode(&frame, SESSION.into(), 0));
        }
    }

    #[test]
    fn own_echo_request_is_retried() {
        let request = EchoFrame::build(32, 0.into(), SESSION.into(), 0).unwrap();
        let frame = ipv4_frame(64, 0, request.as_bytes());
        assert_eq!(Decoded::Retry, decode(&frame, SESSION.into(), 0));
    }

    #[test]
    fn ttl_exceeded_carries_quoted_sequence_number() {
        let frame = ipv4_frame(254, 0, &time_exceeded(SESSION, 17));
        assert_eq!(
            Decoded::TtlExceeded { sequence_number: 17.into(), ttl: Ttl(254), hops: 2, quotes_session: true },
            decode(&frame, SESSION.into(), 0)
        );
    }

    #[test]
    fn ttl_exceeded_with_foreign_identifier_is_accepted() {
        let frame = ipv4_frame(254, 0, &time_exceeded(0x1234, 17));
        assert!(matches!(
            decode(&frame, SESSION.into(), 0),
            Decoded::TtlExceeded { quotes_session: false, .. }
        ));
    }

    #[test]
    fn ttl_exceeded_without_quote_falls_back_to_header() {
        let icmp = [11u8, 0, 0, 0, 0, 0, 0, 4];
        let frame = ipv4_frame(128, 0, &icmp);
        assert_eq!(
            Decoded::TtlExceeded { sequence_number: 4.into(), ttl: Ttl(128), hops: 0, quotes_session: false },
            decode(&frame, SESSION.into(), 0)
        );
    }

    #[test]
    fn destination_unreachable() {
        let frame = ipv4_frame(60, 0, &[3u8, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(Decoded::Unreachable, decode(&frame, SESSION.into(), 0));
    }

    #[test]
    fn unknown_type() {
        let frame = ipv4_frame(60, 0, &[13u8, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(Decoded::UnknownType(13), decode(&frame, SESSION.into(), 0));
    }

    #[test]
    fn too_few_bytes_is_malformed() {
        let frame = ipv4_frame(64, 0, &echo_reply(SESSION, 1, 0));
        assert_eq!(Decoded::Malformed, decode(&frame[..MIN_IPV4_HEADER_SIZE + 7], SESSION.into(), 0));
        assert_eq!(Decoded::Malformed, decode(&frame[..10], SESSION.into(), 0));
        assert_eq!(Decoded::Malformed, decode(&[], SESSION.into(), 0));
    }

    #[test]
    fn options_make_short_frame_malformed() {
        // 40-byte header claimed, only 8 bytes of ICMP behind a 20-byte header.
        let mut frame = ipv4_frame(64, 0, &echo_reply(SESSION, 1, 0)[..ICMP_MIN]);
        frame[0] = 0x4A;
        assert_eq!(Decoded::Malformed, decode(&frame, SESSION.into(), 0));
    }

    #[test]
    fn matching_reply_without_timestamp_is_malformed() {
        let frame = ipv4_frame(64, 0, &echo_reply(SESSION, 1, 0)[..ICMP_MIN]);
        assert_eq!(Decoded::Malformed, decode(&frame, SESSION.into(), 0));
    }
}
