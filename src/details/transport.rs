use crate::details::icmp::v4::echo_frame::EchoFrame;
use crate::details::icmp::v4::TSocket;
use crate::details::tick_clock::TickClock;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

// IP header with options plus the largest echo reply, rounded up generously.
const RECV_BUFFER_SIZE: usize = 4096;

pub(crate) enum ReceiveRecord<'a> {
    Timeout,
    Data { ip_addr: IpAddr, frame: &'a [u8] },
}

/// Owns the socket and its receive buffer for the lifetime of one session.
pub(crate) struct Transport<S> {
    socket: S,
    recv_buf: Box<[u8]>,
    clock: TickClock,
}

impl<S> Transport<S>
where
    S: TSocket,
{
    pub(crate) fn new(socket: S, clock: TickClock) -> Self {
        Transport { socket, recv_buf: vec![0u8; RECV_BUFFER_SIZE].into_boxed_slice(), clock }
    }

    /// Re-stamps `frame` right before writing it, so round-trip times exclude build latency.
    pub(crate) fn send(&self, destination: Ipv4Addr, frame: &mut EchoFrame) -> io::Result<usize> {
        let addr: socket2::SockAddr = SocketAddr::new(IpAddr::V4(destination), 0).into();
        frame.stamp(self.clock.now_ms());
        let bytes_written = self.socket.send_to(frame.as_bytes(), &addr)?;
        tracing::trace!("sent {bytes_written} bytes to {destination}");
        Ok(bytes_written)
    }

    /// Blocks until a frame arrives or the socket's receive timeout expires.
    pub(crate) fn receive(&mut self) -> io::Result<ReceiveRecord<'_>> {
        match self.socket.recv_from(&mut self.recv_buf) {
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(ReceiveRecord::Timeout)
            }
            Err(e) => Err(e),
            Ok((bytes_read, ip_addr)) => {
                tracing::trace!("received {bytes_read} bytes from {ip_addr}");
                Ok(ReceiveRecord::Data { ip_addr, frame: &self.recv_buf[..bytes_read] })
            }
        }
    }
}
