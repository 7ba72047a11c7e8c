use std::io;
use std::net::IpAddr;

pub(crate) mod raw_socket;

/// The socket operations an echo session needs.
///
/// `recv_from` must deliver the complete IPv4 frame (IP header included) and fail with
/// `WouldBlock` or `TimedOut` when its receive timeout expires.
pub trait TSocket: Send {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize>;
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)>;
}
