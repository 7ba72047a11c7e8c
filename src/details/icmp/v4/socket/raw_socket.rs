use super::TSocket;
use crate::details::icmp::v4::Ttl;
use socket2::{Domain, Protocol, Type};
use std::net::IpAddr;
use std::{io, time::Duration};

/// Raw ICMPv4 socket. Needs root or `CAP_NET_RAW`.
pub struct RawSocket {
    socket: socket2::Socket,
}

impl RawSocket {
    /// Opens the socket and sets TTL and both I/O timeouts for its whole lifetime.
    ///
    /// On failure the partially configured socket is dropped, which closes it.
    pub fn open(ttl: Ttl, recv_timeout: Duration, send_timeout: Duration) -> Result<Self, io::Error> {
        tracing::trace!("creating RawSocket");
        let socket = socket2::Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))?;
        socket.set_ttl(u32::from(u8::from(ttl)))?;
        socket.set_read_timeout(Some(recv_timeout))?;
        socket.set_write_timeout(Some(send_timeout))?;
        Ok(RawSocket { socket })
    }
}

impl TSocket for RawSocket {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)> {
        // socket2 documents that an initialised `&mut [u8]` may be passed as
        // `&mut [MaybeUninit<u8>]`; it never writes uninitialised bytes into it.
        // https://docs.rs/socket2/0.4.7/socket2/struct.Socket.html#method.recv
        //
        // On a RAW socket we get the whole IP packet.
        let (n, socket_addr) = self.socket.recv_from(unsafe {
            &mut *(buf as *mut [u8] as *mut [std::mem::MaybeUninit<u8>])
        })?;
        let ip = socket_addr
            .as_socket_ipv4()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "sender is not an IPv4 address"))?;
        Ok((n, IpAddr::V4(*ip.ip())))
    }
}
