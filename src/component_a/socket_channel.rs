//! socket_channel.rs
//! Non-blocking UDP receive endpoint owned by one play session.
//! - bound through socket2 so non-blocking mode is set before the first datagram can arrive
//! - no SO_REUSEADDR: a port already bound elsewhere is a hard bind failure
//! - `close()` is idempotent; teardown may run more than once

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::{
    io::ErrorKind,
    net::{SocketAddr, UdpSocket},
};
use log::{debug, info};

use crate::error::ChannelError;

/// One non-blocking receive attempt.
pub trait DatagramSource {
    /// `Ok(None)` when no datagram is queued right now.
    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, ChannelError>;
}

pub struct SocketChannel {
    socket: Option<UdpSocket>,
    local_addr: SocketAddr,
}

impl SocketChannel {
    /// Bind a non-blocking UDP endpoint on `addr`.
    pub fn open(addr: SocketAddr) -> Result<Self, ChannelError> {
        let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
            .map_err(ChannelError::Configure)?;

        socket.set_nonblocking(true).map_err(ChannelError::Configure)?;
        socket
            .bind(&SockAddr::from(addr))
            .map_err(|source| ChannelError::Bind { addr, source })?;

        let socket: UdpSocket = socket.into();
        let local_addr = socket.local_addr().map_err(ChannelError::Configure)?;
        info!("[SocketChannel] listening on {}", local_addr);

        Ok(Self {
            socket: Some(socket),
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    /// Release the endpoint. Safe to call on an already closed channel.
    pub fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!("[SocketChannel] released {}", self.local_addr);
        }
    }
}

impl DatagramSource for SocketChannel {
    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, ChannelError> {
        let socket = self.socket.as_ref().ok_or(ChannelError::Closed)?;
        match socket.recv_from(buf) {
            Ok((len, from)) => Ok(Some((len, from))),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(ChannelError::Recv(e)),
        }
    }
}

impl Drop for SocketChannel {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn loopback() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[test]
    fn empty_socket_returns_none_immediately() {
        let mut channel = SocketChannel::open(loopback()).unwrap();
        let mut buf = [0u8; 64];

        let start = Instant::now();
        assert!(channel.try_recv(&mut buf).unwrap().is_none());
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn bind_fails_when_port_is_taken() {
        let holder = UdpSocket::bind(loopback()).unwrap();
        let taken = holder.local_addr().unwrap();

        let err = SocketChannel::open(taken).err().unwrap();
        assert!(matches!(err, ChannelError::Bind { addr, .. } if addr == taken));
    }

    #[test]
    fn close_is_idempotent_and_recv_reports_closed() {
        let mut channel = SocketChannel::open(loopback()).unwrap();
        channel.close();
        channel.close();
        assert!(!channel.is_open());

        let mut buf = [0u8; 8];
        assert!(matches!(channel.try_recv(&mut buf), Err(ChannelError::Closed)));
    }

    #[test]
    fn port_is_reusable_after_close() {
        let mut first = SocketChannel::open(loopback()).unwrap();
        let addr = first.local_addr();
        first.close();

        let second = SocketChannel::open(addr).unwrap();
        assert_eq!(second.local_addr(), addr);
    }

    #[test]
    fn receives_sent_datagram() {
        let mut channel = SocketChannel::open(loopback()).unwrap();
        let sender = UdpSocket::bind(loopback()).unwrap();
        sender.send_to(b"1,2,3,4,5", channel.local_addr()).unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let mut buf = [0u8; 64];
        let (len, from) = channel.try_recv(&mut buf).unwrap().unwrap();
        assert_eq!(&buf[..len], b"1,2,3,4,5");
        assert_eq!(from, sender.local_addr().unwrap());
    }
}
