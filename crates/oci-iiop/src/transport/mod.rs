// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Established IIOP transports.
//!
//! A [`Transport`] is the sole owner of a connected [`ByteStream`]. It is
//! built exactly once per successful connect and closes its stream when
//! closed explicitly or dropped.
//!
//! # Lifecycle
//!
//! ```text
//!   Connector::connect()
//!          | ownership of the socket moves in
//!          v
//!     +----------+   close() / drop   +--------+
//!     |   Open   |------------------->| Closed |
//!     +----------+                    +--------+
//! ```

pub mod byte_stream;

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr};

use crate::error::{Error, MinorCode, Result};

pub use byte_stream::{BoxedByteStream, ByteStream};

/// Information derived from an established transport.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransportInfo {
    /// Local socket address
    pub local_addr: SocketAddr,
    /// Remote socket address
    pub peer_addr: SocketAddr,
    /// Security mechanism list the connection was established under
    pub security_context: Vec<u8>,
}

impl TransportInfo {
    pub fn peer_host(&self) -> IpAddr {
        self.peer_addr.ip()
    }

    pub fn peer_port(&self) -> u16 {
        self.peer_addr.port()
    }
}

impl fmt::Display for TransportInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "iiop {} -> {}", self.local_addr, self.peer_addr)
    }
}

/// Connected byte stream plus derived information.
pub struct Transport {
    stream: Option<BoxedByteStream>,
    info: TransportInfo,
}

impl Transport {
    /// Take ownership of a connected stream.
    ///
    /// On failure the stream is closed before the error is returned.
    pub fn new(stream: BoxedByteStream, security_context: Vec<u8>) -> Result<Self> {
        let addrs = stream
            .local_addr()
            .and_then(|local| Ok((local, stream.peer_addr()?)));

        match addrs {
            Ok((local_addr, peer_addr)) => Ok(Self {
                stream: Some(stream),
                info: TransportInfo {
                    local_addr,
                    peer_addr,
                    security_context,
                },
            }),
            Err(e) => {
                log::debug!("transport setup failed: {}", e);
                byte_stream::close_quietly(stream);
                Err(Error::comm_failure(
                    MinorCode::Socket,
                    "cannot determine socket addresses",
                    e,
                ))
            }
        }
    }

    pub fn info(&self) -> &TransportInfo {
        &self.info
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Write all of `data`.
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        let peer = self.info.peer_addr;
        let stream = self.open_stream(MinorCode::Send)?;
        stream
            .write_all(data)
            .and_then(|()| stream.flush())
            .map_err(|e| Error::comm_failure(MinorCode::Send, format!("send to {}", peer), e))
    }

    /// Read whatever is available into `buf`; `Ok(0)` means the peer closed.
    pub fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        let peer = self.info.peer_addr;
        let stream = self.open_stream(MinorCode::Recv)?;
        loop {
            match stream.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(Error::comm_failure(
                        MinorCode::Recv,
                        format!("receive from {}", peer),
                        e,
                    ))
                }
            }
        }
    }

    /// Fill `buf` completely.
    pub fn receive_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let peer = self.info.peer_addr;
        let stream = self.open_stream(MinorCode::Recv)?;
        stream
            .read_exact(buf)
            .map_err(|e| Error::comm_failure(MinorCode::Recv, format!("receive from {}", peer), e))
    }

    /// Close the stream. Idempotent; close-time errors are ignored.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            log::debug!("closing transport {}", self.info);
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                log::trace!("ignoring error while closing {}: {}", self.info, e);
            }
        }
    }

    fn open_stream(&mut self, minor: MinorCode) -> Result<&mut BoxedByteStream> {
        self.stream.as_mut().ok_or_else(|| {
            Error::comm_failure(
                minor,
                "transport closed",
                io::Error::new(io::ErrorKind::NotConnected, "transport closed"),
            )
        })
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("local_addr", &self.info.local_addr)
            .field("peer_addr", &self.info.peer_addr)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::byte_stream::mock::MockStream;
    use super::*;

    #[test]
    fn test_transport_info() {
        let (stream, _probe) = MockStream::new();
        let transport = Transport::new(stream.boxed(), vec![1, 2]).unwrap();

        let info = transport.info();
        assert_eq!(info.peer_port(), 54321);
        assert_eq!(info.peer_host().to_string(), "127.0.0.1");
        assert_eq!(info.security_context, vec![1, 2]);
        assert_eq!(info.to_string(), "iiop 127.0.0.1:12345 -> 127.0.0.1:54321");
    }

    #[test]
    fn test_setup_failure_closes_stream() {
        let (stream, probe) = MockStream::new();
        let stream = stream.fail_peer_addr(io::ErrorKind::NotConnected);

        let err = Transport::new(stream.boxed(), Vec::new()).unwrap_err();
        assert_eq!(err.minor(), Some(MinorCode::Socket));
        assert!(probe.is_closed());
    }

    #[test]
    fn test_send_receive_and_close() {
        let (mut stream, probe) = MockStream::new();
        stream.feed_read_data(b"pong");
        let mut transport = Transport::new(stream.boxed(), Vec::new()).unwrap();

        transport.send(b"ping").unwrap();
        assert_eq!(&*probe.written.lock(), b"ping");

        let mut buf = [0u8; 4];
        transport.receive_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"pong");

        transport.close();
        transport.close();
        assert!(transport.is_closed());
        assert!(probe.is_closed());

        let err = transport.send(b"late").unwrap_err();
        assert_eq!(err.minor(), Some(MinorCode::Send));
        assert!(transport.receive(&mut buf).is_err());
    }

    #[test]
    fn test_drop_closes() {
        let (stream, probe) = MockStream::new();
        let transport = Transport::new(stream.boxed(), Vec::new()).unwrap();
        drop(transport);
        assert!(probe.closed.load(std::sync::atomic::Ordering::SeqCst));
    }
}
