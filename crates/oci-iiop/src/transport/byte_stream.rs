// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ByteStream trait for socket abstraction.
//!
//! Connection helpers hand back a [`BoxedByteStream`], so the connector can
//! configure and wrap sockets it did not create itself:
//! - Plain TCP (`TcpStream`)
//! - Relaying or fragmenting sockets supplied by a custom helper
//! - Mock streams in tests
//!
//! Streams are blocking; a read or write parks the calling thread.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};

/// Abstraction over connected byte-oriented streams.
pub trait ByteStream: Read + Write + Send {
    /// Shutdown the stream.
    fn shutdown(&mut self, how: Shutdown) -> io::Result<()>;

    /// Get the local address of this stream.
    fn local_addr(&self) -> io::Result<SocketAddr>;

    /// Get the peer address of this stream.
    fn peer_addr(&self) -> io::Result<SocketAddr>;

    /// Set TCP_NODELAY (disable Nagle's algorithm).
    fn set_nodelay(&self, nodelay: bool) -> io::Result<()>;

    /// Get TCP_NODELAY setting.
    fn nodelay(&self) -> io::Result<bool>;

    /// Set SO_KEEPALIVE, with an optional idle time before the first probe.
    fn set_keepalive(&self, enabled: bool, idle: Option<Duration>) -> io::Result<()>;

    /// Get SO_KEEPALIVE setting.
    fn keepalive(&self) -> io::Result<bool>;

    /// Set read timeout.
    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()>;

    /// Set write timeout.
    fn set_write_timeout(&self, dur: Option<Duration>) -> io::Result<()>;
}

// ============================================================================
// TcpStream implementation
// ============================================================================

impl ByteStream for TcpStream {
    fn shutdown(&mut self, how: Shutdown) -> io::Result<()> {
        TcpStream::shutdown(self, how)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::local_addr(self)
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::peer_addr(self)
    }

    fn set_nodelay(&self, nodelay: bool) -> io::Result<()> {
        TcpStream::set_nodelay(self, nodelay)
    }

    fn nodelay(&self) -> io::Result<bool> {
        TcpStream::nodelay(self)
    }

    fn set_keepalive(&self, enabled: bool, idle: Option<Duration>) -> io::Result<()> {
        let sock = SockRef::from(self);
        match (enabled, idle) {
            (true, Some(time)) => sock.set_tcp_keepalive(&TcpKeepalive::new().with_time(time)),
            _ => sock.set_keepalive(enabled),
        }
    }

    fn keepalive(&self) -> io::Result<bool> {
        SockRef::from(self).keepalive()
    }

    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, dur)
    }

    fn set_write_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        TcpStream::set_write_timeout(self, dur)
    }
}

// ============================================================================
// Boxed ByteStream
// ============================================================================

/// Type alias for a boxed ByteStream.
pub type BoxedByteStream = Box<dyn ByteStream>;

impl ByteStream for BoxedByteStream {
    fn shutdown(&mut self, how: Shutdown) -> io::Result<()> {
        (**self).shutdown(how)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        (**self).local_addr()
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        (**self).peer_addr()
    }

    fn set_nodelay(&self, nodelay: bool) -> io::Result<()> {
        (**self).set_nodelay(nodelay)
    }

    fn nodelay(&self) -> io::Result<bool> {
        (**self).nodelay()
    }

    fn set_keepalive(&self, enabled: bool, idle: Option<Duration>) -> io::Result<()> {
        (**self).set_keepalive(enabled, idle)
    }

    fn keepalive(&self) -> io::Result<bool> {
        (**self).keepalive()
    }

    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        (**self).set_read_timeout(dur)
    }

    fn set_write_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        (**self).set_write_timeout(dur)
    }
}

/// Shut down both directions and drop the stream, ignoring close-time errors.
pub(crate) fn close_quietly(mut stream: BoxedByteStream) {
    if let Err(e) = stream.shutdown(Shutdown::Both) {
        log::trace!("ignoring error while closing stream: {}", e);
    }
}

// ============================================================================
// Test mock stream
// ============================================================================


// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_tcp_stream_options() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let stream = TcpStream::connect(addr).unwrap();
        let (_server_side, _) = listener.accept().unwrap();

        let stream: BoxedByteStream = Box::new(stream);
        stream.set_nodelay(true).unwrap();
        assert!(stream.nodelay().unwrap());

        stream
            .set_keepalive(true, Some(Duration::from_secs(30)))
            .unwrap();
        assert!(stream.keepalive().unwrap());

        stream.set_keepalive(false, None).unwrap();
        assert!(!stream.keepalive().unwrap());

        assert_eq!(stream.peer_addr().unwrap(), addr);
    }

    #[test]
    fn test_mock_stream_io() {
        let (mut stream, probe) = mock::MockStream::new();
        stream.write_all(b"hello").unwrap();
        assert_eq!(&*probe.written.lock(), b"hello");

        stream.feed_read_data(b"world");
        let mut buf = [0u8; 10];
        let n = stream.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"world");
    }

    #[test]
    fn test_close_quietly_shuts_down() {
        let (stream, probe) = mock::MockStream::new();
        close_quietly(stream.boxed());
        assert!(probe.closed.load(std::sync::atomic::Ordering::SeqCst));
        assert!(probe.is_closed());
    }

    #[test]
    fn test_mock_option_errors() {
        let (stream, _probe) = mock::MockStream::new();
        let stream = stream.fail_nodelay(io::ErrorKind::InvalidInput);
        assert_eq!(
            stream.set_nodelay(true).unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
    }
}
