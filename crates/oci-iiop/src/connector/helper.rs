// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pluggable socket creation and host resolution.
//!
//! The embedding ORB decides how sockets are made: a relaying helper, an
//! address-translating helper and a test double all plug in here. The
//! connector treats the helper as opaque and makes no assumption about its
//! latency or failure behavior.

use std::io;
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use socket2::{Domain, Protocol, Socket, Type};

use crate::config::ConnectorConfig;
use crate::error::{Error, MinorCode, Result};
use crate::ior::Ior;
use crate::policy::Policy;
use crate::transport::BoxedByteStream;

/// Socket factory supplied by the ORB configuration.
pub trait ConnectionHelper: Send + Sync {
    /// Open a connected client socket for `ior` at `addr:port`.
    fn create_socket(
        &self,
        ior: &Ior,
        policies: &[Policy],
        addr: IpAddr,
        port: u16,
    ) -> io::Result<BoxedByteStream>;

    /// Open a listening socket (`port` 0 = ephemeral, `bind_addr` None = all interfaces).
    fn create_server_socket(
        &self,
        port: u16,
        backlog: u32,
        bind_addr: Option<IpAddr>,
    ) -> io::Result<TcpListener>;

    /// Open a connection from this process to one of its own listeners.
    fn create_self_connection(&self, addr: IpAddr, port: u16) -> io::Result<BoxedByteStream>;

    /// Listening socket with the backlog from `config`.
    fn listen(
        &self,
        config: &ConnectorConfig,
        port: u16,
        bind_addr: Option<IpAddr>,
    ) -> Result<TcpListener> {
        self.create_server_socket(port, config.listen_backlog, bind_addr)
            .map_err(|e| {
                log::debug!("cannot listen on port {}: {}", port, e);
                Error::comm_failure(MinorCode::Socket, format!("listen on port {}", port), e)
            })
    }
}

/// Plain TCP sockets built with `socket2`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultConnectionHelper;

impl DefaultConnectionHelper {
    fn connect(addr: SocketAddr) -> io::Result<BoxedByteStream> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.connect(&addr.into())?;
        let stream: TcpStream = socket.into();
        Ok(Box::new(stream))
    }
}

impl ConnectionHelper for DefaultConnectionHelper {
    fn create_socket(
        &self,
        _ior: &Ior,
        _policies: &[Policy],
        addr: IpAddr,
        port: u16,
    ) -> io::Result<BoxedByteStream> {
        Self::connect(SocketAddr::new(addr, port))
    }

    fn create_server_socket(
        &self,
        port: u16,
        backlog: u32,
        bind_addr: Option<IpAddr>,
    ) -> io::Result<TcpListener> {
        let ip = bind_addr.unwrap_or(IpAddr::from([0, 0, 0, 0]));
        let addr = SocketAddr::new(ip, port);
        let backlog = i32::try_from(backlog).unwrap_or(i32::MAX);

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(backlog)?;

        Ok(socket.into())
    }

    fn create_self_connection(&self, addr: IpAddr, port: u16) -> io::Result<BoxedByteStream> {
        Self::connect(SocketAddr::new(addr, port))
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Host name to address resolution.
pub trait Resolver: Send + Sync {
    fn resolve(&self, host: &str) -> io::Result<IpAddr>;
}

/// OS resolver; the first returned address wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, host: &str) -> io::Result<IpAddr> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }
        (host, 0)
            .to_socket_addrs()?
            .next()
            .map(|addr| addr.ip())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no address found for host '{}'", host),
                )
            })
    }
}
