// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Outbound IIOP connection establishment.
//!
//! A [`Connector`] is bound to one `host:port` endpoint and the object
//! reference it was created for. Each [`Connector::connect`] produces a new
//! [`Transport`]; the connector may be reused but never holds two sockets.
//!
//! # Connect flow
//!
//! ```text
//!   resolve host --> helper.create_socket --> set TCP_NODELAY / keepalive
//!        |                  |                          |
//!   COMM_FAILURE    TRANSIENT (refused)          COMM_FAILURE
//!                   COMM_FAILURE (other)               |
//!                                                      v
//!                           callbacks <-- Transport::new(socket)
//! ```
//!
//! Every error path closes the socket before the error is returned.

mod deadline;
mod helper;
mod matcher;

use std::fmt;
use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ConnectorConfig;
use crate::error::{Error, MinorCode, Result};
use crate::ior::{Ior, Profile, TAG_INTERNET_IOP};
use crate::policy::Policy;
use crate::transport::byte_stream::close_quietly;
use crate::transport::{BoxedByteStream, Transport, TransportInfo};

pub use deadline::{ConnectDeadline, DeadlineState};
pub use helper::{ConnectionHelper, DefaultConnectionHelper, Resolver, SystemResolver};
pub use matcher::{extract_security_context, ProfileMatcher};

/// Transport plugin id of this connector.
pub const PLUGIN_ID: &str = "iiop";

// ============================================================================
// Callbacks and connector info
// ============================================================================

/// Hook run after every successful connect, before the transport is returned.
///
/// An error closes the new transport and is returned from `connect` unchanged.
pub trait ConnectCallback: Send + Sync {
    fn on_connect(&self, info: &TransportInfo) -> Result<()>;
}

impl<F> ConnectCallback for F
where
    F: Fn(&TransportInfo) -> Result<()> + Send + Sync,
{
    fn on_connect(&self, info: &TransportInfo) -> Result<()> {
        self(info)
    }
}

/// Descriptive information about a connector's endpoint.
///
/// Fixed once built; callbacks are supplied up front.
#[derive(Clone)]
pub struct ConnectorInfo {
    host: String,
    port: u16,
    callbacks: Vec<Arc<dyn ConnectCallback>>,
}

impl ConnectorInfo {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            callbacks: Vec::new(),
        }
    }

    /// Endpoint with connect callbacks, run in the given order.
    pub fn with_callbacks(
        host: impl Into<String>,
        port: u16,
        callbacks: Vec<Arc<dyn ConnectCallback>>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            callbacks,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Run every callback, stopping at the first failure.
    pub fn call_connect_callbacks(&self, info: &TransportInfo) -> Result<()> {
        for callback in &self.callbacks {
            callback.on_connect(info)?;
        }
        Ok(())
    }
}

impl fmt::Display for ConnectorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ConnectorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorInfo")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

// ============================================================================
// Connector
// ============================================================================

/// Client-side IIOP connector for one endpoint.
///
/// Not internally synchronized: callers sharing a connector across threads
/// must serialize access themselves.
pub struct Connector {
    info: ConnectorInfo,
    ior: Arc<Ior>,
    policies: Arc<[Policy]>,
    matcher: ProfileMatcher,
    config: ConnectorConfig,
    helper: Arc<dyn ConnectionHelper>,
    resolver: Arc<dyn Resolver>,
    // Only populated while a connect is in progress
    socket: Option<BoxedByteStream>,
}

impl Connector {
    /// Create a connector for `info`'s endpoint, bound to `ior`.
    ///
    /// The security context is extracted from `ior` once, here.
    pub fn new(
        info: ConnectorInfo,
        ior: Ior,
        policies: Vec<Policy>,
        helper: Arc<dyn ConnectionHelper>,
        config: ConnectorConfig,
    ) -> Result<Self> {
        if info.host.is_empty() {
            return Err(Error::BadParam("connector host must not be empty".into()));
        }
        config.validate().map_err(Error::Config)?;

        let matcher = ProfileMatcher::new(PLUGIN_ID, &info.host, info.port, &ior);
        log::debug!(
            "created connector for {} (security context {} bytes)",
            info,
            matcher.security_context().len()
        );

        Ok(Self {
            info,
            ior: Arc::new(ior),
            policies: policies.into(),
            matcher,
            config,
            helper,
            resolver: Arc::new(SystemResolver),
            socket: None,
        })
    }

    /// Builder: replace the host resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn id(&self) -> &'static str {
        PLUGIN_ID
    }

    pub fn tag(&self) -> u32 {
        TAG_INTERNET_IOP
    }

    pub fn info(&self) -> &ConnectorInfo {
        &self.info
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Security mechanism list of the target reference (empty if none).
    pub fn security_context(&self) -> &[u8] {
        self.matcher.security_context()
    }

    /// Open a new transport to the endpoint.
    pub fn connect(&mut self) -> Result<Transport> {
        self.close_socket();
        let addr = self.resolve()?;
        let port = self.info.port;

        log::debug!("connecting to {} ({}:{})", self.info, addr, port);
        let stream = self
            .helper
            .create_socket(&self.ior, &self.policies, addr, port)
            .map_err(|e| self.connect_error(addr, e))?;

        self.adopt(stream)
    }

    /// Like [`connect`](Self::connect), but gives up waiting after `budget`.
    ///
    /// `Ok(None)` means the deadline passed first; try another profile or
    /// retry. A socket that connects later is closed, never returned.
    pub fn connect_with_deadline(&mut self, budget: Duration) -> Result<Option<Transport>> {
        self.close_socket();
        let addr = self.resolve()?;
        let port = self.info.port;

        let helper = Arc::clone(&self.helper);
        let ior = Arc::clone(&self.ior);
        let policies = Arc::clone(&self.policies);

        log::debug!(
            "connecting to {} ({}:{}) with a {:?} deadline",
            self.info,
            addr,
            port,
            budget
        );
        let deadline = ConnectDeadline::new();
        let outcome = deadline.run(
            move || helper.create_socket(&ior, &policies, addr, port),
            budget,
        );

        match outcome {
            Ok(Some(stream)) => self.adopt(stream).map(Some),
            Ok(None) => {
                log::debug!("connect to {} missed its {:?} deadline", self.info, budget);
                Ok(None)
            }
            Err(e) => Err(self.connect_error(addr, e)),
        }
    }

    /// Connect using the configured default deadline, if any.
    pub fn establish(&mut self) -> Result<Option<Transport>> {
        match self.config.connect_timeout {
            Some(budget) => self.connect_with_deadline(budget),
            None => self.connect().map(Some),
        }
    }

    /// Profiles of `ior` this connector may be used for under `policies`.
    pub fn get_usable_profiles(&self, ior: &Ior, policies: &[Policy]) -> Vec<Profile> {
        self.matcher.select_usable_profiles(ior, policies)
    }

    /// Whether `other` reaches the same endpoint under the same security context.
    ///
    /// Differing host strings are compared by resolved address; a host that
    /// does not resolve makes the connectors unequal.
    pub fn equal(&self, other: &Connector) -> bool {
        if self.info.port != other.info.port {
            return false;
        }

        if self.info.host != other.info.host {
            let ours = self.resolver.resolve(&self.info.host);
            let theirs = self.resolver.resolve(&other.info.host);
            match (ours, theirs) {
                (Ok(a), Ok(b)) if a == b => {}
                _ => return false,
            }
        }

        self.security_context() == other.security_context()
    }

    fn resolve(&self) -> Result<IpAddr> {
        self.resolver.resolve(&self.info.host).map_err(|e| {
            log::debug!("cannot resolve {}: {}", self.info.host, e);
            Error::comm_failure(
                MinorCode::Gethostbyname,
                format!("host '{}'", self.info.host),
                e,
            )
        })
    }

    fn connect_error(&self, addr: IpAddr, e: io::Error) -> Error {
        log::debug!("connect to {}:{} failed: {}", addr, self.info.port, e);
        let reason = format!("{}:{} ({})", addr, self.info.port, self.info.host);
        if e.kind() == io::ErrorKind::ConnectionRefused {
            Error::transient(MinorCode::ConnectFailed, reason)
        } else {
            Error::comm_failure(MinorCode::Socket, reason, e)
        }
    }

    /// Configure a freshly connected socket and hand it to a new transport.
    fn adopt(&mut self, stream: BoxedByteStream) -> Result<Transport> {
        self.socket = Some(stream);
        self.configure_socket()?;

        // Ownership moves to the transport; the slot is empty from here on
        let stream = self.socket.take().ok_or_else(|| {
            Error::comm_failure(
                MinorCode::Socket,
                "socket closed during setup",
                io::Error::from(io::ErrorKind::NotConnected),
            )
        })?;
        let mut transport = Transport::new(stream, self.security_context().to_vec())?;

        if let Err(e) = self.info.call_connect_callbacks(transport.info()) {
            log::debug!("connect callback rejected {}: {}", transport.info(), e);
            transport.close();
            return Err(e);
        }

        log::debug!("connected {}", transport.info());
        Ok(transport)
    }

    fn configure_socket(&mut self) -> Result<()> {
        let Some(stream) = self.socket.as_ref() else {
            return Ok(());
        };

        let applied = stream.set_nodelay(true).and_then(|()| {
            if self.config.keepalive {
                stream.set_keepalive(true, self.config.keepalive_time)
            } else {
                Ok(())
            }
        });

        if let Err(e) = applied {
            log::debug!("socket option error on {}: {}", self.info, e);
            self.close_socket();
            return Err(Error::comm_failure(
                MinorCode::Setsockopt,
                format!("configuring socket for {}", self.info),
                e,
            ));
        }
        Ok(())
    }

    fn close_socket(&mut self) {
        if let Some(stream) = self.socket.take() {
            log::trace!("closing socket held by connector {}", self.info);
            close_quietly(stream);
        }
    }
}

impl Drop for Connector {
    fn drop(&mut self) {
        self.close_socket();
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} connector {}", PLUGIN_ID, self.info)
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("info", &self.info)
            .field("config", &self.config)
            .field("security_context_len", &self.security_context().len())
            .field("socket_held", &self.socket.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
