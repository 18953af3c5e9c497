// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # oci-iiop - IIOP client connector for a CORBA ORB
//!
//! Client-side connection establishment for the Internet Inter-ORB Protocol,
//! plus the wide-character decoder that byte-order-sensitive codesets need
//! on the receive path.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use oci_iiop::{
//!     ConnectorConfig, Connector, ConnectorInfo, DefaultConnectionHelper, Ior, Profile, Result,
//! };
//!
//! fn main() -> Result<()> {
//!     let ior = Ior::new("IDL:Echo:1.0", vec![Profile::iiop("server", 2809, b"echo".to_vec())]);
//!     let mut connector = Connector::new(
//!         ConnectorInfo::new("server", 2809),
//!         ior,
//!         Vec::new(),
//!         Arc::new(DefaultConnectionHelper),
//!         ConnectorConfig::from_env()?,
//!     )?;
//!
//!     let mut transport = connector.connect()?;
//!     transport.send(b"GIOP")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |   Connector  (connect / connect_with_deadline / get_usable_profiles) |
//! +---------------------------------------------------------------------+
//! |   ProfileMatcher   |   ConnectDeadline   |   ConnectionHelper        |
//! +---------------------------------------------------------------------+
//! |   Transport (owns the ByteStream)       |   CodeSetReader (UTF-16)  |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Connector`] | Opens transports to one `host:port` endpoint |
//! | [`Transport`] | Owns one connected socket |
//! | [`ConnectDeadline`] | Bounds how long establishing a socket may take |
//! | [`ProfileMatcher`] | Decides which IOR profiles a connector may serve |
//! | [`Utf16Reader`] | UTF-16 wide-character decoder with BOM handling |
//!
//! ## Logging
//!
//! All diagnostics go through the [`log`](https://docs.rs/log) facade; install
//! any logger in the embedding application to see them.

/// Wide and narrow character decoding per transmission codeset.
pub mod codeset;
/// Connector configuration (builders, env and YAML loaders).
pub mod config;
/// Connection establishment, profile matching and connect deadlines.
pub mod connector;
/// Error taxonomy (communication, transient, internal, marshal).
pub mod error;
/// Object references, profiles and tagged components.
pub mod ior;
/// Client policies consulted during profile selection.
pub mod policy;
/// Byte streams and established transports.
pub mod transport;

pub use codeset::{
    reader_for, CodeSetReader, CodeSetState, CodecError, Latin1Reader, ReadBuffer, Utf16Reader,
};
pub use config::ConnectorConfig;
pub use connector::{
    extract_security_context, ConnectCallback, ConnectDeadline, ConnectionHelper, Connector,
    ConnectorInfo, DeadlineState, DefaultConnectionHelper, ProfileMatcher, Resolver,
    SystemResolver,
};
pub use error::{CompletionStatus, Error, MinorCode, Result};
pub use ior::{Ior, Profile, TaggedComponent};
pub use policy::{Policy, ProtocolPolicy};
pub use transport::{BoxedByteStream, ByteStream, Transport, TransportInfo};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
