// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for connection establishment and codeset decoding.
//!
//! Connect failures surface as one of two communication errors:
//!
//! - [`Error::Transient`] - the peer refused the connection, a retry may succeed
//! - [`Error::CommFailure`] - resolution, socket or option failures (permanent)
//!
//! Every connect-time error carries a [`MinorCode`] and a [`CompletionStatus`],
//! matching the system-exception shape other ORBs put on the wire.

use std::fmt;
use std::io;

/// Vendor minor code base shared by all minor codes emitted here.
pub const VENDOR_MINOR_BASE: u32 = 0x4f4f_0000;

// ============================================================================
// Minor codes
// ============================================================================

/// Minor code attached to a system error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MinorCode {
    /// Connection to the remote endpoint failed (peer refused)
    ConnectFailed,
    /// Socket creation or connect I/O failure
    Socket,
    /// Host name could not be resolved
    Gethostbyname,
    /// Socket option could not be applied
    Setsockopt,
    /// Write to an established transport failed
    Send,
    /// Read from an established transport failed
    Recv,
    /// Surrogate wide character received (unsupported by the wire profile)
    SurrogatePair,
    /// Byte cursor exhausted during decode
    Underflow,
}

impl MinorCode {
    /// Stable numeric value as transmitted in a system exception.
    pub fn value(self) -> u32 {
        let n = match self {
            MinorCode::ConnectFailed => 1,
            MinorCode::Socket => 2,
            MinorCode::Gethostbyname => 3,
            MinorCode::Setsockopt => 4,
            MinorCode::Send => 5,
            MinorCode::Recv => 6,
            MinorCode::SurrogatePair => 7,
            MinorCode::Underflow => 8,
        };
        VENDOR_MINOR_BASE | n
    }

    /// Human-readable description prefix.
    pub fn describe(self) -> &'static str {
        match self {
            MinorCode::ConnectFailed => "attempt to establish connection failed",
            MinorCode::Socket => "socket error",
            MinorCode::Gethostbyname => "host name resolution failed",
            MinorCode::Setsockopt => "setting socket option failed",
            MinorCode::Send => "send failed",
            MinorCode::Recv => "receive failed",
            MinorCode::SurrogatePair => "surrogate pair characters are not supported",
            MinorCode::Underflow => "buffer underflow",
        }
    }
}

impl fmt::Display for MinorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#010x})", self.describe(), self.value())
    }
}

/// How far an operation got before it failed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompletionStatus {
    /// The operation completed before the failure
    Yes,
    /// The operation did not start (all connect failures)
    #[default]
    No,
    /// Unknown whether the operation completed
    Maybe,
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompletionStatus::Yes => "COMPLETED_YES",
            CompletionStatus::No => "COMPLETED_NO",
            CompletionStatus::Maybe => "COMPLETED_MAYBE",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// Error
// ============================================================================

/// Errors produced by the connector, transport and codeset readers.
#[derive(Debug)]
pub enum Error {
    /// Permanent communication failure (retry without change will not help).
    CommFailure {
        minor: MinorCode,
        completed: CompletionStatus,
        reason: String,
        source: Option<io::Error>,
    },
    /// Transient failure (the peer refused, a retry may succeed).
    Transient {
        minor: MinorCode,
        completed: CompletionStatus,
        reason: String,
    },
    /// Internal-consistency violation (wire-format assumption broken).
    Internal { minor: MinorCode, reason: String },
    /// Input ended before a complete value could be decoded.
    Marshal { minor: MinorCode, reason: String },
    /// Configuration could not be loaded or failed validation.
    Config(String),
    /// Invalid argument passed to a constructor.
    BadParam(String),
}

impl Error {
    /// Build a communication failure wrapping an I/O error.
    pub fn comm_failure(minor: MinorCode, reason: impl Into<String>, source: io::Error) -> Self {
        Error::CommFailure {
            minor,
            completed: CompletionStatus::No,
            reason: reason.into(),
            source: Some(source),
        }
    }

    /// Build a transient failure.
    pub fn transient(minor: MinorCode, reason: impl Into<String>) -> Self {
        Error::Transient {
            minor,
            completed: CompletionStatus::No,
            reason: reason.into(),
        }
    }

    /// Minor code, if this error carries one.
    pub fn minor(&self) -> Option<MinorCode> {
        match self {
            Error::CommFailure { minor, .. }
            | Error::Transient { minor, .. }
            | Error::Internal { minor, .. }
            | Error::Marshal { minor, .. } => Some(*minor),
            Error::Config(_) | Error::BadParam(_) => None,
        }
    }

    /// Completion status, if this error carries one.
    pub fn completed(&self) -> Option<CompletionStatus> {
        match self {
            Error::CommFailure { completed, .. } | Error::Transient { completed, .. } => {
                Some(*completed)
            }
            _ => None,
        }
    }

    /// Whether a retry may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient { .. })
    }

    /// Whether this error reports a broken wire-format assumption.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Internal { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CommFailure {
                minor,
                completed,
                reason,
                ..
            } => write!(
                f,
                "COMM_FAILURE: {}: {} [{}]",
                minor.describe(),
                reason,
                completed
            ),
            Error::Transient {
                minor,
                completed,
                reason,
            } => write!(
                f,
                "TRANSIENT: {}: {} [{}]",
                minor.describe(),
                reason,
                completed
            ),
            Error::Internal { minor, reason } => {
                write!(f, "INTERNAL: {}: {}", minor.describe(), reason)
            }
            Error::Marshal { minor, reason } => {
                write!(f, "MARSHAL: {}: {}", minor.describe(), reason)
            }
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::BadParam(msg) => write!(f, "Bad parameter: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::CommFailure {
                source: Some(e), ..
            } => Some(e),
            _ => None,
        }
    }
}

/// Convenient alias for results using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
