// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codeset readers: octets to narrow and wide characters.
//!
//! A [`CodeSetReader`] decodes characters for one negotiated transmission
//! codeset. Readers are stateless; the per-session state lives in
//! [`CodeSetState`] and is passed by reference to every call, so a session
//! can be suspended and resumed (e.g. across message fragments) by copying
//! its flags.
//!
//! # Wide-character wire format (UTF-16)
//!
//! ```text
//! first unit:   [FE FF] [hi lo]   big-endian BOM, then big-endian char
//!               [FF FE] [lo hi]   little-endian BOM, then little-endian char
//!               [hi lo]           no BOM, big-endian
//! later units:  decoded in the order discovered on the first unit
//! ```
//!
//! Surrogate units (`0xD800..=0xDFFF`) are not supported by this profile and
//! are reported as [`CodecError::SurrogatePair`], which maps to a fatal
//! [`Error::Internal`].

pub mod buffer;
pub mod latin1;
pub mod utf16;

use std::fmt;

use crate::error::{Error, MinorCode};

pub use buffer::ReadBuffer;
pub use latin1::Latin1Reader;
pub use utf16::Utf16Reader;

/// OSF codeset registry id for ISO 8859-1.
pub const CODESET_ISO_8859_1: u32 = 0x0001_0001;

/// OSF codeset registry id for UTF-16.
pub const CODESET_UTF_16: u32 = 0x0001_0109;

/// Big-endian byte order mark value.
pub const BOM_BIG_ENDIAN: u16 = 0xFEFF;

/// Byte-swapped BOM, as read big-endian from a little-endian stream.
pub const BOM_LITTLE_ENDIAN: u16 = 0xFFFE;

// ============================================================================
// Errors
// ============================================================================

/// Decode failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// Not enough octets left in the buffer.
    Underflow { offset: usize, needed: usize },
    /// Decoded value lies in the surrogate range (fatal).
    SurrogatePair { value: u16, offset: usize },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Underflow { offset, needed } => {
                write!(f, "read failed at offset {}: {} more octet(s) needed", offset, needed)
            }
            CodecError::SurrogatePair { value, offset } => write!(
                f,
                "surrogate unit {:#06x} at offset {} is not supported",
                value, offset
            ),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Underflow { .. } => Error::Marshal {
                minor: MinorCode::Underflow,
                reason: e.to_string(),
            },
            CodecError::SurrogatePair { .. } => Error::Internal {
                minor: MinorCode::SurrogatePair,
                reason: e.to_string(),
            },
        }
    }
}

pub type CodecResult<T> = Result<T, CodecError>;

// ============================================================================
// Session state
// ============================================================================

/// Per-session decoder state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CodeSetState {
    /// No wide character has been decoded yet in this session
    pub first_char: bool,
    /// A little-endian BOM was seen on the first wide character
    pub little_endian: bool,
}

impl CodeSetState {
    /// Flag bit: first character pending.
    pub const FIRST_CHAR: u32 = 0x1;
    /// Flag bit: little-endian order discovered.
    pub const L_ENDIAN: u32 = 0x2;

    /// State for a fresh decode session (BOM check armed).
    pub fn new_session() -> Self {
        Self {
            first_char: true,
            little_endian: false,
        }
    }

    /// Current flags as bits.
    pub fn flags(&self) -> u32 {
        let mut bits = 0;
        if self.first_char {
            bits |= Self::FIRST_CHAR;
        }
        if self.little_endian {
            bits |= Self::L_ENDIAN;
        }
        bits
    }

    /// Replace both flags at once (resume a session mid-stream).
    pub fn set_flags(&mut self, bits: u32) {
        self.first_char = bits & Self::FIRST_CHAR != 0;
        self.little_endian = bits & Self::L_ENDIAN != 0;
    }
}

// ============================================================================
// Reader capability
// ============================================================================

/// Character decoder for one transmission codeset.
pub trait CodeSetReader: Send + Sync {
    /// OSF registry id of the codeset this reader decodes.
    fn codeset_id(&self) -> u32;

    /// Decode one narrow character.
    fn read_char(&self, buf: &mut ReadBuffer<'_>) -> CodecResult<char>;

    /// Decode one wide character, updating the session state.
    fn read_wchar(&self, buf: &mut ReadBuffer<'_>, state: &mut CodeSetState) -> CodecResult<u16>;

    /// Number of octets the wide character starting with `first` occupies.
    fn wchar_byte_len(&self, first: u16, state: &CodeSetState) -> usize;
}

/// Reader for a negotiated transmission codeset, if supported.
pub fn reader_for(codeset_id: u32) -> Option<Box<dyn CodeSetReader>> {
    match codeset_id {
        CODESET_UTF_16 => Some(Box::new(Utf16Reader)),
        CODESET_ISO_8859_1 => Some(Box::new(Latin1Reader)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_roundtrip() {
        let mut state = CodeSetState::new_session();
        assert_eq!(state.flags(), CodeSetState::FIRST_CHAR);

        state.set_flags(CodeSetState::L_ENDIAN);
        assert!(!state.first_char);
        assert!(state.little_endian);
        assert_eq!(state.flags(), CodeSetState::L_ENDIAN);

        state.set_flags(0);
        assert_eq!(state, CodeSetState::default());
    }

    #[test]
    fn test_set_flags_ignores_unknown_bits() {
        let mut state = CodeSetState::default();
        state.set_flags(0xFFFF_FFF0 | CodeSetState::FIRST_CHAR);
        assert!(state.first_char);
        assert!(!state.little_endian);
    }

    #[test]
    fn test_reader_for() {
        assert_eq!(reader_for(CODESET_UTF_16).unwrap().codeset_id(), CODESET_UTF_16);
        assert_eq!(
            reader_for(CODESET_ISO_8859_1).unwrap().codeset_id(),
            CODESET_ISO_8859_1
        );
        assert!(reader_for(0x0501_0001).is_none());
    }

    #[test]
    fn test_codec_error_mapping() {
        let err: Error = CodecError::SurrogatePair {
            value: 0xD800,
            offset: 4,
        }
        .into();
        assert!(err.is_fatal());
        assert_eq!(err.minor(), Some(MinorCode::SurrogatePair));

        let err: Error = CodecError::Underflow {
            offset: 1,
            needed: 2,
        }
        .into();
        assert!(!err.is_fatal());
        assert_eq!(err.minor(), Some(MinorCode::Underflow));
    }
}
