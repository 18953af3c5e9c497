// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ISO 8859-1 reader (single-octet narrow and wide characters).

use super::{CodeSetReader, CodeSetState, CodecResult, ReadBuffer, CODESET_ISO_8859_1};

/// ISO 8859-1 reader. Has no byte order, so the session state is only
/// advanced past the first character.
#[derive(Clone, Copy, Debug, Default)]
pub struct Latin1Reader;

impl CodeSetReader for Latin1Reader {
    fn codeset_id(&self) -> u32 {
        CODESET_ISO_8859_1
    }

    fn read_char(&self, buf: &mut ReadBuffer<'_>) -> CodecResult<char> {
        Ok(char::from(buf.read_u8()?))
    }

    fn read_wchar(&self, buf: &mut ReadBuffer<'_>, state: &mut CodeSetState) -> CodecResult<u16> {
        let value = u16::from(buf.read_u8()?);
        state.first_char = false;
        Ok(value)
    }

    fn wchar_byte_len(&self, _first: u16, _state: &CodeSetState) -> usize {
        1
    }
}
