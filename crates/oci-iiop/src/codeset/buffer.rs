// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked read cursor over received octets.

use super::{CodecError, CodecResult};

/// Immutable cursor for reading (bounds-checked, zero-copy)
#[derive(Debug, Clone)]
pub struct ReadBuffer<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> ReadBuffer<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        let byte = *self
            .buffer
            .get(self.offset)
            .ok_or(CodecError::Underflow {
                offset: self.offset,
                needed: 1,
            })?;
        self.offset += 1;
        Ok(byte)
    }

    /// Read two octets in wire order, without interpreting them.
    pub fn read_pair(&mut self) -> CodecResult<[u8; 2]> {
        let bytes = self.read_bytes(2)?;
        Ok([bytes[0], bytes[1]])
    }

    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(CodecError::Underflow {
                offset: self.offset,
                needed: len,
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}
