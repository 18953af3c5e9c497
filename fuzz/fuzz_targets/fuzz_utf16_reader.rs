// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use oci_iiop::codeset::{CodeSetReader, CodeSetState, CodecError, ReadBuffer, Utf16Reader};

fuzz_target!(|data: &[u8]| {
    // First byte seeds the session flags, the rest is the wide-character stream
    let Some((&flags, bytes)) = data.split_first() else {
        return;
    };

    let reader = Utf16Reader;
    let mut state = CodeSetState::default();
    state.set_flags(u32::from(flags));

    let mut buf = ReadBuffer::new(bytes);
    while !buf.is_eof() {
        let before = buf.offset();
        match reader.read_wchar(&mut buf, &mut state) {
            Ok(wchar) => {
                assert!(!(0xD800..=0xDFFF).contains(&wchar));
                assert!(!state.first_char);
            }
            Err(CodecError::Underflow { .. }) => break,
            Err(CodecError::SurrogatePair { offset, .. }) => {
                assert!(offset >= before);
                break;
            }
        }
    }
});
