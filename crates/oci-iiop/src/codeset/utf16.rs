// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! UTF-16 reader with byte-order mark detection.

use super::{
    CodeSetReader, CodeSetState, CodecError, CodecResult, ReadBuffer, BOM_BIG_ENDIAN,
    BOM_LITTLE_ENDIAN, CODESET_UTF_16,
};

/// Surrogate range rejected by this wire profile.
const SURROGATES: std::ops::RangeInclusive<u16> = 0xD800..=0xDFFF;

/// UTF-16 wide-character reader.
///
/// Narrow characters are single octets. Wide characters are 2-octet units,
/// big-endian unless the first unit of the session is a little-endian BOM.
#[derive(Clone, Copy, Debug, Default)]
pub struct Utf16Reader;

impl CodeSetReader for Utf16Reader {
    fn codeset_id(&self) -> u32 {
        CODESET_UTF_16
    }

    fn read_char(&self, buf: &mut ReadBuffer<'_>) -> CodecResult<char> {
        Ok(char::from(buf.read_u8()?))
    }

    fn read_wchar(&self, buf: &mut ReadBuffer<'_>, state: &mut CodeSetState) -> CodecResult<u16> {
        // Cursor and state are committed together, only on success
        let mut cursor = buf.clone();
        let mut little_endian = state.little_endian;
        let mut value = u16::from_be_bytes(cursor.read_pair()?);

        if state.first_char && value == BOM_BIG_ENDIAN {
            value = u16::from_be_bytes(cursor.read_pair()?);
        } else if state.first_char && value == BOM_LITTLE_ENDIAN {
            value = u16::from_le_bytes(cursor.read_pair()?);
            little_endian = true;
        } else if little_endian {
            value = value.swap_bytes();
        }

        if SURROGATES.contains(&value) {
            return Err(CodecError::SurrogatePair {
                value,
                offset: cursor.offset() - 2,
            });
        }

        *buf = cursor;
        state.little_endian = little_endian;
        state.first_char = false;
        Ok(value)
    }

    fn wchar_byte_len(&self, first: u16, state: &CodeSetState) -> usize {
        if state.first_char && (first == BOM_BIG_ENDIAN || first == BOM_LITTLE_ENDIAN) {
            4
        } else {
            2
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8], state: &mut CodeSetState) -> CodecResult<Vec<u16>> {
        let reader = Utf16Reader;
        let mut buf = ReadBuffer::new(bytes);
        let mut out = Vec::new();
        while !buf.is_eof() {
            out.push(reader.read_wchar(&mut buf, state)?);
        }
        Ok(out)
    }

    fn be_units(units: &[u16]) -> Vec<u8> {
        units.iter().flat_map(|u| u.to_be_bytes()).collect()
    }

    fn le_units(units: &[u16]) -> Vec<u8> {
        units.iter().flat_map(|u| u.to_le_bytes()).collect()
    }

    const TEXT: [u16; 5] = [0x0048, 0x00E9, 0x4E2D, 0x0021, 0xFFFD];

    #[test]
    fn test_read_char_zero_extends() {
        let reader = Utf16Reader;
        let data = [0x41, 0xE9];
        let mut buf = ReadBuffer::new(&data);

        assert_eq!(reader.read_char(&mut buf).unwrap(), 'A');
        assert_eq!(reader.read_char(&mut buf).unwrap(), '\u{e9}');
        assert_eq!(buf.offset(), 2);
        assert!(reader.read_char(&mut buf).is_err());
    }

    #[test]
    fn test_big_endian_bom_is_consumed() {
        let plain = be_units(&TEXT);
        let mut with_bom = vec![0xFE, 0xFF];
        with_bom.extend_from_slice(&plain);

        let mut s1 = CodeSetState::new_session();
        let mut s2 = CodeSetState::new_session();
        assert_eq!(
            decode_all(&with_bom, &mut s1).unwrap(),
            decode_all(&plain, &mut s2).unwrap()
        );
        assert!(!s1.little_endian);
        assert!(!s1.first_char);
    }

    #[test]
    fn test_little_endian_bom_persists() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend_from_slice(&le_units(&TEXT));

        let mut state = CodeSetState::new_session();
        assert_eq!(decode_all(&bytes, &mut state).unwrap(), TEXT.to_vec());
        assert!(state.little_endian);
        assert!(!state.first_char);
    }

    #[test]
    fn test_little_endian_carried_into_next_fragment() {
        let reader = Utf16Reader;
        let first = [0xFF, 0xFE, 0x41, 0x00];
        let mut state = CodeSetState::new_session();
        let mut buf = ReadBuffer::new(&first);
        assert_eq!(reader.read_wchar(&mut buf, &mut state).unwrap(), 0x0041);

        // Resume on a new buffer from saved flags
        let mut resumed = CodeSetState::default();
        resumed.set_flags(state.flags());
        let second = [0x42, 0x00];
        let mut buf = ReadBuffer::new(&second);
        assert_eq!(reader.read_wchar(&mut buf, &mut resumed).unwrap(), 0x0042);
    }

    #[test]
    fn test_first_char_flag_is_one_shot() {
        // No BOM on the first unit, BOM pattern on the second
        let bytes = be_units(&[0x0041, BOM_BIG_ENDIAN, BOM_LITTLE_ENDIAN]);
        let mut state = CodeSetState::new_session();
        assert_eq!(
            decode_all(&bytes, &mut state).unwrap(),
            vec![0x0041, BOM_BIG_ENDIAN, BOM_LITTLE_ENDIAN]
        );
        assert!(!state.little_endian);
    }

    #[test]
    fn test_bom_not_checked_without_first_char() {
        let bytes = [0xFF, 0xFE, 0x00, 0x41];
        let mut state = CodeSetState::default();
        assert_eq!(
            decode_all(&bytes, &mut state).unwrap(),
            vec![BOM_LITTLE_ENDIAN, 0x0041]
        );
    }

    #[test]
    fn test_surrogates_rejected_in_both_orders() {
        for unit in [0xD800u16, 0xDBFF, 0xDC00, 0xDFFF] {
            let mut state = CodeSetState::new_session();
            let err = decode_all(&be_units(&[unit]), &mut state).unwrap_err();
            assert_eq!(err, CodecError::SurrogatePair { value: unit, offset: 0 });
            // Abort path leaves the session untouched
            assert!(state.first_char);

            let mut bytes = vec![0xFF, 0xFE];
            bytes.extend_from_slice(&le_units(&[0x0041, unit]));
            let mut state = CodeSetState::new_session();
            let err = decode_all(&bytes, &mut state).unwrap_err();
            assert_eq!(err, CodecError::SurrogatePair { value: unit, offset: 4 });
        }
    }

    #[test]
    fn test_surrogate_after_big_endian_bom() {
        let bytes = [0xFE, 0xFF, 0xD8, 0x3D];
        let mut state = CodeSetState::new_session();
        let err = decode_all(&bytes, &mut state).unwrap_err();
        assert_eq!(
            err,
            CodecError::SurrogatePair {
                value: 0xD83D,
                offset: 2
            }
        );
    }

    #[test]
    fn test_boundary_values_accepted() {
        let bytes = be_units(&[0xD7FF, 0xE000]);
        let mut state = CodeSetState::new_session();
        assert_eq!(decode_all(&bytes, &mut state).unwrap(), vec![0xD7FF, 0xE000]);
    }

    #[test]
    fn test_wchar_byte_len() {
        let reader = Utf16Reader;
        let first = CodeSetState::new_session();
        assert_eq!(reader.wchar_byte_len(BOM_BIG_ENDIAN, &first), 4);
        assert_eq!(reader.wchar_byte_len(BOM_LITTLE_ENDIAN, &first), 4);
        assert_eq!(reader.wchar_byte_len(0x0041, &first), 2);

        let later = CodeSetState::default();
        assert_eq!(reader.wchar_byte_len(BOM_BIG_ENDIAN, &later), 2);
        assert_eq!(reader.wchar_byte_len(BOM_LITTLE_ENDIAN, &later), 2);
    }

    #[test]
    fn test_truncated_after_bom() {
        let reader = Utf16Reader;
        let bytes = [0xFE, 0xFF, 0x00];
        let mut buf = ReadBuffer::new(&bytes);
        let mut state = CodeSetState::new_session();

        let err = reader.read_wchar(&mut buf, &mut state).unwrap_err();
        assert!(matches!(err, CodecError::Underflow { offset: 2, needed: 2 }));
        assert_eq!(buf.offset(), 0);
        assert_eq!(state, CodeSetState::new_session());
    }

    #[test]
    fn test_resume_after_underflow_keeps_little_endian_bom() {
        let reader = Utf16Reader;
        let mut state = CodeSetState::new_session();

        // Fragment ends in the middle of the first character after the BOM
        let first_fragment = [0xFF, 0xFE, 0x41];
        let mut buf = ReadBuffer::new(&first_fragment);
        assert!(reader.read_wchar(&mut buf, &mut state).is_err());
        let consumed = buf.offset();
        assert_eq!(consumed, 0);

        // Caller re-reads from the unconsumed bytes plus the next fragment
        let mut joined = first_fragment[consumed..].to_vec();
        joined.extend_from_slice(&[0x00, 0x42, 0x00]);
        let mut buf = ReadBuffer::new(&joined);
        assert_eq!(reader.read_wchar(&mut buf, &mut state).unwrap(), 0x0041);
        assert_eq!(reader.read_wchar(&mut buf, &mut state).unwrap(), 0x0042);
        assert!(state.little_endian);
        assert!(buf.is_eof());
    }

    #[test]
    fn test_surrogate_consumes_nothing() {
        let reader = Utf16Reader;
        let bytes = [0xFF, 0xFE, 0x3D, 0xD8];
        let mut buf = ReadBuffer::new(&bytes);
        let mut state = CodeSetState::new_session();

        let err = reader.read_wchar(&mut buf, &mut state).unwrap_err();
        assert_eq!(err, CodecError::SurrogatePair { value: 0xD83D, offset: 2 });
        assert_eq!(buf.offset(), 0);
        assert!(state.first_char);
        assert!(!state.little_endian);
    }

    #[test]
    fn test_random_text_matches_std_encoding() {
        let mut rng = fastrand::Rng::with_seed(0x1F0E);
        for _ in 0..64 {
            let text: String = (0..rng.usize(1..40))
                .map(|_| loop {
                    let c = rng.u32(0x20..0xFFFE);
                    if let Some(c) = char::from_u32(c) {
                        break c;
                    }
                })
                .collect();
            let units: Vec<u16> = text.encode_utf16().collect();

            let mut bytes = vec![0xFF, 0xFE];
            bytes.extend_from_slice(&le_units(&units));
            let mut state = CodeSetState::new_session();
            let decoded = decode_all(&bytes, &mut state).unwrap();
            assert_eq!(String::from_utf16(&decoded).unwrap(), text);
        }
    }
}
