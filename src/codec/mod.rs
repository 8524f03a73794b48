//! Base58 encoding and decoding
//!
//! The wallet protocol transmits every binary field (public keys, nonces,
//! ciphertexts) as base58 text in URL query parameters. This is Bitcoin-style
//! base58: the alphabet omits `0`, `O`, `I` and `l`, and leading zero bytes
//! are preserved as leading `'1'` characters.

use thiserror::Error;

/// The base58 alphabet (no `0`, `O`, `I`, `l`)
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Errors that can occur while decoding base58 text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The input contains a character outside the base58 alphabet
    #[error("invalid base58 character {character:?} at position {position}")]
    InvalidCharacter {
        /// The offending character
        character: char,
        /// Byte offset of the character in the input
        position: usize,
    },
}

/// Encode a byte string as base58 text
///
/// Leading zero bytes become leading `'1'` characters; the remainder is
/// treated as a big-endian integer and rewritten in base 58. The empty
/// input encodes to the empty string.
pub fn encode(input: &[u8]) -> String {
    let zeros = input.iter().take_while(|&&b| b == 0).count();

    // Repeated division of the big-endian integer by 58.
    // Digits come out least-significant first.
    let mut digits: Vec<u8> = Vec::with_capacity(input.len() * 138 / 100 + 1);
    for &byte in &input[zeros..] {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(zeros + digits.len());
    for _ in 0..zeros {
        out.push(ALPHABET[0] as char);
    }
    for &digit in digits.iter().rev() {
        out.push(ALPHABET[digit as usize] as char);
    }
    out
}

/// Decode base58 text back into bytes
///
/// The inverse of [`encode`]. Fails with [`CodecError::InvalidCharacter`]
/// if any character is not in the alphabet.
pub fn decode(input: &str) -> Result<Vec<u8>, CodecError> {
    let mut zeros = 0;
    let mut bytes: Vec<u8> = Vec::with_capacity(input.len() * 733 / 1000 + 1);
    let mut in_leading_zeros = true;

    for (position, character) in input.char_indices() {
        let index = digit_index(character).ok_or(CodecError::InvalidCharacter {
            character,
            position,
        })?;

        if in_leading_zeros && index == 0 {
            zeros += 1;
            continue;
        }
        in_leading_zeros = false;

        // bytes = bytes * 58 + index, big-integer style, little-endian limbs
        let mut carry = index as u32;
        for byte in bytes.iter_mut() {
            carry += (*byte as u32) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; zeros];
    out.extend(bytes.iter().rev());
    Ok(out)
}

fn digit_index(character: char) -> Option<u8> {
    if !character.is_ascii() {
        return None;
    }
    ALPHABET
        .iter()
        .position(|&a| a == character as u8)
        .map(|i| i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_roundtrip() {
        assert_eq!(encode(&[]), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(encode(b"hello"), "Cn8eVZg");
        assert_eq!(decode("Cn8eVZg").unwrap(), b"hello");

        // "abc" = 0x616263
        assert_eq!(encode(b"abc"), "ZiCa");
        assert_eq!(decode("ZiCa").unwrap(), b"abc");
    }

    #[test]
    fn test_single_bytes() {
        assert_eq!(encode(&[0]), "1");
        assert_eq!(encode(&[57]), "z");
        assert_eq!(encode(&[58]), "21");
        assert_eq!(decode("1").unwrap(), vec![0]);
        assert_eq!(decode("z").unwrap(), vec![57]);
        assert_eq!(decode("21").unwrap(), vec![58]);
    }

    #[test]
    fn test_leading_zeros_preserved() {
        let input = [0, 0, 0, 1, 2, 3];
        let encoded = encode(&input);
        assert!(encoded.starts_with("111"));
        assert_eq!(decode(&encoded).unwrap(), input);
    }

    #[test]
    fn test_all_zero_input() {
        let input = [0u8; 7];
        assert_eq!(encode(&input), "1111111");
        assert_eq!(decode("1111111").unwrap(), input);
    }

    #[test]
    fn test_roundtrip_various_lengths() {
        for len in 0..64 {
            let input: Vec<u8> = (0..len).map(|i| (i * 37 + 11) as u8).collect();
            assert_eq!(decode(&encode(&input)).unwrap(), input, "length {len}");
        }
    }

    #[test]
    fn test_roundtrip_32_byte_key_shape() {
        let input = [0xffu8; 32];
        assert_eq!(decode(&encode(&input)).unwrap(), input);
    }

    #[test]
    fn test_invalid_character_rejected() {
        // '0', 'O', 'I' and 'l' are deliberately absent from the alphabet
        for bad in ["0", "O", "I", "l"] {
            assert!(matches!(
                decode(bad),
                Err(CodecError::InvalidCharacter { .. })
            ));
        }

        let err = decode("Cn8e Zg").unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidCharacter {
                character: ' ',
                position: 4
            }
        );
    }

    #[test]
    fn test_invalid_non_ascii_rejected() {
        assert!(matches!(
            decode("abcé"),
            Err(CodecError::InvalidCharacter { character: 'é', .. })
        ));
    }
}
