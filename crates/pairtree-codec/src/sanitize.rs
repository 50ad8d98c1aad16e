//! Reversible character sanitization.
//!
//! Rules, applied per character:
//! - Code points below `0x21` or above `0x7e`, and the reserved characters
//!   `" * + , < = > ? \ ^ |`, are escaped. Each byte of the character's
//!   UTF-8 encoding becomes `^` followed by two lowercase hex digits.
//! - `/`, `:` and `.` are replaced by `=`, `+` and `,` respectively.
//! - Everything else passes through unchanged.
//!
//! The substitution targets are themselves reserved, so they never appear
//! unescaped in an identifier's sanitized form and the reverse mapping is
//! unambiguous.

use crate::error::{CodecError, CodecResult};

/// Marker that introduces a two-digit hex escape.
pub const ESCAPE_MARKER: char = '^';

/// Printable ASCII characters that are always escaped.
const RESERVED: &[char] = &['"', '*', '+', ',', '<', '=', '>', '?', '\\', '^', '|'];

/// Single-character substitutions: (identifier char, sanitized char).
const SUBSTITUTIONS: &[(char, char)] = &[('/', '='), (':', '+'), ('.', ',')];

fn needs_escape(ch: char) -> bool {
    let cp = ch as u32;
    !(0x21..=0x7e).contains(&cp) || RESERVED.contains(&ch)
}

fn substitute(ch: char) -> char {
    SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == ch)
        .map_or(ch, |(_, to)| *to)
}

fn unsubstitute(ch: char) -> char {
    SUBSTITUTIONS
        .iter()
        .find(|(_, to)| *to == ch)
        .map_or(ch, |(from, _)| *from)
}

/// Sanitize an identifier into a filesystem-safe string.
///
/// # Examples
///
/// ```
/// use pairtree_codec::sanitize;
///
/// assert_eq!(sanitize("ab/c.d"), "ab=c,d");
/// assert_eq!(sanitize("a b"), "a^20b");
/// assert_eq!(sanitize(""), "");
/// ```
pub fn sanitize(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len());
    for ch in identifier.chars() {
        if needs_escape(ch) {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).as_bytes() {
                out.push(ESCAPE_MARKER);
                out.push_str(&hex::encode([*byte]));
            }
        } else {
            out.push(substitute(ch));
        }
    }
    out
}

/// Reverse [`sanitize`].
///
/// The fixed substitutions are undone first, then the string is scanned left
/// to right: a `^` consumes the next two characters as one hex byte, anything
/// else passes through. Upper-case hex digits are accepted.
pub fn desanitize(sanitized: &str) -> CodecResult<String> {
    let chars: Vec<char> = sanitized.chars().map(unsubstitute).collect();
    let mut bytes = Vec::with_capacity(chars.len());
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];
        if ch != ESCAPE_MARKER {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            pos += 1;
            continue;
        }

        let malformed = || CodecError::MalformedEscape {
            input: sanitized.to_string(),
            position: pos,
        };
        let digits: String = chars.get(pos + 1..pos + 3).ok_or_else(malformed)?.iter().collect();
        let mut byte = [0u8; 1];
        hex::decode_to_slice(&digits, &mut byte).map_err(|_| malformed())?;
        bytes.push(byte[0]);
        pos += 3;
    }

    String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8 {
        input: sanitized.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn substitutes_path_characters() {
        assert_eq!(sanitize("ab/c.d"), "ab=c,d");
        assert_eq!(sanitize("ark:/13030/xt12t3"), "ark+=13030=xt12t3");
        assert_eq!(desanitize("ab=c,d").unwrap(), "ab/c.d");
    }

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(sanitize("\"*+,<=>?\\^|"), "^22^2a^2b^2c^3c^3d^3e^3f^5c^5e^7c");
    }

    #[test]
    fn escapes_control_and_space_with_two_digits() {
        assert_eq!(sanitize("a\nb"), "a^0ab");
        assert_eq!(sanitize(" "), "^20");
        assert_eq!(sanitize("\u{7f}"), "^7f");
    }

    #[test]
    fn escapes_non_ascii_as_utf8_bytes() {
        assert_eq!(sanitize("é"), "^c3^a9");
        assert_eq!(sanitize("中"), "^e4^b8^ad");
        assert_eq!(desanitize("^e4^b8^ad").unwrap(), "中");
    }

    #[test]
    fn empty_roundtrip() {
        assert_eq!(sanitize(""), "");
        assert_eq!(desanitize("").unwrap(), "");
    }

    #[test]
    fn accepts_uppercase_hex() {
        assert_eq!(desanitize("^2A").unwrap(), "*");
    }

    #[test]
    fn truncated_escape_is_malformed() {
        let err = desanitize("abc^2").unwrap_err();
        assert!(matches!(err, CodecError::MalformedEscape { position: 3, .. }));
        assert!(desanitize("^").is_err());
    }

    #[test]
    fn non_hex_escape_is_malformed() {
        let err = desanitize("^zz").unwrap_err();
        assert!(matches!(err, CodecError::MalformedEscape { position: 0, .. }));
    }

    #[test]
    fn lone_continuation_byte_is_invalid_utf8() {
        let err = desanitize("^a9").unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8 { .. }));
    }

    proptest! {
        #[test]
        fn sanitize_roundtrips(id in any::<String>()) {
            prop_assert_eq!(desanitize(&sanitize(&id)).unwrap(), id);
        }

        #[test]
        fn sanitized_alphabet_is_safe(id in any::<String>()) {
            let sanitized = sanitize(&id);
            let chars: Vec<char> = sanitized.chars().collect();
            let mut pos = 0;
            while pos < chars.len() {
                let ch = chars[pos];
                prop_assert!(('\x21'..='\x7e').contains(&ch));
                if ch == ESCAPE_MARKER {
                    prop_assert!(pos + 2 < chars.len());
                    prop_assert!(chars[pos + 1].is_ascii_hexdigit());
                    prop_assert!(chars[pos + 2].is_ascii_hexdigit());
                    pos += 3;
                } else {
                    prop_assert!(!matches!(ch, '"' | '*' | '<' | '>' | '?' | '\\' | '|' | '/' | ':' | '.'));
                    pos += 1;
                }
            }
        }
    }
}
