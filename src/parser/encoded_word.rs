//! RFC 2047 encoded-word decoding (`=?charset?B|Q?payload?=`).

use std::sync::LazyLock;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::error::{HeaderError, Result};

/// Whitespace, then `=?charset?X?payload?=`. The whitespace is part of the
/// match and is consumed along with the word.
///
/// The encoding indicator accepts any single letter so that unsupported
/// indicators are seen (and left alone) rather than silently skipped.
static ENCODED_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\s)=\?([^?]+)\?([A-Za-z])\?([^?]+)\?=").expect("encoded-word pattern is valid")
});

/// Standard alphabet, padding optional.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// The transfer encoding named by an encoded-word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// `B`: base64.
    Base64,
    /// `Q`: RFC 2047 quoted-printable.
    QuotedPrintable,
}

impl TransferEncoding {
    /// Map the single-letter indicator (case-insensitive).
    pub fn from_indicator(indicator: &str) -> Result<Self> {
        match indicator {
            "B" | "b" => Ok(Self::Base64),
            "Q" | "q" => Ok(Self::QuotedPrintable),
            other => Err(HeaderError::UnsupportedEncoding(other.to_string())),
        }
    }

    /// Decode `payload` to text under `charset`.
    ///
    /// Quoted-printable output is trimmed, base64 output is not.
    pub fn decode(self, charset: &str, payload: &str) -> Result<String> {
        match self {
            Self::Base64 => {
                let bytes = decode_base64(payload)?;
                decode_charset(charset, &bytes)
            }
            Self::QuotedPrintable => {
                let bytes = decode_quoted_printable(payload);
                decode_charset(charset, &bytes).map(|text| text.trim().to_string())
            }
        }
    }
}

/// Decode every encoded-word in a header line.
///
/// Each match, including the whitespace character before `=?`, is replaced
/// by its decoded text, so adjacent encoded-words join without a gap. A word
/// that cannot be decoded (unknown charset, unsupported encoding, broken
/// payload) stays as it was, whitespace included, and the scan carries on
/// with the rest of the line.
///
/// Example: `"Re: =?UTF-8?B?SGVsbG8=?="` → `"Re:Hello"`
pub fn decode_encoded_words(input: &str) -> String {
    if !input.contains("=?") {
        return input.to_string();
    }

    ENCODED_WORD
        .replace_all(input, |caps: &Captures<'_>| {
            match decode_word(&caps[2], &caps[3], &caps[4]) {
                Ok(text) => text,
                Err(e) => {
                    let token = &caps[0][caps[1].len()..];
                    if matches!(e, HeaderError::UnknownCharset(_)) {
                        warn!(token, error = %e, "Leaving encoded-word undecoded");
                    } else {
                        debug!(token, error = %e, "Leaving encoded-word undecoded");
                    }
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Decode a single encoded-word from its three parts.
pub fn decode_word(charset: &str, encoding: &str, payload: &str) -> Result<String> {
    TransferEncoding::from_indicator(encoding)?.decode(charset, payload)
}

/// Standard base64 to raw bytes.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    Ok(BASE64.decode(payload.trim())?)
}

/// Q-encoding to raw bytes: `=XX` → byte, `_` → space, anything else as-is.
///
/// An `=` not followed by two hex digits is kept literally.
pub fn decode_quoted_printable(payload: &str) -> Vec<u8> {
    let bytes = payload.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                result.push(b' ');
                i += 1;
            }
            b'=' => match bytes.get(i + 1..i + 3).and_then(hex_pair) {
                Some(byte) => {
                    result.push(byte);
                    i += 3;
                }
                None => {
                    result.push(b'=');
                    i += 1;
                }
            },
            b => {
                result.push(b);
                i += 1;
            }
        }
    }
    result
}

fn hex_pair(pair: &[u8]) -> Option<u8> {
    let hi = (pair[0] as char).to_digit(16)?;
    let lo = (pair[1] as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Decode bytes under a charset label (`UTF-8`, `ISO-8859-1`, `Windows-1252`, …).
///
/// An RFC 2231 language suffix (`UTF-8*en`) is ignored. Malformed sequences
/// become U+FFFD; only an unknown label is an error.
pub fn decode_charset(charset: &str, bytes: &[u8]) -> Result<String> {
    let label = charset.split('*').next().unwrap_or(charset).trim();
    let encoding = encoding_rs::Encoding::for_label(label.as_bytes())
        .ok_or_else(|| HeaderError::UnknownCharset(charset.to_string()))?;
    let (decoded, _) = encoding.decode_without_bom_handling(bytes);
    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_word() {
        assert_eq!(decode_encoded_words(" =?UTF-8?B?SGVsbG8=?="), "Hello");
    }

    #[test]
    fn test_decode_q_word_is_trimmed() {
        assert_eq!(
            decode_encoded_words(" =?UTF-8?Q?Hello=2C_World?="),
            "Hello, World"
        );
        assert_eq!(decode_word("UTF-8", "Q", "_padded_").unwrap(), "padded");
    }

    #[test]
    fn test_base64_is_not_trimmed() {
        // " hi " in base64
        assert_eq!(decode_word("UTF-8", "B", "IGhpIA==").unwrap(), " hi ");
    }

    #[test]
    fn test_lowercase_indicator() {
        assert_eq!(decode_encoded_words(" =?utf-8?b?SGVsbG8=?="), "Hello");
        assert_eq!(decode_encoded_words(" =?iso-8859-1?q?caf=E9?="), "café");
    }

    #[test]
    fn test_decode_iso8859_word() {
        assert_eq!(
            decode_encoded_words("Subject: =?ISO-8859-1?Q?R=E9sum=E9_du_projet?="),
            "Subject:Résumé du projet"
        );
    }

    #[test]
    fn test_decode_utf8_base64_japanese() {
        // 山田太郎
        assert_eq!(
            decode_encoded_words("From: =?UTF-8?B?5bGx55Sw5aSq6YOO?="),
            "From:山田太郎"
        );
    }

    #[test]
    fn test_missing_padding_is_accepted() {
        assert_eq!(decode_word("UTF-8", "B", "SGVsbG8").unwrap(), "Hello");
    }

    #[test]
    fn test_multiple_words_decoded_independently() {
        let input = "Subject: =?UTF-8?B?SG9sYQ==?= y =?ISO-8859-1?Q?adi=F3s?=";
        assert_eq!(decode_encoded_words(input), "Subject:Hola yadiós");
    }

    #[test]
    fn test_adjacent_words_join_without_gap() {
        assert_eq!(
            decode_encoded_words("Subject: =?UTF-8?Q?Q1?= =?UTF-8?Q?planning?="),
            "Subject:Q1planning"
        );
    }

    #[test]
    fn test_word_without_leading_whitespace_is_untouched() {
        let input = "Subject:=?UTF-8?B?SGVsbG8=?=";
        assert_eq!(decode_encoded_words(input), input);
    }

    #[test]
    fn test_unknown_charset_leaves_token() {
        let input = "Subject: =?X-NOPE?B?SGVsbG8=?= and =?UTF-8?B?SGVsbG8=?=";
        assert_eq!(
            decode_encoded_words(input),
            "Subject: =?X-NOPE?B?SGVsbG8=?= andHello"
        );
    }

    #[test]
    fn test_unsupported_encoding_leaves_token() {
        let input = "Subject: =?UTF-8?X?SGVsbG8=?=";
        assert_eq!(decode_encoded_words(input), input);
        assert!(matches!(
            decode_word("UTF-8", "X", "abc"),
            Err(HeaderError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn test_invalid_base64_leaves_token() {
        let input = "Subject: =?UTF-8?B?***?=";
        assert_eq!(decode_encoded_words(input), input);
    }

    #[test]
    fn test_quoted_printable_bytes() {
        assert_eq!(decode_quoted_printable("a=3Db"), b"a=b");
        assert_eq!(decode_quoted_printable("a_b"), b"a b");
        // Not an escape
        assert_eq!(decode_quoted_printable("a=ZZ"), b"a=ZZ");
        assert_eq!(decode_quoted_printable("tail="), b"tail=");
        assert_eq!(decode_quoted_printable("=+1"), b"=+1");
    }

    #[test]
    fn test_charset_language_suffix() {
        assert_eq!(decode_charset("UTF-8*en", b"ok").unwrap(), "ok");
    }

    #[test]
    fn test_plain_passthrough() {
        assert_eq!(decode_encoded_words("Normal subject"), "Normal subject");
    }
}
