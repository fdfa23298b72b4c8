//! Text encodings available for string fields.

use std::fmt;

use super::DecodeError;

/// Encoding applied to the bytes of a string field.
///
/// The length prefix always counts encoded bytes, never characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StringEncoding {
    /// UTF-16 with the low byte of each code unit first.
    #[default]
    Utf16Le,
    /// UTF-16 with the high byte of each code unit first.
    Utf16Be,
    /// UTF-8.
    Utf8,
}

impl StringEncoding {
    /// Encode `value` into its byte representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use packetlink::message::StringEncoding;
    ///
    /// assert_eq!(StringEncoding::Utf16Le.encode("hi"), vec![b'h', 0, b'i', 0]);
    /// assert_eq!(StringEncoding::Utf8.encode("hi"), b"hi".to_vec());
    /// ```
    #[must_use]
    pub fn encode(self, value: &str) -> Vec<u8> {
        match self {
            Self::Utf16Le => value.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Utf16Be => value.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Self::Utf8 => value.as_bytes().to_vec(),
        }
    }

    /// Decode `bytes` produced by [`StringEncoding::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidString`] when `bytes` are not valid for
    /// this encoding, including UTF-16 input of odd length.
    pub fn decode(self, bytes: &[u8]) -> Result<String, DecodeError> {
        let invalid = || DecodeError::InvalidString { encoding: self };
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|_| invalid()),
            Self::Utf16Le | Self::Utf16Be => {
                if !bytes.len().is_multiple_of(2) {
                    return Err(invalid());
                }
                let units = bytes.chunks_exact(2).map(|pair| {
                    let pair = [pair[0], pair[1]];
                    if self == Self::Utf16Le {
                        u16::from_le_bytes(pair)
                    } else {
                        u16::from_be_bytes(pair)
                    }
                });
                char::decode_utf16(units)
                    .collect::<Result<String, _>>()
                    .map_err(|_| invalid())
            }
        }
    }
}

impl fmt::Display for StringEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Utf16Le => "UTF-16LE",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf8 => "UTF-8",
        })
    }
}
