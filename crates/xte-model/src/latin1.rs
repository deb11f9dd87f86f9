//! ISO-8859-1 byte codec. XTE payloads are mandated to travel as Latin-1
//! bytes; both pipelines convert at the boundary and work on `str` inside.

use encoding::all::ISO_8859_1;
use encoding::{DecoderTrap, EncoderTrap, Encoding};

use crate::error::{Result, XteError};

/// Decode ISO-8859-1 bytes into text. Every byte is a valid Latin-1 code
/// point, so this only fails on allocator-level problems inside the codec.
pub fn decode_iso_8859_1(bytes: &[u8]) -> Result<String> {
    ISO_8859_1
        .decode(bytes, DecoderTrap::Strict)
        .map_err(|message| XteError::Encoding(message.into_owned()))
}

/// Encode text as ISO-8859-1 bytes, strictly: a character outside Latin-1 is
/// an error rather than a silent substitution.
pub fn encode_iso_8859_1(text: &str) -> Result<Vec<u8>> {
    ISO_8859_1
        .encode(text, EncoderTrap::Strict)
        .map_err(|message| XteError::Encoding(message.into_owned()))
}
