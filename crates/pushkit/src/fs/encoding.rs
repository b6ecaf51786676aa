//! Text payload codec.
//!
//! The capability moves file contents as strings. With an [`Encoding`] the
//! string is the decoded text; without one it is standard base64 of the raw
//! bytes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::{Error as IoError, ErrorKind};

use super::traits::Encoding;
use crate::error::Result;

/// Convert a capability payload into the bytes to store.
pub fn encode(data: &str, encoding: Option<Encoding>) -> Result<Vec<u8>> {
    match encoding {
        Some(Encoding::Utf8) => Ok(data.as_bytes().to_vec()),
        Some(Encoding::Ascii) => {
            if !data.is_ascii() {
                return Err(invalid_data("non-ascii character in ascii payload"));
            }
            Ok(data.as_bytes().to_vec())
        }
        Some(Encoding::Utf16) => Ok(data.encode_utf16().flat_map(u16::to_le_bytes).collect()),
        None => STANDARD
            .decode(data)
            .map_err(|e| invalid_data(&format!("invalid base64 payload: {e}"))),
    }
}

/// Convert stored bytes into a capability payload.
pub fn decode(bytes: Vec<u8>, encoding: Option<Encoding>) -> Result<String> {
    match encoding {
        Some(Encoding::Utf8) => {
            String::from_utf8(bytes).map_err(|_| invalid_data("file is not valid utf-8"))
        }
        Some(Encoding::Ascii) => {
            if !bytes.is_ascii() {
                return Err(invalid_data("file is not valid ascii"));
            }
            String::from_utf8(bytes).map_err(|_| invalid_data("file is not valid ascii"))
        }
        Some(Encoding::Utf16) => {
            if bytes.len() % 2 != 0 {
                return Err(invalid_data("odd byte length for utf-16"));
            }
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).map_err(|_| invalid_data("file is not valid utf-16"))
        }
        None => Ok(STANDARD.encode(bytes)),
    }
}

fn invalid_data(msg: &str) -> crate::error::Error {
    IoError::new(ErrorKind::InvalidData, msg.to_string()).into()
}
