//! `Digest` header composition
//!
//! Release files record checksums keyed `<algo>-hex` or `<algo>-base64`. The
//! `Digest` header (RFC 3230) wants `algo=<base64>` pairs, so hex values are
//! re-encoded and base64 values are passed through.

use base64::Engine;
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

use crate::error::{RegistryError, Result};

/// Encoding of a recorded checksum value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumEncoding {
    /// Lowercase or uppercase hexadecimal
    Hex,
    /// Standard base64 with padding
    Base64,
}

impl ChecksumEncoding {
    fn suffix(&self) -> &'static str {
        match self {
            ChecksumEncoding::Hex => "-hex",
            ChecksumEncoding::Base64 => "-base64",
        }
    }
}

impl fmt::Display for ChecksumEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.suffix()[1..])
    }
}

/// A checksum key split into algorithm and encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumKey<'a> {
    pub algorithm: &'a str,
    pub encoding: ChecksumEncoding,
}

impl<'a> ChecksumKey<'a> {
    /// Parse `sha256-hex` / `sha256-base64`; other keys yield `None`
    pub fn parse(key: &'a str) -> Option<Self> {
        [ChecksumEncoding::Hex, ChecksumEncoding::Base64]
            .into_iter()
            .find_map(|encoding| {
                key.strip_suffix(encoding.suffix())
                    .map(|algorithm| ChecksumKey { algorithm, encoding })
            })
    }
}

/// Render one checksum as a `Digest` part (`algo=<base64>`)
pub fn digest_part(key: ChecksumKey<'_>, value: &str) -> Result<String> {
    let encoded = match key.encoding {
        ChecksumEncoding::Hex => {
            let bytes = hex::decode(value).map_err(|e| RegistryError::InvalidChecksum {
                algorithm: key.algorithm.to_string(),
                message: e.to_string(),
            })?;
            base64::engine::general_purpose::STANDARD.encode(bytes)
        }
        ChecksumEncoding::Base64 => value.to_string(),
    };
    Ok(format!("{}={}", key.algorithm, encoded))
}

/// Build a `Digest` header value from recorded checksums.
///
/// Keys that are not `-hex`/`-base64`, non-string values and undecodable hex
/// values are skipped. An empty string means there is nothing to send.
pub fn make_digest<'a, I>(checksums: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    checksums
        .into_iter()
        .filter_map(|(key, value)| {
            let key = ChecksumKey::parse(key)?;
            match digest_part(key, value) {
                Ok(part) => Some(part),
                Err(e) => {
                    warn!("Skipping checksum in digest: {}", e);
                    None
                }
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// [`make_digest`] over a JSON checksum object as stored in app records
pub fn make_digest_from_map(checksums: Option<&Map<String, Value>>) -> String {
    match checksums {
        Some(map) => make_digest(
            map.iter()
                .filter_map(|(key, value)| Some((key.as_str(), value.as_str()?))),
        ),
        None => String::new(),
    }
}
