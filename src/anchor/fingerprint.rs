//! Content fingerprints
//!
//! A fingerprint is the SHA-256 digest of normalized text, rendered as
//! lowercase hex. It identifies a passage independently of where it sits in
//! a document. It is a content identifier, not a security credential.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::AnchorError;
use super::normalize::normalize;

/// Length of a rendered fingerprint in hex characters
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Raw digest bytes
pub type DigestBytes = [u8; 32];

/// A 64-character lowercase hex SHA-256 digest of normalized text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint {
    hex: String,
    bytes: DigestBytes,
}

impl Fingerprint {
    /// Digest text that has already been normalized
    pub fn of_normalized(normalized: &str) -> Self {
        Self::from_bytes(digest(normalized))
    }

    /// Wrap raw digest bytes
    pub fn from_bytes(bytes: DigestBytes) -> Self {
        Self {
            hex: hex::encode(bytes),
            bytes,
        }
    }

    /// Parse a stored fingerprint, folding uppercase hex to lowercase
    pub fn from_hex(value: &str) -> Result<Self, AnchorError> {
        if value.len() != FINGERPRINT_HEX_LEN {
            return Err(AnchorError::InvalidFingerprint(value.to_string()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(value, &mut bytes)
            .map_err(|_| AnchorError::InvalidFingerprint(value.to_string()))?;
        Ok(Self::from_bytes(bytes))
    }

    /// The hex string
    pub fn as_str(&self) -> &str {
        &self.hex
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &DigestBytes {
        &self.bytes
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

impl FromStr for Fingerprint {
    type Err = AnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = AnchorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.hex
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.hex
    }
}

/// Fingerprint a selection together with its context.
///
/// The three parts are concatenated as `selected + before + after` with no
/// separator, normalized, then digested. Never fails.
pub fn fingerprint(selected_text: &str, context_before: &str, context_after: &str) -> Fingerprint {
    let mut joined =
        String::with_capacity(selected_text.len() + context_before.len() + context_after.len());
    joined.push_str(selected_text);
    joined.push_str(context_before);
    joined.push_str(context_after);
    Fingerprint::of_normalized(&normalize(&joined))
}

/// SHA-256 of already-normalized text
pub(crate) fn digest(normalized: &str) -> DigestBytes {
    Sha256::digest(normalized.as_bytes()).into()
}
