//! Content signatures for change detection.

use std::fmt;

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a payload.
///
/// Only used to skip work when a payload has not changed since the last
/// successful reload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    pub fn of(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
