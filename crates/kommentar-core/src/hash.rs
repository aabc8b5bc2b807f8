use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::HashError;

/// Type prefix shared by every action hash.
pub const ACTION_PREFIX: [u8; 3] = [0x84, 0x29, 0x24];

/// Total byte length: 3 prefix + 32 digest + 4 location.
pub const HASH_LEN: usize = 39;

/// Content-addressed identifier of an action (a post or a comment).
///
/// Equality is by value. The textual form is `u` followed by unpadded
/// url-safe base64, so every action hash renders as `uhCkk...`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionHash(Vec<u8>);

impl ActionHash {
    /// Build a hash from its full 39 raw bytes.
    pub fn from_raw_39(bytes: Vec<u8>) -> Result<Self, HashError> {
        if bytes.len() != HASH_LEN {
            return Err(HashError::Length(bytes.len()));
        }
        let prefix = [bytes[0], bytes[1], bytes[2]];
        if prefix != ACTION_PREFIX {
            return Err(HashError::WrongType(prefix));
        }
        Ok(Self(bytes))
    }

    /// Build a hash from digest + location bytes, adding the type prefix.
    pub fn from_raw_36(core: [u8; 36]) -> Self {
        let mut bytes = Vec::with_capacity(HASH_LEN);
        bytes.extend_from_slice(&ACTION_PREFIX);
        bytes.extend_from_slice(&core);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Deterministic hash for tests.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn fake(n: u8) -> Self {
        Self::from_raw_36([n; 36])
    }
}

impl fmt::Display for ActionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", URL_SAFE_NO_PAD.encode(&self.0))
    }
}

impl fmt::Debug for ActionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionHash({})", self)
    }
}

impl FromStr for ActionHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoded = s
            .strip_prefix('u')
            .ok_or_else(|| HashError::MissingPrefix(s.chars().take(8).collect()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| HashError::Encoding(e.to_string()))?;
        Self::from_raw_39(bytes)
    }
}

impl TryFrom<String> for ActionHash {
    type Error = HashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActionHash> for String {
    fn from(hash: ActionHash) -> Self {
        hash.to_string()
    }
}
