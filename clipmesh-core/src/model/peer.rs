use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Opaque peer identity, unique within a room.
///
/// The derived `Ord` compares the underlying strings byte-wise. That ordering
/// is load-bearing: both ends of a pair compare the same two ids independently
/// to decide which side initiates negotiation, so it must be a total order
/// that every node computes identically.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct PeerId(pub String);

impl PeerId {
    /// Generate a fresh id of the form `peer-<unix-millis>-<random>`.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("peer-{}-{}", millis, &suffix[..9]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated form for log lines. Ids are client-supplied and may hold
    /// multi-byte characters, so the cut lands on a char boundary.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
