use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a room code in ASCII digits.
pub const ROOM_CODE_LEN: usize = 6;

/// Short numeric code used to rendezvous peers in a room.
///
/// The relay itself never validates the format (any non-empty code names a
/// room); the fixed 6-digit shape is a client-side convention enforced where
/// codes are generated or typed in.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomCode(String);

#[derive(Debug, Error, PartialEq)]
pub enum RoomCodeError {
    #[error("room code must be exactly {ROOM_CODE_LEN} digits, got {0:?}")]
    BadFormat(String),
}

impl RoomCode {
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomCode {
    type Err = RoomCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == ROOM_CODE_LEN && s.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(RoomCodeError::BadFormat(s.to_string()))
        }
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
