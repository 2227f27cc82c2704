use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time::{parse_utc, to_utc_iso};

/// An instant as it arrived from the server.
///
/// Malformed values are kept verbatim so they survive a round trip; every
/// duration computed from one is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UtcStamp {
    Parsed(DateTime<Utc>),
    Malformed(String),
}

impl UtcStamp {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            UtcStamp::Parsed(dt) => Some(*dt),
            UtcStamp::Malformed(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, UtcStamp::Parsed(_))
    }
}

impl From<DateTime<Utc>> for UtcStamp {
    fn from(dt: DateTime<Utc>) -> Self {
        UtcStamp::Parsed(dt)
    }
}

impl From<String> for UtcStamp {
    fn from(raw: String) -> Self {
        match parse_utc(&raw) {
            Some(dt) => UtcStamp::Parsed(dt),
            None => UtcStamp::Malformed(raw),
        }
    }
}

impl From<&str> for UtcStamp {
    fn from(raw: &str) -> Self {
        UtcStamp::from(raw.to_string())
    }
}

impl From<UtcStamp> for String {
    fn from(stamp: UtcStamp) -> Self {
        match stamp {
            UtcStamp::Parsed(dt) => to_utc_iso(dt),
            UtcStamp::Malformed(raw) => raw,
        }
    }
}

impl fmt::Display for UtcStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtcStamp::Parsed(dt) => f.write_str(&to_utc_iso(*dt)),
            UtcStamp::Malformed(raw) => f.write_str(raw),
        }
    }
}
