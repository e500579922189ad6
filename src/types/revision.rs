// ABOUTME: Timestamp revision identifiers in YYYYMMDDHHMMSS form.
// ABOUTME: Fixed width and zero padding make string order match chronological order.

use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// strftime format of a revision identifier.
pub const REVISION_FORMAT: &str = "%Y%m%d%H%M%S";

const REVISION_LEN: usize = 14;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RevisionError {
    #[error("revision cannot be empty")]
    Empty,

    #[error("revision must be {REVISION_LEN} digits (YYYYMMDDHHMMSS), got {0} characters")]
    WrongLength(usize),

    #[error("invalid character in revision: '{0}'")]
    InvalidChar(char),

    #[error("revision {0} is not a valid calendar time")]
    InvalidTime(String),
}

/// An immutable, timestamp-identified snapshot of staged assets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(String);

impl Revision {
    pub fn parse(value: &str) -> Result<Self, RevisionError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(RevisionError::Empty);
        }

        if let Some(c) = value.chars().find(|c| !c.is_ascii_digit()) {
            return Err(RevisionError::InvalidChar(c));
        }

        if value.len() != REVISION_LEN {
            return Err(RevisionError::WrongLength(value.len()));
        }

        NaiveDateTime::parse_from_str(value, REVISION_FORMAT)
            .map_err(|_| RevisionError::InvalidTime(value.to_string()))?;

        Ok(Self(value.to_string()))
    }

    /// Revision for the given wall-clock time.
    pub fn at<Tz: TimeZone>(time: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(time.format(REVISION_FORMAT).to_string())
    }

    /// Revision for the current time in the given time zone.
    pub fn now_in(tz: chrono_tz::Tz) -> Self {
        Self::at(&chrono::Utc::now().with_timezone(&tz))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decoded local timestamp. Infallible because construction validated it.
    pub fn timestamp(&self) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&self.0, REVISION_FORMAT).unwrap_or_default()
    }

    /// Human-readable date used in listings.
    pub fn display_date(&self) -> String {
        self.timestamp().format("%m/%d/%Y %H:%M").to_string()
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Revision {
    type Err = RevisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Revision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Revision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}
