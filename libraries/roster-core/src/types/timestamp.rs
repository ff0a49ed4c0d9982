//! Fixed-format UTC timestamps
//!
//! Every timestamp Roster stores or returns is rendered as
//! `YYYY-MM-DDTHH:MM:SS.mmmZ`: UTC, millisecond precision, trailing `Z`.
//! Because the width never varies, lexical order of the rendered strings
//! equals chronological order.

use crate::error::{Result, RosterError};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const RENDER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A UTC instant truncated to millisecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wrap a `DateTime`, dropping anything below one millisecond
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let truncated = DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()).unwrap_or(dt);
        Self(truncated)
    }

    /// Current wall-clock time
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Build from milliseconds since the Unix epoch
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis).map(Self)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Parse a stored timestamp.
    ///
    /// Accepts any RFC 3339 instant and normalizes it to UTC milliseconds, so
    /// rows imported from older datasets survive a round-trip.
    pub fn parse(raw: &str) -> Result<Self> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| Self::from_datetime(dt.with_timezone(&Utc)))
            .map_err(|e| RosterError::malformed_input(format!("invalid timestamp {raw:?}: {e}")))
    }

    /// Parse the expiry supplied with a ban request.
    ///
    /// Exactly two shapes are accepted:
    /// - `YYYY-MM-DD` (midnight UTC)
    /// - `YYYY-MM-DDTHH:MM:SS.ffffffZ` (one to six fractional digits)
    ///
    /// Anything else is `MalformedInput`.
    pub fn parse_ban_until(raw: &str) -> Result<Self> {
        let malformed = || RosterError::malformed_input(format!("unrecognized ban date: {raw:?}"));

        // chrono's `%Y` also takes signed and wider years, which would not
        // render back at fixed width
        if !has_four_digit_year(raw) {
            return Err(malformed());
        }

        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(malformed)?;
            return Ok(Self::from_datetime(Utc.from_utc_datetime(&midnight)));
        }

        let (head, fraction) = raw
            .strip_suffix('Z')
            .and_then(|rest| rest.split_once('.'))
            .ok_or_else(malformed)?;

        if fraction.is_empty()
            || fraction.len() > 6
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let naive =
            NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S").map_err(|_| malformed())?;
        let micros: i64 = format!("{fraction:0<6}").parse().map_err(|_| malformed())?;

        Ok(Self::from_datetime(
            Utc.from_utc_datetime(&naive) + Duration::microseconds(micros),
        ))
    }
}

fn has_four_digit_year(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() > 4 && bytes[..4].iter().all(u8::is_ascii_digit) && bytes[4] == b'-'
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(RENDER_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
