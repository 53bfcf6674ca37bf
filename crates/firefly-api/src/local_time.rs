//! Codec for the Firefly "local time without zone" timestamp format.
//!
//! The API writes timestamps as `YYYY-MM-DDTHH:MM:SS`: no zone designator,
//! no fractional seconds, interpreted in the host's local timezone. Only
//! that exact shape is accepted. A zoned or fractional string is a decode
//! error, never a silent fallback.
//!
//! Use the serde adapters on model fields:
//!
//! ```
//! use chrono::{DateTime, Local};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Row {
//!     #[serde(default, with = "firefly_api::local_time::option")]
//!     created_at: Option<DateTime<Local>>,
//! }
//!
//! let row: Row = serde_json::from_str(r#"{"created_at":"2023-01-15T10:30:00"}"#).unwrap();
//! assert!(row.created_at.is_some());
//! ```

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeDelta, TimeZone};
use serde::{Deserialize, Deserializer, Serializer, de};
use thiserror::Error;

/// `strftime` pattern of the wire format.
pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const WIRE_LEN: usize = 19;

/// Why a string was rejected as a local timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("local timestamp must be 19 characters (YYYY-MM-DDTHH:MM:SS), got {0}")]
    Length(usize),

    #[error("local timestamp {0:?} does not match YYYY-MM-DDTHH:MM:SS")]
    Shape(String),

    #[error("local timestamp {input:?} is not a valid date/time: {reason}")]
    Calendar {
        input: String,
        reason: chrono::ParseError,
    },

    #[error("local timestamp {0:?} cannot be placed in the local timezone")]
    Unrepresentable(String),
}

/// Format a timestamp in the wire pattern (no quotes).
pub fn format(value: &DateTime<Local>) -> String {
    value.format(FORMAT).to_string()
}

/// Parse a wire timestamp (no quotes) and bind it to the local timezone.
pub fn parse(input: &str) -> Result<DateTime<Local>, ParseError> {
    if input.len() != WIRE_LEN {
        return Err(ParseError::Length(input.len()));
    }
    if !has_wire_shape(input.as_bytes()) {
        return Err(ParseError::Shape(input.to_owned()));
    }

    let naive =
        NaiveDateTime::parse_from_str(input, FORMAT).map_err(|reason| ParseError::Calendar {
            input: input.to_owned(),
            reason,
        })?;

    bind_local(naive).ok_or_else(|| ParseError::Unrepresentable(input.to_owned()))
}

fn has_wire_shape(bytes: &[u8]) -> bool {
    bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        10 => *b == b'T',
        13 | 16 => *b == b':',
        _ => b.is_ascii_digit(),
    })
}

/// Folded wall-clock times take the earlier instant; times skipped by a
/// DST jump move forward by the jump.
fn bind_local(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => Some(t),
        LocalResult::None => naive
            .checked_add_signed(TimeDelta::hours(1))
            .and_then(|shifted| Local.from_local_datetime(&shifted).earliest()),
    }
}

// ── serde adapters ───────────────────────────────────────────────────

pub fn serialize<S: Serializer>(value: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(FORMAT))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Local>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(de::Error::custom)
}

/// Adapter for `Option<DateTime<Local>>` fields. `null` maps to `None`;
/// pair with `#[serde(default)]` so a missing key does too.
pub mod option {
    use chrono::{DateTime, Local};
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Local>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => super::serialize(t, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Local>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse(&raw))
            .transpose()
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::{Datelike, NaiveDate, Timelike};
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Stamped {
        #[serde(default, with = "super::option")]
        at: Option<DateTime<Local>>,
    }

    #[test]
    fn parses_wire_format_as_local_wall_clock() {
        let t = parse("2023-01-15T10:30:00").unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(t.naive_local(), expected);
        assert_eq!(t.year(), 2023);
        assert_eq!(t.hour(), 10);
    }

    #[test]
    fn format_parse_round_trip_is_stable() {
        for raw in ["2023-01-15T10:30:00", "1999-12-31T23:59:59", "2024-02-29T00:00:00"] {
            let once = parse(raw).unwrap();
            let twice = parse(&format(&once)).unwrap();
            assert_eq!(once, twice);
            assert_eq!(format(&twice), raw);
        }
    }

    #[test]
    fn rejects_zoned_and_fractional_variants() {
        assert_eq!(parse("2023-01-15T10:30:00Z"), Err(ParseError::Length(20)));
        assert_eq!(parse("2023-01-15T10:30:00.123"), Err(ParseError::Length(23)));
        assert!(matches!(
            parse("2023-01-15 10:30:00"),
            Err(ParseError::Shape(_))
        ));
    }

    #[test]
    fn rejects_non_numeric_and_short_fields() {
        assert!(matches!(parse("2023-0a-15T10:30:00"), Err(ParseError::Shape(_))));
        assert!(matches!(parse("2023-1-15T10:30:00"), Err(ParseError::Length(18))));
        assert!(matches!(parse(""), Err(ParseError::Length(0))));
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        assert!(matches!(
            parse("2023-02-30T10:30:00"),
            Err(ParseError::Calendar { .. })
        ));
        assert!(matches!(
            parse("2023-01-15T25:00:00"),
            Err(ParseError::Calendar { .. })
        ));
    }

    #[test]
    fn serde_adapter_round_trips_and_fails_loudly() {
        let s: Stamped = serde_json::from_str(r#"{"at":"2023-01-15T10:30:00"}"#).unwrap();
        assert_eq!(
            serde_json::to_string(&s).unwrap(),
            r#"{"at":"2023-01-15T10:30:00"}"#
        );

        let missing: Stamped = serde_json::from_str("{}").unwrap();
        assert!(missing.at.is_none());

        let null: Stamped = serde_json::from_str(r#"{"at":null}"#).unwrap();
        assert!(null.at.is_none());

        let err = serde_json::from_str::<Stamped>(r#"{"at":"2023-01-15T10:30:00+01:00"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("19 characters"));
    }
}
