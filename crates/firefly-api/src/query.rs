//! Query-string encoding for the optional packet listing parameters.
//!
//! Encoding emits a key only when its field differs from the zero value, in
//! alphabetical key order. Decoding is lenient: a missing or malformed value
//! quietly falls back to the default. Unlike JSON bodies, query parameters
//! never fail to decode.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use strum::{AsRefStr, Display, EnumString};
use url::form_urlencoded;

use crate::local_time;

/// Most packets a single listing call may return.
pub const MAX_LIMIT_TO_LAST: u32 = 100;
/// Server-side `limit_to_last` when none is given.
pub const DEFAULT_LIMIT_TO_LAST: u32 = 1;
/// Server-side `limit_to_last` when only `received_after` is given.
pub const DEFAULT_LIMIT_WITH_RECEIVED_AFTER: u32 = 10;

/// Packet ordering by reception time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Oldest first.
    Asc,
    /// Most recent first (server default).
    #[default]
    Desc,
}

// ── Raw query values ─────────────────────────────────────────────────

/// Decoded query pairs. The first occurrence of a repeated key wins.
#[derive(Debug, Clone, Default)]
pub struct QueryValues(HashMap<String, String>);

impl QueryValues {
    /// Parse a raw query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        form_urlencoded::parse(query.trim_start_matches('?').as_bytes()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Absent, empty and the false spellings are `false`; any other value is `true`.
    fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty() && !is_false_spelling(v))
    }

    fn count(&self, key: &str) -> u32 {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    fn timestamp(&self, key: &str) -> Option<DateTime<Local>> {
        self.get(key).and_then(|v| local_time::parse(v).ok())
    }

    fn direction(&self) -> Option<Direction> {
        self.get("direction").and_then(|v| v.parse().ok())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map: HashMap<String, String> = HashMap::new();
        for (k, v) in iter {
            map.entry(k.into()).or_insert_with(|| v.into());
        }
        Self(map)
    }
}

fn is_false_spelling(raw: &str) -> bool {
    matches!(raw, "0" | "f" | "F" | "FALSE" | "false" | "False")
}

// ── Codec trait ──────────────────────────────────────────────────────

/// A parameter set that travels as URL query pairs.
pub trait QueryParams: Sized {
    /// Non-default fields as `(key, value)` pairs, keys in alphabetical order.
    fn to_pairs(&self) -> Vec<(&'static str, String)>;

    /// Rebuild from decoded pairs; anything missing or malformed is default.
    fn from_values(values: &QueryValues) -> Self;

    /// Encode as `application/x-www-form-urlencoded`; empty when all defaults.
    fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.to_pairs() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }

    fn from_query_str(query: &str) -> Self {
        Self::from_values(&QueryValues::parse(query))
    }
}

// ── Packet listing parameters ────────────────────────────────────────

/// Options for `GET devices/eui/{eui}/packets`.
///
/// Zero values mean "unset" and are left to the server's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDevicePacketsParams {
    /// `asc` returns the oldest packets first, `desc` the most recent.
    pub direction: Option<Direction>,
    /// Number of packets to return. Server default is 1, maximum 100.
    pub limit_to_last: u32,
    /// Number of most recent packets to skip.
    pub offset: u32,
    /// Only return payload, parsed payload, timestamp and device address.
    pub payload_only: bool,
    /// Only return packets received after this instant.
    pub received_after: Option<DateTime<Local>>,
}

impl ListDevicePacketsParams {
    /// The `limit_to_last` the server will apply for this request.
    pub fn effective_limit(&self) -> u32 {
        effective_limit(self.limit_to_last, self.received_after.is_some())
    }

    pub fn effective_direction(&self) -> Direction {
        self.direction.unwrap_or_default()
    }
}

impl QueryParams for ListDevicePacketsParams {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        common_pairs(
            self.direction,
            self.limit_to_last,
            self.offset,
            self.payload_only,
            self.received_after.as_ref(),
        )
    }

    fn from_values(values: &QueryValues) -> Self {
        Self {
            direction: values.direction(),
            limit_to_last: values.count("limit_to_last"),
            offset: values.count("offset"),
            payload_only: values.flag("payload_only"),
            received_after: values.timestamp("received_after"),
        }
    }
}

/// Options for `GET packets`, the organization-wide packet listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAllPacketsParams {
    pub direction: Option<Direction>,
    pub limit_to_last: u32,
    pub offset: u32,
    /// Only return payload, timestamp and device address.
    pub payload_only: bool,
    pub received_after: Option<DateTime<Local>>,
    /// Hide packets from devices that belong to sub-organizations.
    pub skip_suborgs: bool,
}

impl ListAllPacketsParams {
    pub fn effective_limit(&self) -> u32 {
        effective_limit(self.limit_to_last, self.received_after.is_some())
    }

    pub fn effective_direction(&self) -> Direction {
        self.direction.unwrap_or_default()
    }
}

impl QueryParams for ListAllPacketsParams {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = common_pairs(
            self.direction,
            self.limit_to_last,
            self.offset,
            self.payload_only,
            self.received_after.as_ref(),
        );
        if self.skip_suborgs {
            pairs.push(("skip_suborgs", "true".into()));
        }
        pairs
    }

    fn from_values(values: &QueryValues) -> Self {
        Self {
            direction: values.direction(),
            limit_to_last: values.count("limit_to_last"),
            offset: values.count("offset"),
            payload_only: values.flag("payload_only"),
            received_after: values.timestamp("received_after"),
            skip_suborgs: values.flag("skip_suborgs"),
        }
    }
}

fn common_pairs(
    direction: Option<Direction>,
    limit_to_last: u32,
    offset: u32,
    payload_only: bool,
    received_after: Option<&DateTime<Local>>,
) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::with_capacity(6);
    if let Some(direction) = direction {
        pairs.push(("direction", direction.to_string()));
    }
    if limit_to_last != 0 {
        pairs.push(("limit_to_last", limit_to_last.to_string()));
    }
    if offset != 0 {
        pairs.push(("offset", offset.to_string()));
    }
    if payload_only {
        pairs.push(("payload_only", "true".into()));
    }
    if let Some(after) = received_after {
        pairs.push(("received_after", local_time::format(after)));
    }
    pairs
}

fn effective_limit(limit_to_last: u32, has_received_after: bool) -> u32 {
    match limit_to_last {
        0 if has_received_after => DEFAULT_LIMIT_WITH_RECEIVED_AFTER,
        0 => DEFAULT_LIMIT_TO_LAST,
        n => n.min(MAX_LIMIT_TO_LAST),
    }
}
