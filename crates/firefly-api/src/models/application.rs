use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiResponse, null_as_default};
use crate::local_time;

// ── Application ──────────────────────────────────────────────────────

/// An application grouping devices under a common data sink.
///
/// The API documents the creation timestamp as `created_at` but has been
/// seen sending `inserted_at` instead. Both are accepted; `created_at` wins
/// when both are present and is the only key written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ApplicationWire")]
pub struct Application {
    pub id: i64,
    pub eui: String,
    pub name: String,
    pub description: String,
    /// Sink configuration; its shape depends on the sink type.
    pub sink: Value,
    #[serde(
        serialize_with = "local_time::option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Local>>,
    #[serde(
        serialize_with = "local_time::option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Local>>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ApplicationWire {
    #[serde(deserialize_with = "null_as_default")]
    id: i64,
    #[serde(deserialize_with = "null_as_default")]
    eui: String,
    #[serde(deserialize_with = "null_as_default")]
    name: String,
    #[serde(deserialize_with = "null_as_default")]
    description: String,
    sink: Value,
    #[serde(with = "local_time::option")]
    created_at: Option<DateTime<Local>>,
    #[serde(with = "local_time::option")]
    inserted_at: Option<DateTime<Local>>,
    #[serde(with = "local_time::option")]
    updated_at: Option<DateTime<Local>>,
}

impl From<ApplicationWire> for Application {
    fn from(wire: ApplicationWire) -> Self {
        Self {
            id: wire.id,
            eui: wire.eui,
            name: wire.name,
            description: wire.description,
            sink: wire.sink,
            created_at: wire.created_at.or(wire.inserted_at),
            updated_at: wire.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationListResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub applications: Vec<Application>,
}

impl ApiResponse for ApplicationListResponse {
    type Payload = Vec<Application>;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn into_payload(self) -> Self::Payload {
        self.applications
    }
}

// ── Device EUI listing ───────────────────────────────────────────────

/// Address/EUI pair from the "list EUIs of devices" endpoints.
///
/// Some deployments key the EUI as `id`; both spellings decode into `eui`,
/// with `eui` taking precedence when a row carries both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DeviceEuiWire")]
pub struct DeviceEui {
    pub address: String,
    pub eui: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct DeviceEuiWire {
    #[serde(deserialize_with = "null_as_default")]
    address: String,
    eui: Option<String>,
    id: Option<String>,
}

impl From<DeviceEuiWire> for DeviceEui {
    fn from(wire: DeviceEuiWire) -> Self {
        Self {
            address: wire.address,
            eui: wire.eui.or(wire.id).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEuiListResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub devices: Vec<DeviceEui>,
}

impl ApiResponse for DeviceEuiListResponse {
    type Payload = Vec<DeviceEui>;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn into_payload(self) -> Self::Payload {
        self.devices
    }
}
