use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{ApiResponse, null_as_default};
use crate::local_time;

// ── Device ───────────────────────────────────────────────────────────

/// A LoRaWAN end device as returned by `devices` endpoints.
///
/// `eui` is the external key used in every device-scoped path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub application_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub application_session_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub eui: String,
    #[serde(deserialize_with = "null_as_default")]
    pub network_session_key: String,
    /// Over-the-air activation (as opposed to ABP).
    #[serde(deserialize_with = "null_as_default")]
    pub otaa: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(with = "local_time::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Local>>,
    /// Device class reference; not resolved by this crate.
    pub device_class_id: Option<i64>,
    #[serde(with = "local_time::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Local>>,
}

// ── Requests ─────────────────────────────────────────────────────────

/// Body of `POST devices`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCreateRequest {
    pub organization: i64,
    pub application: i64,
    pub device: DeviceCreate,
}

/// Writable device fields for creation. Every field is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceCreate {
    pub address: String,
    pub application_key: String,
    pub application_session_key: String,
    pub description: String,
    pub eui: String,
    pub network_session_key: String,
    pub otaa: bool,
    pub tags: Vec<String>,
}

/// Body of `PUT devices/eui/{eui}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceUpdateRequest {
    pub device: DeviceUpdate,
}

/// Partial device update. Unset fields are left out of the body and keep
/// their current value on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_session_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eui: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_session_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otaa: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl From<DeviceUpdate> for DeviceUpdateRequest {
    fn from(device: DeviceUpdate) -> Self {
        Self { device }
    }
}

// ── Responses ────────────────────────────────────────────────────────

/// `{ "devices": [...] }` from `GET devices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceListResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub devices: Vec<Device>,
}

/// `{ "device": {...} }` from single-device endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub device: Device,
}

impl ApiResponse for DeviceListResponse {
    type Payload = Vec<Device>;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn into_payload(self) -> Self::Payload {
        self.devices
    }
}

impl ApiResponse for DeviceResponse {
    type Payload = Device;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn into_payload(self) -> Self::Payload {
        self.device
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn sparse_device_decodes_with_zero_values() {
        let device: Device =
            serde_json::from_str(r#"{"created_at":"2023-01-15T10:30:00"}"#).unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(device.created_at.unwrap().naive_local(), expected);
        assert_eq!(device.eui, "");
        assert!(device.tags.is_empty());
        assert!(device.updated_at.is_none());
    }

    #[test]
    fn zoned_timestamp_fails_the_whole_device() {
        let result = serde_json::from_str::<Device>(r#"{"created_at":"2023-01-15T10:30:00Z"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn full_device_decodes_and_nulls_are_tolerated() {
        let device: Device = serde_json::from_value(json!({
            "address": null,
            "application_key": "00112233445566778899aabbccddeeff",
            "application_session_key": null,
            "description": "cold store sensor",
            "eui": "0004a30b001a2b3c",
            "network_session_key": null,
            "otaa": true,
            "tags": null,
            "created_at": "2023-01-15T10:30:00",
            "device_class_id": 7,
            "updated_at": "2023-02-01T08:00:00"
        }))
        .unwrap();

        assert_eq!(device.eui, "0004a30b001a2b3c");
        assert_eq!(device.address, "");
        assert!(device.otaa);
        assert!(device.tags.is_empty());
        assert_eq!(device.device_class_id, Some(7));
    }

    #[test]
    fn null_eui_and_flag_decode_as_zero_values() {
        let response: DeviceResponse =
            serde_json::from_value(json!({ "device": { "eui": null, "otaa": null } })).unwrap();
        assert_eq!(response.device.eui, "");
        assert!(!response.device.otaa);
    }

    #[test]
    fn update_body_omits_unset_fields() {
        let request = DeviceUpdateRequest::from(DeviceUpdate {
            description: Some("moved to dock 4".into()),
            otaa: Some(false),
            ..Default::default()
        });
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "device": { "description": "moved to dock 4", "otaa": false } })
        );
    }

    #[test]
    fn create_body_sends_every_field() {
        let request = DeviceCreateRequest {
            organization: 1,
            application: 2,
            device: DeviceCreate {
                eui: "0004a30b001a2b3c".into(),
                otaa: true,
                tags: vec!["dock".into()],
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["organization"], 1);
        assert_eq!(value["device"]["address"], "");
        assert_eq!(value["device"]["tags"], json!(["dock"]));
        assert_eq!(value["device"].as_object().unwrap().len(), 8);
    }
}
