use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{ApiResponse, null_as_default};
use crate::local_time;

/// A device class: the script that turns raw payloads into `Packet::parsed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceClass {
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(with = "local_time::option", skip_serializing_if = "Option::is_none")]
    pub inserted_at: Option<DateTime<Local>>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub script: Script,
    #[serde(with = "local_time::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Local>>,
}

/// Decoding script. Parse elements run in order over the raw payload bits;
/// calculate elements then derive further values from the parsed ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Script {
    #[serde(deserialize_with = "null_as_default")]
    pub variables: DeviceVariables,
    #[serde(deserialize_with = "null_as_default")]
    pub parse_elements: Vec<DeviceParseElement>,
    #[serde(deserialize_with = "null_as_default")]
    pub calculate_elements: Vec<DeviceCalculateElement>,
}

/// Well-known slots the platform understands natively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceVariables {
    #[serde(deserialize_with = "null_as_default")]
    pub gps: DeviceVariable,
    #[serde(deserialize_with = "null_as_default")]
    pub battery_level: DeviceVariable,
    #[serde(deserialize_with = "null_as_default")]
    pub battery: DeviceVariable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceVariable {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// Extract `bits` of the payload into `target` as `type`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceParseElement {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bits: String,
    #[serde(skip_serializing_if = "is_false", deserialize_with = "null_as_default")]
    pub signed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceCalculateElement {
    #[serde(deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(deserialize_with = "null_as_default")]
    pub formula: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

// ── Responses ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceClassListResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub device_classes: Vec<DeviceClass>,
}

/// Single device class. The API reuses the plural `device_classes` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceClassResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, rename = "device_classes", deserialize_with = "null_as_default")]
    pub device_class: DeviceClass,
}

impl ApiResponse for DeviceClassListResponse {
    type Payload = Vec<DeviceClass>;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn into_payload(self) -> Self::Payload {
        self.device_classes
    }
}

impl ApiResponse for DeviceClassResponse {
    type Payload = DeviceClass;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn into_payload(self) -> Self::Payload {
        self.device_class
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn sample() -> serde_json::Value {
        json!({
            "id": 12,
            "name": "Tracker v2",
            "description": "GPS tracker with battery report",
            "inserted_at": "2022-11-02T12:00:00",
            "updated_at": "2023-01-15T10:30:00",
            "script": {
                "variables": {
                    "gps": { "type": "gps", "name": "position" },
                    "batteryLevel": { "type": "percent", "name": "level" },
                    "battery": { "type": "voltage", "name": "vbat" }
                },
                "parseElements": [
                    { "type": "int", "target": "lat", "bits": "0-23", "signed": true },
                    { "type": "uint", "target": "vbat", "bits": "48-55" }
                ],
                "calculateElements": [
                    { "target": "vbat", "formula": "vbat / 50" }
                ]
            }
        })
    }

    #[test]
    fn script_keys_keep_their_camel_case() {
        let class: DeviceClass = serde_json::from_value(sample()).unwrap();

        assert_eq!(class.script.variables.battery_level.kind, "percent");
        assert_eq!(class.script.parse_elements.len(), 2);
        assert!(class.script.parse_elements[0].signed);
        assert!(!class.script.parse_elements[1].signed);
        assert_eq!(class.script.calculate_elements[0].formula, "vbat / 50");

        let out = serde_json::to_value(&class).unwrap();
        assert_eq!(out, sample());
    }

    #[test]
    fn null_id_and_name_decode_as_zero_values() {
        let class: DeviceClass = serde_json::from_value(json!({
            "id": null,
            "name": null,
            "script": { "parseElements": [{ "type": null, "signed": null }] }
        }))
        .unwrap();
        assert_eq!(class.id, 0);
        assert_eq!(class.name, "");
        assert_eq!(class.script.parse_elements[0], DeviceParseElement::default());
    }

    #[test]
    fn single_class_uses_plural_key() {
        let resp: DeviceClassResponse =
            serde_json::from_value(json!({ "device_classes": sample() })).unwrap();
        assert_eq!(resp.into_payload().id, 12);
    }
}
