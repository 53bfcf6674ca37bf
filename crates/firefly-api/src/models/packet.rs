use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiResponse, null_as_default};
use crate::local_time;

// ── Packet ───────────────────────────────────────────────────────────

/// One uplink or downlink frame with its radio metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Packet {
    #[serde(deserialize_with = "null_as_default")]
    pub ack: bool,
    /// Channel bandwidth in kHz.
    #[serde(deserialize_with = "null_as_default")]
    pub bandwidth: i64,
    /// Coding rate, e.g. `"4/5"`.
    #[serde(deserialize_with = "null_as_default")]
    pub codr: String,
    /// Data rate identifier, e.g. `"SF7BW125"`.
    #[serde(deserialize_with = "null_as_default")]
    pub datr: String,
    #[serde(deserialize_with = "null_as_default")]
    pub device_eui: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fopts: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fcnt: i64,
    /// Frequency in MHz.
    #[serde(deserialize_with = "null_as_default")]
    pub freq: f64,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub gwrx: Vec<Gwrx>,
    #[serde(deserialize_with = "null_as_default")]
    pub modu: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mtype: String,
    /// Payload decoded by the device class script; shape is class-defined.
    pub parsed: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub payload: String,
    /// Whether `payload` is still encrypted with the application session key.
    #[serde(deserialize_with = "null_as_default")]
    pub payload_encrypted: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub port: i64,
    #[serde(with = "local_time::option", skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Local>>,
    #[serde(deserialize_with = "null_as_default")]
    pub size: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub spreading_factor: i64,
}

/// Reception record of a packet at a single gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gwrx {
    #[serde(deserialize_with = "null_as_default")]
    pub gweui: String,
    /// LoRa signal-to-noise ratio in dB.
    #[serde(deserialize_with = "null_as_default")]
    pub lsnr: f64,
    /// Received signal strength in dBm.
    #[serde(deserialize_with = "null_as_default")]
    pub rssi: i32,
    /// Gateway reception time. Unlike the resource timestamps this one is a
    /// zoned RFC 3339 string.
    pub time: Option<DateTime<FixedOffset>>,
    /// Gateway concentrator counter in microseconds.
    #[serde(deserialize_with = "null_as_default")]
    pub tmst: i64,
}

/// `{ "packets": [...] }` from packet listing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PacketListResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub packets: Vec<Packet>,
}

impl ApiResponse for PacketListResponse {
    type Payload = Vec<Packet>;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn into_payload(self) -> Self::Payload {
        self.packets
    }
}

// ── Downlink ─────────────────────────────────────────────────────────

/// Body of `POST devices/eui/{eui}/packets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPacketRequest {
    pub payload: String,
    /// How `payload` is encoded, e.g. `"base16"` or `"utf8"`.
    pub encoding: String,
    pub port: i64,
}

/// The queued downlink as acknowledged by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentPacket {
    #[serde(deserialize_with = "null_as_default")]
    pub fcnt: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub payload: String,
    #[serde(deserialize_with = "null_as_default")]
    pub port: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPacketResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sent_packet: SentPacket,
}

impl ApiResponse for SendPacketResponse {
    type Payload = SentPacket;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn into_payload(self) -> Self::Payload {
        self.sent_packet
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn packet_with_gateway_records_decodes() {
        let packet: Packet = serde_json::from_value(json!({
            "ack": false,
            "bandwidth": 125,
            "codr": "4/5",
            "datr": "SF7BW125",
            "device_eui": "0004a30b001a2b3c",
            "fopts": "",
            "fcnt": 42,
            "freq": 868.1,
            "gwrx": [{
                "gweui": "b827ebfffe6c1f2a",
                "lsnr": 9.5,
                "rssi": -71,
                "time": "2023-01-15T09:30:00.123456Z",
                "tmst": 3_512_348_611_i64
            }],
            "modu": "LORA",
            "mtype": "unconfirmed_data_up",
            "parsed": { "temperature": 4.5, "door": "closed" },
            "payload": "0102",
            "payload_encrypted": false,
            "port": 1,
            "received_at": "2023-01-15T10:30:00",
            "size": 2,
            "spreading_factor": 7
        }))
        .unwrap();

        assert_eq!(packet.fcnt, 42);
        assert_eq!(packet.gwrx.len(), 1);
        assert_eq!(packet.gwrx[0].rssi, -71);
        assert!(packet.gwrx[0].time.is_some());
        assert_eq!(packet.parsed["door"], "closed");
        assert!(packet.received_at.is_some());
    }

    #[test]
    fn null_scalars_decode_as_zero_values() {
        let list: PacketListResponse = serde_json::from_value(json!({
            "packets": [{
                "ack": null,
                "bandwidth": null,
                "device_eui": null,
                "fcnt": null,
                "freq": null,
                "gwrx": [{ "gweui": null, "lsnr": null, "rssi": null, "tmst": null }],
                "payload_encrypted": null,
                "port": null,
                "size": null,
                "spreading_factor": null
            }]
        }))
        .unwrap();

        let packet = &list.packets[0];
        assert!(!packet.ack);
        assert_eq!(packet.bandwidth, 0);
        assert_eq!(packet.device_eui, "");
        assert_eq!(packet.fcnt, 0);
        assert_eq!(packet.gwrx[0], Gwrx::default());
        assert!(!packet.payload_encrypted);
        assert_eq!(packet.spreading_factor, 0);
    }

    #[test]
    fn counters_outside_unsigned_range_decode() {
        let sent: SendPacketResponse = serde_json::from_value(json!({
            "sent_packet": { "fcnt": -1, "id": 7, "payload": "0a", "port": 4_294_967_296_i64 }
        }))
        .unwrap();
        assert_eq!(sent.sent_packet.fcnt, -1);
        assert_eq!(sent.sent_packet.port, 4_294_967_296);
    }

    #[test]
    fn parsed_payload_round_trips_untouched() {
        let parsed = json!({ "nested": [1, null, true, "x", { "k": 2.5 }] });
        let packet = Packet {
            parsed: parsed.clone(),
            ..Default::default()
        };
        let back: Packet = serde_json::from_str(&serde_json::to_string(&packet).unwrap()).unwrap();
        assert_eq!(back.parsed, parsed);
    }

    #[test]
    fn send_request_shape() {
        let body = SendPacketRequest {
            payload: "0a0b".into(),
            encoding: "base16".into(),
            port: 3,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "payload": "0a0b", "encoding": "base16", "port": 3 })
        );
    }
}
