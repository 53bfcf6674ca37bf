// Firefly resource models
//
// Plain data mirrors of the JSON resources. Fields use `#[serde(default)]`
// liberally: the API leaves keys out or sends `null` where it has nothing,
// and a missing key must read as the zero value rather than fail the decode.
// Timestamps are the exception to leniency: a present but malformed local
// timestamp fails the whole document.

mod application;
mod device;
mod device_class;
mod packet;

pub use application::{Application, ApplicationListResponse, DeviceEui, DeviceEuiListResponse};
pub use device::{
    Device, DeviceCreate, DeviceCreateRequest, DeviceListResponse, DeviceResponse, DeviceUpdate,
    DeviceUpdateRequest,
};
pub use device_class::{
    DeviceCalculateElement, DeviceClass, DeviceClassListResponse, DeviceClassResponse,
    DeviceParseElement, DeviceVariable, DeviceVariables, Script,
};
pub use packet::{Gwrx, Packet, PacketListResponse, SendPacketRequest, SendPacketResponse, SentPacket};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// A response envelope: an optional top-level `error` plus one payload key.
///
/// The client checks `error` before decoding the envelope, so on success
/// `error` is always `None` and only the payload is handed to the caller.
pub trait ApiResponse: DeserializeOwned {
    type Payload;

    /// The API-level error message, if the server set one.
    fn error(&self) -> Option<&str>;

    fn into_payload(self) -> Self::Payload;
}

/// Treat an explicit `null` like a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
