// Packet endpoints
//
// Uplink history per device or organization-wide, plus downlink queueing.

use tracing::debug;

use super::FireflyClient;
use crate::error::Error;
use crate::models::{Packet, PacketListResponse, SendPacketRequest, SendPacketResponse, SentPacket};
use crate::query::{ListAllPacketsParams, ListDevicePacketsParams};

impl FireflyClient {
    /// `GET devices/eui/{eui}/packets?direction=…&limit_to_last=…`
    pub async fn list_device_packets(
        &self,
        eui: &str,
        params: &ListDevicePacketsParams,
    ) -> Result<Vec<Packet>, Error> {
        let url = self.url(&["devices", "eui", eui, "packets"])?;
        debug!(eui, ?params, "listing device packets");
        self.get_with_params::<PacketListResponse, _>(url, params).await
    }

    /// Queue a downlink for the device.
    ///
    /// `POST devices/eui/{eui}/packets`
    pub async fn send_packet_to_device(
        &self,
        eui: &str,
        request: &SendPacketRequest,
    ) -> Result<SentPacket, Error> {
        let url = self.url(&["devices", "eui", eui, "packets"])?;
        debug!(eui, port = request.port, "sending packet");
        self.post::<SendPacketResponse, _>(url, request).await
    }

    /// Packets from every device in the organization.
    ///
    /// `GET packets?…`
    pub async fn list_all_packets(
        &self,
        params: &ListAllPacketsParams,
    ) -> Result<Vec<Packet>, Error> {
        let url = self.url(&["packets"])?;
        debug!(?params, "listing all packets");
        self.get_with_params::<PacketListResponse, _>(url, params).await
    }
}
