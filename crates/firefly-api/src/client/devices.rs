// Device endpoints
//
// CRUD on `devices`, keyed by EUI (or address for lookups).

use tracing::debug;

use super::FireflyClient;
use crate::error::Error;
use crate::models::{
    Device, DeviceCreateRequest, DeviceListResponse, DeviceResponse, DeviceUpdateRequest,
};

impl FireflyClient {
    /// List every device visible to the API key.
    ///
    /// `GET devices`
    pub async fn show_all_devices(&self) -> Result<Vec<Device>, Error> {
        let url = self.url(&["devices"])?;
        debug!("listing devices");
        self.get::<DeviceListResponse>(url).await
    }

    /// `GET devices/eui/{eui}`
    pub async fn show_device_by_eui(&self, eui: &str) -> Result<Device, Error> {
        let url = self.url(&["devices", "eui", eui])?;
        debug!(eui, "fetching device");
        self.get::<DeviceResponse>(url).await
    }

    /// `GET devices/address/{address}`
    pub async fn show_device_by_address(&self, address: &str) -> Result<Device, Error> {
        let url = self.url(&["devices", "address", address])?;
        debug!(address, "fetching device by address");
        self.get::<DeviceResponse>(url).await
    }

    /// Register a device. The returned device carries the server-assigned
    /// timestamps and device class.
    ///
    /// `POST devices`
    pub async fn create_device(&self, request: &DeviceCreateRequest) -> Result<Device, Error> {
        let url = self.url(&["devices"])?;
        debug!(eui = %request.device.eui, "creating device");
        self.post::<DeviceResponse, _>(url, request).await
    }

    /// `PUT devices/eui/{eui}` with only the fields set in `request`.
    pub async fn update_device(
        &self,
        eui: &str,
        request: &DeviceUpdateRequest,
    ) -> Result<Device, Error> {
        let url = self.url(&["devices", "eui", eui])?;
        debug!(eui, "updating device");
        self.put::<DeviceResponse, _>(url, request).await
    }

    /// `DELETE devices/eui/{eui}`
    pub async fn delete_device(&self, eui: &str) -> Result<(), Error> {
        let url = self.url(&["devices", "eui", eui])?;
        debug!(eui, "deleting device");
        self.delete(url).await
    }
}
