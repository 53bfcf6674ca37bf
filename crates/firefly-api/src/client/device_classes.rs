// Device class endpoints

use tracing::debug;

use super::FireflyClient;
use crate::error::Error;
use crate::models::{
    DeviceClass, DeviceClassListResponse, DeviceClassResponse, DeviceEui, DeviceEuiListResponse,
};

impl FireflyClient {
    /// `GET device_classes`
    pub async fn list_device_classes(&self) -> Result<Vec<DeviceClass>, Error> {
        let url = self.url(&["device_classes"])?;
        debug!("listing device classes");
        self.get::<DeviceClassListResponse>(url).await
    }

    /// `GET device_classes/{id}`
    pub async fn show_device_class(&self, id: i64) -> Result<DeviceClass, Error> {
        let id = id.to_string();
        let url = self.url(&["device_classes", id.as_str()])?;
        debug!(%id, "fetching device class");
        self.get::<DeviceClassResponse>(url).await
    }

    /// Devices using a device class.
    ///
    /// `GET device_classes/{id}/euis`
    pub async fn list_device_class_device_euis(&self, id: i64) -> Result<Vec<DeviceEui>, Error> {
        let id = id.to_string();
        let url = self.url(&["device_classes", id.as_str(), "euis"])?;
        debug!(%id, "listing device class EUIs");
        self.get::<DeviceEuiListResponse>(url).await
    }
}
