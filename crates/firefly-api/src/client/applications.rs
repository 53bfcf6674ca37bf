// Application endpoints

use tracing::debug;

use super::FireflyClient;
use crate::error::Error;
use crate::models::{Application, ApplicationListResponse, DeviceEui, DeviceEuiListResponse};

impl FireflyClient {
    /// `GET applications`
    pub async fn list_applications(&self) -> Result<Vec<Application>, Error> {
        let url = self.url(&["applications"])?;
        debug!("listing applications");
        self.get::<ApplicationListResponse>(url).await
    }

    /// Addresses and EUIs of the devices in an application.
    ///
    /// `GET applications/{eui}/euis`
    pub async fn list_application_device_euis(&self, app_eui: &str) -> Result<Vec<DeviceEui>, Error> {
        let url = self.url(&["applications", app_eui, "euis"])?;
        debug!(app_eui, "listing application device EUIs");
        self.get::<DeviceEuiListResponse>(url).await
    }
}
